// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing façade: root ownership, global modes, and the pipeline
//! entry points.

use hashbrown::{HashMap, HashSet};
use kurbo::{Affine, Point};
use thicket_raster::{ColorMatrix, IntRect, Pixmap, RenderContext};

use crate::cache::{CandidateList, pick_items_for_caching, set_cached};
use crate::pick::pick_item;
use crate::render::{DEFAULT_ANTIALIAS, render_item, with_antialias};
use crate::tree::{Attach, Tree};
use crate::types::{
    BLUR_QUALITY_BEST, BLUR_QUALITY_NORMAL, BLUR_QUALITY_WORST, ColorMode, DisplayKey,
    FILTER_QUALITY_BEST, FILTER_QUALITY_NORMAL, FILTER_QUALITY_WORST, NodeId, PickFlags,
    RenderFlags, RenderMode, StateFlags,
};
use crate::update::{UpdateArgs, update_item};

/// Default byte budget for the render cache (64 MiB).
const DEFAULT_CACHE_BUDGET: usize = 64 * 1024 * 1024;

/// One drawing: a node tree, its root, global render/color state, and the
/// render cache.
///
/// The driving view mutates the tree, then calls [`Drawing::update`] to
/// recompute derived state, [`Drawing::render`] to paint a region, and
/// [`Drawing::pick`] to hit-test pointer events. See the crate docs for the
/// full per-frame protocol.
#[derive(Debug)]
pub struct Drawing {
    tree: Tree,
    root: Option<NodeId>,
    rendermode: RenderMode,
    colormode: ColorMode,
    exact: bool,
    blur_quality: i32,
    filter_quality: i32,
    grayscale_matrix: ColorMatrix,
    cache_limit: Option<IntRect>,
    cache_budget: usize,
    candidates: CandidateList,
    cached: HashSet<NodeId>,
    shown: HashMap<DisplayKey, NodeId>,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawing {
    /// Create an empty drawing with no root.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            root: None,
            rendermode: RenderMode::default(),
            colormode: ColorMode::default(),
            exact: false,
            blur_quality: BLUR_QUALITY_NORMAL,
            filter_quality: FILTER_QUALITY_NORMAL,
            grayscale_matrix: ColorMatrix::GRAYSCALE,
            cache_limit: None,
            cache_budget: DEFAULT_CACHE_BUDGET,
            candidates: CandidateList::new(),
            cached: HashSet::new(),
            shown: HashMap::new(),
        }
    }

    /// The node arena.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The node arena, mutably. Structural and geometric changes made here
    /// take effect at the next [`Drawing::update`].
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The current root handle.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Replace the root. The previous root's subtree is deleted, with cache
    /// and candidate cleanup. The new root must be an orphan; rooting an
    /// already-attached or stale node is a contract violation: logged, and
    /// the drawing is left rootless.
    pub fn set_root(&mut self, root: Option<NodeId>) {
        if root == self.root {
            return;
        }
        if let Some(old) = self.root.take() {
            self.purge_subtree(old);
            self.tree.remove_subtree(old);
        }
        let Some(new_root) = root else { return };
        if self.tree.attach_state(new_root) != Some(Attach::Orphan) {
            log::warn!("set_root: node is stale or already attached, leaving the drawing rootless");
            return;
        }
        self.tree.set_attach_root(new_root);
        self.tree.mark_for_update(new_root, StateFlags::ALL, false);
        self.root = Some(new_root);
    }

    /// Effective render mode; `exact` overrides any preview mode.
    pub fn render_mode(&self) -> RenderMode {
        if self.exact {
            RenderMode::Normal
        } else {
            self.rendermode
        }
    }

    /// Effective color mode; outline previews and `exact` suppress color
    /// post-processing.
    pub fn color_mode(&self) -> ColorMode {
        if self.outline() || self.exact {
            ColorMode::Normal
        } else {
            self.colormode
        }
    }

    /// Whether the effective render mode is outline-only.
    pub fn outline(&self) -> bool {
        self.render_mode() == RenderMode::Outline
    }

    /// Whether the effective render mode forces hairlines visible.
    pub fn visible_hairlines(&self) -> bool {
        self.render_mode() == RenderMode::VisibleHairlines
    }

    /// Whether the effective render mode adds an outline overlay.
    pub fn outline_overlay(&self) -> bool {
        self.render_mode() == RenderMode::OutlineOverlay
    }

    /// Whether filter effects would be rendered in the effective mode.
    pub fn render_filters(&self) -> bool {
        matches!(
            self.render_mode(),
            RenderMode::Normal | RenderMode::VisibleHairlines | RenderMode::OutlineOverlay
        )
    }

    /// Effective blur quality: best when exact, the configured level in
    /// normal mode, worst in preview modes.
    pub fn blur_quality(&self) -> i32 {
        if self.render_mode() == RenderMode::Normal {
            if self.exact {
                BLUR_QUALITY_BEST
            } else {
                self.blur_quality
            }
        } else {
            BLUR_QUALITY_WORST
        }
    }

    /// Effective filter quality; same ladder as [`Drawing::blur_quality`].
    pub fn filter_quality(&self) -> i32 {
        if self.render_mode() == RenderMode::Normal {
            if self.exact {
                FILTER_QUALITY_BEST
            } else {
                self.filter_quality
            }
        } else {
            FILTER_QUALITY_WORST
        }
    }

    /// Set the requested render mode (subject to the `exact` override).
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.rendermode = mode;
    }

    /// Set the requested color mode (subject to outline/exact suppression).
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.colormode = mode;
    }

    /// Toggle exact rendering, which forces full quality everywhere.
    pub fn set_exact(&mut self, exact: bool) {
        self.exact = exact;
    }

    /// Set the configured blur quality level.
    pub fn set_blur_quality(&mut self, quality: i32) {
        self.blur_quality = quality;
    }

    /// Set the configured filter quality level.
    pub fn set_filter_quality(&mut self, quality: i32) {
        self.filter_quality = quality;
    }

    /// Replace the grayscale post-process matrix (row-major 4×5).
    pub fn set_grayscale_matrix(&mut self, coeffs: [f64; 20]) {
        self.grayscale_matrix = ColorMatrix::from_coeffs(coeffs);
    }

    /// The byte budget for cached bitmaps.
    pub fn cache_budget(&self) -> usize {
        self.cache_budget
    }

    /// Change the cache byte budget and re-run selection immediately.
    pub fn set_cache_budget(&mut self, bytes: usize) {
        if self.cache_budget == bytes {
            return;
        }
        self.cache_budget = bytes;
        pick_items_for_caching(&mut self.tree, &self.candidates, bytes, &mut self.cached);
    }

    /// Set the viewport-relative rectangle cache bitmaps are clipped to.
    ///
    /// With `update_cache`, every currently-cached node is marked cache-state
    /// dirty so the next update re-scores it against the new limit.
    pub fn set_cache_limit(&mut self, limit: Option<IntRect>, update_cache: bool) {
        self.cache_limit = limit;
        if update_cache {
            let ids: Vec<NodeId> = self.cached.iter().copied().collect();
            for id in ids {
                self.tree.mark_for_update(id, StateFlags::CACHE, true);
            }
        }
    }

    /// Whether a node currently holds a place in the cached set.
    pub fn is_cached(&self, id: NodeId) -> bool {
        self.cached.contains(&id)
    }

    /// Bring the requested aspects of derived state up to date.
    ///
    /// `area` restricts work to subtrees intersecting that device region
    /// (`None` is unbounded); `reset` forces recomputation even on clean
    /// subtrees. When `flags` includes `CACHE`, cache selection re-runs after
    /// the traversal.
    pub fn update(&mut self, area: Option<IntRect>, flags: StateFlags, reset: StateFlags) {
        let Some(root) = self.root else { return };
        let args = UpdateArgs {
            area,
            flags,
            reset,
            cache_limit: self.cache_limit,
        };
        update_item(
            &mut self.tree,
            &mut self.candidates,
            root,
            Affine::IDENTITY,
            &args,
        );
        if flags.intersects(StateFlags::CACHE) {
            pick_items_for_caching(
                &mut self.tree,
                &self.candidates,
                self.cache_budget,
                &mut self.cached,
            );
        }
    }

    /// Paint the device region `area` into `ctx`.
    ///
    /// `antialiasing >= 0` overrides the root's antialias level for this call
    /// only. When the effective color mode is grayscale, the whole target is
    /// filtered through the grayscale matrix after painting. With no root
    /// this is a no-op.
    pub fn render(
        &mut self,
        ctx: &mut RenderContext<'_>,
        area: IntRect,
        flags: RenderFlags,
        antialiasing: i32,
    ) {
        let Some(root) = self.root else {
            log::debug!("render: no root, nothing to paint");
            return;
        };
        let cached = &self.cached;
        with_antialias(&mut self.tree, root, antialiasing, |tree| {
            render_item(tree, cached, ctx, root, area, flags, DEFAULT_ANTIALIAS);
        });
        if self.color_mode() == ColorMode::Grayscale {
            ctx.apply_color_matrix(&self.grayscale_matrix);
        }
    }

    /// Hit-test the drawing at `p` with tolerance radius `delta`. Returns the
    /// topmost matching node, answering from the last update's snapshot.
    pub fn pick(&self, p: Point, delta: f64, flags: PickFlags) -> Option<NodeId> {
        let Some(root) = self.root else {
            log::warn!("pick: no root, nothing to hit");
            return None;
        };
        pick_item(&self.tree, root, p, delta, flags)
    }

    /// Premultiplied average color over `area`, channels in [0, 1].
    ///
    /// Renders into a scratch buffer, bypassing the cache, so cached bitmaps
    /// are neither consulted nor provisioned.
    pub fn average_color(&mut self, area: IntRect) -> [f64; 4] {
        let mut scratch = Pixmap::new(
            u32::try_from(area.width()).unwrap_or(0),
            u32::try_from(area.height()).unwrap_or(0),
        );
        {
            let mut ctx = RenderContext::new(&mut scratch, area.x0, area.y0);
            self.render(&mut ctx, area, RenderFlags::BYPASS_CACHE, -1);
        }
        scratch.average_color()
    }

    /// Attach an orphan subtree under the root and associate it with `key`.
    ///
    /// Showing a key that is already shown, or showing without a root, is a
    /// contract violation: logged, then a no-op.
    pub fn show(&mut self, key: DisplayKey, node: NodeId) {
        let Some(root) = self.root else {
            log::warn!("show: no root to attach under, ignoring");
            return;
        };
        if self.shown.contains_key(&key) {
            log::warn!("show: display key is already shown, ignoring");
            return;
        }
        self.tree.append_child(root, node);
        // Only record the association if the attach actually happened.
        if self.tree.parent_of(node) == Some(root) {
            self.shown.insert(key, node);
        }
    }

    /// Delete the subtree shown under `key`, with cache and candidate
    /// cleanup. Hiding an unknown key is a contract violation: logged, then
    /// a no-op.
    pub fn hide(&mut self, key: DisplayKey) {
        let Some(node) = self.shown.remove(&key) else {
            log::warn!("hide: unknown display key, ignoring");
            return;
        };
        self.purge_subtree(node);
        self.tree.remove_subtree(node);
    }

    /// Drop every node of a subtree from the candidate list, the cached set,
    /// and the display-key map.
    fn purge_subtree(&mut self, id: NodeId) {
        let subtree: HashSet<NodeId> = self.tree.collect_subtree(id).into_iter().collect();
        for &n in &subtree {
            self.candidates.remove(n);
            set_cached(&mut self.tree, &mut self.cached, n, false);
        }
        self.shown.retain(|_, v| !subtree.contains(v));
    }
}
