// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node arena: ownership, attachment states, and dirty marking.

use kurbo::Affine;
use smallvec::SmallVec;
use thicket_raster::{IntRect, Pixmap, Rgba};

use crate::item::ItemKind;
use crate::types::{NodeId, StateFlags};

/// Attachment state of a node.
///
/// Transitions are one-way per attach: orphan → root (via
/// [`crate::Drawing::set_root`]) or orphan → child (via
/// [`Tree::append_child`]). Re-parenting requires an explicit
/// [`Tree::detach`] first, so a node can never become its own ancestor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Attach {
    Orphan,
    Root,
    Child,
}

/// A rasterized copy of a node's output, kept while the node is cached.
#[derive(Clone, Debug)]
pub(crate) struct CacheRecord {
    pub(crate) pixmap: Pixmap,
    /// Device rectangle the pixmap covers.
    pub(crate) rect: IntRect,
    /// Set when content-affecting state was dirtied after the last paint.
    pub(crate) stale: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) attach: Attach,
    pub(crate) kind: ItemKind,
    /// Transform relative to the parent.
    pub(crate) transform: Affine,
    /// Accumulated device-space transform. Valid after a BBOX update.
    pub(crate) world_transform: Affine,
    /// Device-pixel bounding box. Valid after a BBOX update; `None` for
    /// degenerate or empty geometry.
    pub(crate) bbox: Option<IntRect>,
    /// Aspects currently up to date.
    pub(crate) state: StateFlags,
    pub(crate) visible: bool,
    pub(crate) pickable: bool,
    /// Antialias level; negative inherits from the parent.
    pub(crate) antialias: i32,
    /// Painting leaves in this subtree. Valid after a CACHE update.
    pub(crate) paint_weight: u32,
    /// Benefit estimate for caching this subtree. Valid after a CACHE update.
    pub(crate) cache_score: f64,
    /// Byte cost of caching this subtree. Valid after a CACHE update.
    pub(crate) cache_size: usize,
    /// Device rectangle a cache bitmap would cover (bbox ∩ cache limit).
    pub(crate) cache_rect: Option<IntRect>,
    /// Present only while the node is in the drawing's cached set.
    pub(crate) cache: Option<CacheRecord>,
}

impl Node {
    fn new(generation: u32, kind: ItemKind) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            attach: Attach::Orphan,
            kind,
            transform: Affine::IDENTITY,
            world_transform: Affine::IDENTITY,
            bbox: None,
            state: StateFlags::empty(),
            visible: true,
            pickable: true,
            antialias: -1,
            paint_weight: 0,
            cache_score: 0.0,
            cache_size: 0,
            cache_rect: None,
            cache: None,
        }
    }
}

/// Generational arena owning every node of one drawing.
///
/// The arena owns all nodes; [`crate::Drawing`] holds the root handle.
/// Structural and geometric mutators mark the affected nodes dirty so the
/// next [`crate::Drawing::update`] pass knows where to descend; derived data
/// (world transforms, bounding boxes, cache statistics) is only trustworthy
/// after that pass has run.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Option<Node>>,
    /// Last generation per slot (persists across frees).
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl Tree {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new orphan node of the given kind.
    pub fn create(&mut self, kind: ItemKind) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, kind));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, kind)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Append an orphan node as the last (topmost) child of `parent`.
    ///
    /// Attaching a node that is already a root or child, attaching to a stale
    /// parent, or attaching a node to itself is a contract violation: logged,
    /// then a no-op.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.is_alive(parent) || !self.is_alive(child) {
            log::warn!("append_child: stale or self-referential ids, ignoring");
            return;
        }
        if self.node(child).attach != Attach::Orphan {
            log::warn!("append_child: node is already attached, ignoring");
            return;
        }
        self.node_mut(parent).children.push(child);
        let n = self.node_mut(child);
        n.parent = Some(parent);
        n.attach = Attach::Child;
        // The subtree's world transforms were computed under its previous
        // parent (if any) and the parent's aggregates now include it.
        self.mark_subtree_for_update(child, StateFlags::ALL);
        self.mark_for_update(parent, StateFlags::ALL, true);
    }

    /// Detach a child node, returning it to the orphan state.
    ///
    /// Roots cannot be detached this way; swap them via
    /// [`crate::Drawing::set_root`].
    pub fn detach(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        match self.node(id).attach {
            Attach::Child => {}
            Attach::Orphan => return,
            Attach::Root => {
                log::warn!("detach: cannot detach the root, ignoring");
                return;
            }
        }
        let parent = self.node(id).parent;
        if let Some(p) = parent {
            self.node_mut(p).children.retain(|c| *c != id);
            self.mark_for_update(p, StateFlags::ALL, true);
        }
        let n = self.node_mut(id);
        n.parent = None;
        n.attach = Attach::Orphan;
    }

    /// Replace the local transform, dirtying the whole subtree (descendant
    /// world transforms change) and all ancestors (aggregated boxes change).
    pub fn set_transform(&mut self, id: NodeId, tf: Affine) {
        if let Some(n) = self.node_opt_mut(id)
            && n.transform != tf
        {
            n.transform = tf;
            self.mark_subtree_for_update(id, StateFlags::ALL);
            self.mark_for_update(id, StateFlags::ALL, true);
        }
    }

    /// Set visibility. Hidden nodes are skipped by render and by non-sticky
    /// picking; their bounding boxes still contribute to ancestors.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(n) = self.node_opt_mut(id)
            && n.visible != visible
        {
            n.visible = visible;
            self.mark_for_update(id, StateFlags::RENDER | StateFlags::CACHE, true);
        }
    }

    /// Set pickability. Unpickable nodes (and their subtrees) are skipped by
    /// non-sticky picking.
    pub fn set_pickable(&mut self, id: NodeId, pickable: bool) {
        if let Some(n) = self.node_opt_mut(id)
            && n.pickable != pickable
        {
            n.pickable = pickable;
            self.mark_for_update(id, StateFlags::PICK, true);
        }
    }

    /// Set the antialias level (negative inherits from the parent).
    pub fn set_antialias(&mut self, id: NodeId, antialias: i32) {
        if let Some(n) = self.node_opt_mut(id)
            && n.antialias != antialias
        {
            n.antialias = antialias;
            self.mark_for_update(id, StateFlags::RENDER, true);
        }
    }

    /// Replace the fill color of a rect or path node. A render-only change:
    /// geometry and boxes are unaffected, but cached bitmaps go stale.
    pub fn set_fill(&mut self, id: NodeId, fill: Rgba) {
        if let Some(n) = self.node_opt_mut(id) {
            n.kind.set_fill(fill);
            self.mark_for_update(id, StateFlags::RENDER, true);
        }
    }

    /// Mark aspects of a node dirty. With `propagate`, every ancestor is
    /// marked too so the next update descends into this subtree without
    /// re-examining clean siblings.
    pub fn mark_for_update(&mut self, id: NodeId, flags: StateFlags, propagate: bool) {
        if !self.is_alive(id) {
            return;
        }
        let mut current = Some(id);
        while let Some(cur) = current {
            let n = self.node_mut(cur);
            n.state -= flags;
            if flags.intersects(StateFlags::BBOX | StateFlags::RENDER)
                && let Some(rec) = n.cache.as_mut()
            {
                rec.stale = true;
            }
            if !propagate {
                break;
            }
            current = n.parent;
        }
    }

    pub(crate) fn mark_subtree_for_update(&mut self, id: NodeId, flags: StateFlags) {
        if !self.is_alive(id) {
            return;
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let n = self.node_mut(cur);
            n.state -= flags;
            if flags.intersects(StateFlags::BBOX | StateFlags::RENDER)
                && let Some(rec) = n.cache.as_mut()
            {
                rec.stale = true;
            }
            stack.extend(n.children.iter().copied());
        }
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Parent of a live child node; `None` for roots, orphans, or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).parent
    }

    /// Children of a node in paint order (later paints on top), or an empty
    /// slice for stale ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// Device-pixel bounding box as of the last update; `None` for stale ids,
    /// degenerate geometry, or nodes never updated.
    pub fn bbox(&self, id: NodeId) -> Option<IntRect> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).bbox
    }

    /// Accumulated device transform as of the last update.
    pub fn world_transform(&self, id: NodeId) -> Option<Affine> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.node(id).world_transform)
    }

    /// Visibility flag of a live node.
    pub fn visible(&self, id: NodeId) -> Option<bool> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.node(id).visible)
    }

    /// Pickability flag of a live node.
    pub fn pickable(&self, id: NodeId) -> Option<bool> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.node(id).pickable)
    }

    /// Cache score as of the last cache-state update.
    pub fn cache_score(&self, id: NodeId) -> Option<f64> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.node(id).cache_score)
    }

    /// Estimated cache footprint in bytes as of the last cache-state update.
    pub fn cache_size(&self, id: NodeId) -> Option<usize> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.node(id).cache_size)
    }

    pub(crate) fn attach_state(&self, id: NodeId) -> Option<Attach> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.node(id).attach)
    }

    pub(crate) fn set_attach_root(&mut self, id: NodeId) {
        self.node_mut(id).attach = Attach::Root;
    }

    /// Set antialias without dirtying anything; used by the scoped override
    /// in the render pass.
    pub(crate) fn set_antialias_raw(&mut self, id: NodeId, antialias: i32) {
        if let Some(n) = self.node_opt_mut(id) {
            n.antialias = antialias;
        }
    }

    /// All live node ids in `id`'s subtree, including `id` itself.
    pub(crate) fn collect_subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.node(cur).children.iter().copied());
        }
        out
    }

    /// Delete a subtree, freeing all of its slots. The caller is responsible
    /// for cache and candidate bookkeeping.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
            self.mark_for_update(parent, StateFlags::ALL, true);
        }
        for n in self.collect_subtree(id) {
            self.nodes[n.idx()] = None;
            self.free_list.push(n.idx());
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    pub(crate) fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    fn group(tree: &mut Tree) -> NodeId {
        tree.create(ItemKind::Group)
    }

    #[test]
    fn create_starts_orphan() {
        let mut tree = Tree::new();
        let n = group(&mut tree);
        assert_eq!(tree.attach_state(n), Some(Attach::Orphan));
        assert_eq!(tree.parent_of(n), None);
    }

    #[test]
    fn append_child_transitions_to_child() {
        let mut tree = Tree::new();
        let p = group(&mut tree);
        let c = group(&mut tree);
        tree.append_child(p, c);
        assert_eq!(tree.attach_state(c), Some(Attach::Child));
        assert_eq!(tree.parent_of(c), Some(p));
        assert_eq!(tree.children_of(p), &[c]);
    }

    #[test]
    fn double_attach_is_rejected() {
        let mut tree = Tree::new();
        let p1 = group(&mut tree);
        let p2 = group(&mut tree);
        let c = group(&mut tree);
        tree.append_child(p1, c);
        tree.append_child(p2, c);
        assert_eq!(tree.parent_of(c), Some(p1));
        assert!(tree.children_of(p2).is_empty());
    }

    #[test]
    fn self_attach_is_rejected() {
        let mut tree = Tree::new();
        let n = group(&mut tree);
        tree.append_child(n, n);
        assert!(tree.children_of(n).is_empty());
        assert_eq!(tree.attach_state(n), Some(Attach::Orphan));
    }

    #[test]
    fn detach_allows_reparenting() {
        let mut tree = Tree::new();
        let p1 = group(&mut tree);
        let p2 = group(&mut tree);
        let c = group(&mut tree);
        tree.append_child(p1, c);
        tree.detach(c);
        assert_eq!(tree.attach_state(c), Some(Attach::Orphan));
        assert!(tree.children_of(p1).is_empty());
        tree.append_child(p2, c);
        assert_eq!(tree.parent_of(c), Some(p2));
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut tree = Tree::new();
        let p = group(&mut tree);
        let a = group(&mut tree);
        let b = group(&mut tree);
        tree.append_child(p, a);
        tree.append_child(p, b);
        assert_eq!(tree.children_of(p), &[a, b]);
    }

    #[test]
    fn generation_bumps_on_slot_reuse() {
        let mut tree = Tree::new();
        let a = group(&mut tree);
        tree.remove_subtree(a);
        assert!(!tree.is_alive(a));
        let b = group(&mut tree);
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn remove_subtree_frees_descendants() {
        let mut tree = Tree::new();
        let p = group(&mut tree);
        let c = group(&mut tree);
        let gc = group(&mut tree);
        tree.append_child(p, c);
        tree.append_child(c, gc);
        tree.remove_subtree(c);
        assert!(tree.is_alive(p));
        assert!(!tree.is_alive(c));
        assert!(!tree.is_alive(gc));
        assert!(tree.children_of(p).is_empty());
    }

    #[test]
    fn mark_for_update_propagates_to_ancestors_only() {
        let mut tree = Tree::new();
        let p = group(&mut tree);
        let c = group(&mut tree);
        let sibling = group(&mut tree);
        tree.append_child(p, c);
        tree.append_child(p, sibling);
        // Pretend everything is clean.
        for id in [p, c, sibling] {
            tree.node_mut(id).state = StateFlags::ALL;
        }
        tree.mark_for_update(c, StateFlags::BBOX, true);
        assert!(!tree.node(c).state.contains(StateFlags::BBOX));
        assert!(!tree.node(p).state.contains(StateFlags::BBOX));
        assert!(tree.node(sibling).state.contains(StateFlags::BBOX));
    }

    #[test]
    fn append_child_dirties_the_attached_subtree() {
        let mut tree = Tree::new();
        let p = group(&mut tree);
        let c = group(&mut tree);
        let gc = group(&mut tree);
        tree.append_child(c, gc);
        // Pretend the orphan subtree was updated under a previous parent.
        for id in [c, gc] {
            tree.node_mut(id).state = StateFlags::ALL;
        }
        tree.append_child(p, c);
        assert!(tree.node(c).state.is_empty());
        assert!(tree.node(gc).state.is_empty());
    }

    #[test]
    fn set_transform_dirties_descendants() {
        let mut tree = Tree::new();
        let p = group(&mut tree);
        let c = group(&mut tree);
        tree.append_child(p, c);
        for id in [p, c] {
            tree.node_mut(id).state = StateFlags::ALL;
        }
        tree.set_transform(p, Affine::translate(Vec2::new(1.0, 0.0)));
        assert!(tree.node(c).state.is_empty());
        assert!(tree.node(p).state.is_empty());
    }

    #[test]
    fn content_dirt_stales_cache_records() {
        let mut tree = Tree::new();
        let n = group(&mut tree);
        tree.node_mut(n).cache = Some(CacheRecord {
            pixmap: Pixmap::new(1, 1),
            rect: IntRect::new(0, 0, 1, 1).unwrap(),
            stale: false,
        });
        tree.mark_for_update(n, StateFlags::RENDER, false);
        assert!(tree.node(n).cache.as_ref().unwrap().stale);
    }

    #[test]
    fn stale_ids_degrade_on_accessors() {
        let mut tree = Tree::new();
        let n = group(&mut tree);
        tree.remove_subtree(n);
        assert_eq!(tree.bbox(n), None);
        assert_eq!(tree.world_transform(n), None);
        assert_eq!(tree.visible(n), None);
        assert!(tree.children_of(n).is_empty());
        // Mutators on stale ids are no-ops.
        tree.set_transform(n, Affine::scale(2.0));
        tree.set_visible(n, false);
    }
}
