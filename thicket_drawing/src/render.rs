// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render pass: painting a device region, honoring cached bitmaps.

use hashbrown::HashSet;
use kurbo::{Affine, Point, Shape};
use thicket_raster::{IntRect, Pixmap, RenderContext, Rgba};

use crate::item::ItemKind;
use crate::tree::{CacheRecord, Tree};
use crate::types::{NodeId, RenderFlags};
use crate::util::{rect_complement, transform_rect_bbox};

/// Antialias level assumed at the top of the tree when nothing overrides it.
pub(crate) const DEFAULT_ANTIALIAS: i32 = 1;

/// Run `f` with `id`'s antialias level temporarily replaced.
///
/// The previous level is restored on every exit path of `f`; a negative
/// `antialias` means "no override" and runs `f` unchanged. The override does
/// not dirty any state.
pub(crate) fn with_antialias<R>(
    tree: &mut Tree,
    id: NodeId,
    antialias: i32,
    f: impl FnOnce(&mut Tree) -> R,
) -> R {
    if antialias < 0 || !tree.is_alive(id) {
        return f(tree);
    }
    let prev = tree.node(id).antialias;
    tree.set_antialias_raw(id, antialias);
    let out = f(tree);
    tree.set_antialias_raw(id, prev);
    out
}

/// Render one node and its subtree into `ctx`, restricted to `area`.
///
/// A node in the cached set blits its bitmap instead of re-painting,
/// provisioning or refreshing it first when missing, stale, or covering the
/// wrong rectangle. `RenderFlags::BYPASS_CACHE` forces direct painting
/// throughout the subtree.
pub(crate) fn render_item(
    tree: &mut Tree,
    cached: &HashSet<NodeId>,
    ctx: &mut RenderContext<'_>,
    id: NodeId,
    area: IntRect,
    flags: RenderFlags,
    inherited_aa: i32,
) {
    let (visible, node_aa, bbox, cache_rect) = {
        let Some(n) = tree.node_opt(id) else { return };
        (n.visible, n.antialias, n.bbox, n.cache_rect)
    };
    if !visible {
        return;
    }
    let aa = if node_aa >= 0 { node_aa } else { inherited_aa };
    let Some(bbox) = bbox else { return };
    if bbox.intersect(area).is_none() {
        return;
    }

    if cached.contains(&id)
        && !flags.contains(RenderFlags::BYPASS_CACHE)
        && let Some(rect) = cache_rect
    {
        let needs_paint = match &tree.node(id).cache {
            Some(rec) => rec.stale || rec.rect != rect,
            None => true,
        };
        if needs_paint {
            let mut pixmap = Pixmap::new(
                u32::try_from(rect.width()).unwrap_or(0),
                u32::try_from(rect.height()).unwrap_or(0),
            );
            {
                let mut cache_ctx = RenderContext::new(&mut pixmap, rect.x0, rect.y0);
                render_content(tree, cached, &mut cache_ctx, id, rect, flags, aa);
            }
            tree.node_mut(id).cache = Some(CacheRecord {
                pixmap,
                rect,
                stale: false,
            });
        }
        {
            let n = tree.node(id);
            if let (Some(rec), Some(vis)) = (n.cache.as_ref(), rect.intersect(area)) {
                blit_clipped(&rec.pixmap, rect, ctx, vis);
            }
        }
        // The bitmap only covers the cache rectangle; anything the cache
        // limit clipped away still paints directly.
        for part in rect_complement(area, rect) {
            render_content(tree, cached, ctx, id, part, flags, aa);
        }
        return;
    }

    render_content(tree, cached, ctx, id, area, flags, aa);
}

/// Paint a node's own geometry, then its children in order (later on top).
fn render_content(
    tree: &mut Tree,
    cached: &HashSet<NodeId>,
    ctx: &mut RenderContext<'_>,
    id: NodeId,
    area: IntRect,
    flags: RenderFlags,
    aa: i32,
) {
    paint_geometry(tree.node(id).kind.clone(), tree.node(id).world_transform, ctx, area, aa);
    let children: Vec<NodeId> = tree.node(id).children.to_vec();
    for child in children {
        render_item(tree, cached, ctx, child, area, flags, aa);
    }
}

fn paint_geometry(
    kind: ItemKind,
    world: Affine,
    ctx: &mut RenderContext<'_>,
    area: IntRect,
    aa: i32,
) {
    let Some(local) = kind.local_bounds() else { return };
    let Some(own) = IntRect::round_out(transform_rect_bbox(world, local)) else {
        return;
    };
    let Some(vis) = own.intersect(area) else { return };
    if world.determinant().abs() < 1e-12 {
        log::debug!("render: degenerate transform, skipping paint");
        return;
    }
    let inv = world.inverse();
    match &kind {
        ItemKind::Rect { rect, fill } => {
            paint_coverage(ctx, vis, aa, *fill, inv, |p| rect.contains(p));
        }
        ItemKind::Path { path, fill } => {
            paint_coverage(ctx, vis, aa, *fill, inv, |p| path.contains(p));
        }
        ItemKind::Group | ItemKind::CatchAll => {}
    }
}

fn paint_coverage(
    ctx: &mut RenderContext<'_>,
    vis: IntRect,
    aa: i32,
    fill: Rgba,
    inv: Affine,
    contains: impl Fn(Point) -> bool,
) {
    let base = fill.premultiplied();
    for y in vis.y0..vis.y1 {
        for x in vis.x0..vis.x1 {
            if aa <= 0 {
                let p = inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if contains(p) {
                    ctx.over(x, y, base);
                }
            } else {
                let mut covered = 0_u32;
                for (ox, oy) in [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)] {
                    let p = inv * Point::new(f64::from(x) + ox, f64::from(y) + oy);
                    if contains(p) {
                        covered += 1;
                    }
                }
                if covered == 4 {
                    ctx.over(x, y, base);
                } else if covered > 0 {
                    ctx.over(x, y, scale_premul(base, f64::from(covered) / 4.0));
                }
            }
        }
    }
}

fn scale_premul(px: [u8; 4], k: f64) -> [u8; 4] {
    let scale = |c: u8| -> u8 {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "k is in [0, 1], so the product stays in u8 range"
        )]
        {
            (f64::from(c) * k).round() as u8
        }
    };
    [scale(px[0]), scale(px[1]), scale(px[2]), scale(px[3])]
}

/// Composite the part of a cached bitmap covering `vis` into `ctx`.
fn blit_clipped(pixmap: &Pixmap, rect: IntRect, ctx: &mut RenderContext<'_>, vis: IntRect) {
    for y in vis.y0..vis.y1 {
        for x in vis.x0..vis.x1 {
            let (Ok(sx), Ok(sy)) = (u32::try_from(x - rect.x0), u32::try_from(y - rect.y0)) else {
                continue;
            };
            if let Some(px) = pixmap.pixel(sx, sy) {
                ctx.over(x, y, px);
            }
        }
    }
}
