// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The update pass: top-down transform propagation, bottom-up bounding-box
//! aggregation, and cache-statistics collection.

use kurbo::Affine;
use thicket_raster::IntRect;

use crate::cache::{CandidateList, MIN_CACHE_SCORE};
use crate::tree::Tree;
use crate::types::{NodeId, StateFlags};
use crate::util::{transform_rect_bbox, union_opt};

/// Parameters shared by one whole update traversal.
pub(crate) struct UpdateArgs {
    /// Restricts work to subtrees intersecting this device region; `None`
    /// means unbounded.
    pub(crate) area: Option<IntRect>,
    /// Aspects to bring up to date.
    pub(crate) flags: StateFlags,
    /// Aspects to recompute even on clean subtrees.
    pub(crate) reset: StateFlags,
    /// Viewport-relative region cache bitmaps are restricted to.
    pub(crate) cache_limit: Option<IntRect>,
}

/// Bytes per cached pixel (premultiplied RGBA8).
const BYTES_PER_PIXEL: i64 = 4;

/// Update one node and (as needed) its subtree. Returns the node's bounding
/// box and subtree paint weight, which may be the stored values when the
/// subtree was skipped as clean or out of region.
pub(crate) fn update_item(
    tree: &mut Tree,
    candidates: &mut CandidateList,
    id: NodeId,
    parent_tf: Affine,
    args: &UpdateArgs,
) -> (Option<IntRect>, u32) {
    let (state, stored_bbox, stored_weight) = {
        let n = tree.node(id);
        (n.state, n.bbox, n.paint_weight)
    };
    let to_do = (args.flags - state) | (args.flags & args.reset);
    if to_do.is_empty() {
        return (stored_bbox, stored_weight);
    }
    // Region gating: a subtree whose known box misses the area is left dirty
    // for a later, wider update. Unknown boxes must be processed.
    if let (Some(area), Some(bbox)) = (args.area, stored_bbox)
        && bbox.intersect(area).is_none()
    {
        return (stored_bbox, stored_weight);
    }

    let world = parent_tf * tree.node(id).transform;
    tree.node_mut(id).world_transform = world;

    let children: Vec<NodeId> = tree.node(id).children.to_vec();
    let mut child_bbox = None;
    let mut weight: u32 = 0;
    // A child skipped by the region gate stays dirty; the intersection of
    // child states keeps this node dirty for the same aspects so a later,
    // wider update still descends here.
    let mut child_states = StateFlags::ALL;
    for child in children {
        let (b, w) = update_item(tree, candidates, child, world, args);
        child_bbox = union_opt(child_bbox, b);
        weight = weight.saturating_add(w);
        child_states &= tree.node(child).state;
    }

    let own_bbox = {
        let n = tree.node(id);
        if n.kind.paints() {
            weight = weight.saturating_add(1);
        }
        n.kind
            .local_bounds()
            .and_then(|r| IntRect::round_out(transform_rect_bbox(world, r)))
    };
    let bbox = union_opt(own_bbox, child_bbox);

    if to_do.contains(StateFlags::BBOX) {
        tree.node_mut(id).bbox = bbox;
    }

    if to_do.contains(StateFlags::CACHE) {
        let cache_rect = match (bbox, args.cache_limit) {
            (Some(b), Some(limit)) => b.intersect(limit),
            (b, None) => b,
            (None, _) => None,
        };
        let (score, size) = match cache_rect {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_sign_loss,
                reason = "pixel areas are far below f64 integer precision"
            )]
            Some(r) => (
                r.area() as f64 * f64::from(weight),
                (r.area() * BYTES_PER_PIXEL) as usize,
            ),
            None => (0.0, 0),
        };
        let n = tree.node_mut(id);
        n.paint_weight = weight;
        n.cache_score = score;
        n.cache_size = size;
        n.cache_rect = cache_rect;
        if score >= MIN_CACHE_SCORE && cache_rect.is_some() {
            candidates.reindex(id, score, size);
        } else {
            candidates.remove(id);
        }
    } else {
        tree.node_mut(id).paint_weight = weight;
    }

    tree.node_mut(id).state |= to_do & child_states;
    (bbox, weight)
}
