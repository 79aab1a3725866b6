// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pick pass: locating the topmost node under a point.

use kurbo::{Point, Shape};

use crate::item::ItemKind;
use crate::tree::Tree;
use crate::types::{NodeId, PickFlags};

/// Hit-test `id`'s subtree. Returns the topmost matching node: children are
/// examined from last to first (paint order, topmost first) and a node's own
/// geometry only matches after none of its children did.
///
/// `delta` is a tolerance radius in device pixels for near-miss hits. The
/// point is mapped through the inverse accumulated transform computed by the
/// last update pass, so dirty geometry does not affect pick results until
/// the next update.
pub(crate) fn pick_item(
    tree: &Tree,
    id: NodeId,
    p: Point,
    delta: f64,
    flags: PickFlags,
) -> Option<NodeId> {
    let node = tree.node_opt(id)?;
    let sticky = flags.contains(PickFlags::STICKY);
    if !sticky && (!node.visible || !node.pickable) {
        return None;
    }
    if matches!(node.kind, ItemKind::CatchAll) {
        // Contains every point at zero distance.
        return Some(id);
    }

    match node.bbox {
        Some(bbox) => {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "tolerances are small; ceil fits in i32"
            )]
            let pad = delta.max(0.0).ceil() as i32;
            let gate = if pad > 0 { bbox.inflated(pad) } else { Some(bbox) };
            match gate {
                Some(g) if g.contains_point(p) => {}
                _ => return None,
            }
        }
        // No box: nothing painted here, but a catch-all child may still
        // want the point.
        None => {
            if node.children.is_empty() {
                return None;
            }
        }
    }

    for &child in node.children.iter().rev() {
        if let Some(hit) = pick_item(tree, child, p, delta, flags) {
            return Some(hit);
        }
    }

    match &node.kind {
        ItemKind::Group | ItemKind::CatchAll => None,
        ItemKind::Rect { rect, .. } => {
            if node.world_transform.determinant().abs() < 1e-12 {
                return None;
            }
            let local = node.world_transform.inverse() * p;
            // The tolerance is a device-space radius: clamp to the nearest
            // point in local space, then measure back in device space.
            let nearest = Point::new(
                local.x.clamp(rect.x0, rect.x1),
                local.y.clamp(rect.y0, rect.y1),
            );
            ((node.world_transform * nearest).distance(p) <= delta).then_some(id)
        }
        ItemKind::Path { path, .. } => {
            if node.world_transform.determinant().abs() < 1e-12 {
                return None;
            }
            if delta > 0.0 {
                log::debug!("pick: tolerance not supported for path fills, using exact containment");
            }
            let local = node.world_transform.inverse() * p;
            path.contains(local).then_some(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CandidateList;
    use crate::types::StateFlags;
    use crate::update::{UpdateArgs, update_item};
    use kurbo::{Affine, Rect};
    use thicket_raster::Rgba;

    fn updated(tree: &mut Tree, root: NodeId) {
        let mut candidates = CandidateList::new();
        update_item(
            tree,
            &mut candidates,
            root,
            Affine::IDENTITY,
            &UpdateArgs {
                area: None,
                flags: StateFlags::ALL,
                reset: StateFlags::empty(),
                cache_limit: None,
            },
        );
    }

    fn rect_node(tree: &mut Tree, r: Rect) -> NodeId {
        tree.create(ItemKind::Rect {
            rect: r,
            fill: Rgba::opaque(0, 0, 0),
        })
    }

    #[test]
    fn last_added_overlapping_child_wins() {
        let mut tree = Tree::new();
        let root = tree.create(ItemKind::Group);
        let a = rect_node(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = rect_node(&mut tree, Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.append_child(root, a);
        tree.append_child(root, b);
        updated(&mut tree, root);
        let hit = pick_item(
            &tree,
            root,
            Point::new(50.0, 50.0),
            0.0,
            PickFlags::empty(),
        );
        assert_eq!(hit, Some(b));
    }

    #[test]
    fn catch_all_loses_to_real_content() {
        let mut tree = Tree::new();
        let root = tree.create(ItemKind::Group);
        let acetate = tree.create(ItemKind::CatchAll);
        let shape = rect_node(&mut tree, Rect::new(10.0, 10.0, 20.0, 20.0));
        tree.append_child(root, acetate);
        tree.append_child(root, shape);
        updated(&mut tree, root);
        let on_shape = pick_item(
            &tree,
            root,
            Point::new(15.0, 15.0),
            0.0,
            PickFlags::empty(),
        );
        assert_eq!(on_shape, Some(shape));
        // Off the shape, the catch-all still guarantees a hit.
        let off_shape = pick_item(
            &tree,
            root,
            Point::new(500.0, 500.0),
            0.0,
            PickFlags::empty(),
        );
        assert_eq!(off_shape, Some(acetate));
    }

    #[test]
    fn hidden_nodes_need_sticky() {
        let mut tree = Tree::new();
        let root = tree.create(ItemKind::Group);
        let shape = rect_node(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0));
        tree.append_child(root, shape);
        updated(&mut tree, root);
        tree.set_visible(shape, false);
        let plain = pick_item(&tree, root, Point::new(5.0, 5.0), 0.0, PickFlags::empty());
        assert_eq!(plain, None);
        let sticky = pick_item(&tree, root, Point::new(5.0, 5.0), 0.0, PickFlags::STICKY);
        assert_eq!(sticky, Some(shape));
    }

    #[test]
    fn unpickable_nodes_need_sticky() {
        let mut tree = Tree::new();
        let root = tree.create(ItemKind::Group);
        let shape = rect_node(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0));
        tree.append_child(root, shape);
        updated(&mut tree, root);
        tree.set_pickable(shape, false);
        assert_eq!(
            pick_item(&tree, root, Point::new(5.0, 5.0), 0.0, PickFlags::empty()),
            None
        );
        assert_eq!(
            pick_item(&tree, root, Point::new(5.0, 5.0), 0.0, PickFlags::STICKY),
            Some(shape)
        );
    }

    #[test]
    fn tolerance_matches_near_misses_on_rects() {
        let mut tree = Tree::new();
        let shape = rect_node(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0));
        updated(&mut tree, shape);
        let p = Point::new(12.0, 5.0);
        assert_eq!(pick_item(&tree, shape, p, 0.0, PickFlags::empty()), None);
        assert_eq!(
            pick_item(&tree, shape, p, 3.0, PickFlags::empty()),
            Some(shape)
        );
    }

    #[test]
    fn tolerance_is_measured_in_device_space() {
        let mut tree = Tree::new();
        let shape = rect_node(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0));
        // 10x zoom: the local rect covers device pixels 0..100.
        tree.set_transform(shape, Affine::scale(10.0));
        updated(&mut tree, shape);
        // Half a device pixel outside the right edge. A local-space test
        // would see a distance of only 0.05.
        let p = Point::new(100.5, 50.0);
        assert_eq!(pick_item(&tree, shape, p, 0.3, PickFlags::empty()), None);
        assert_eq!(
            pick_item(&tree, shape, p, 0.6, PickFlags::empty()),
            Some(shape)
        );
    }

    #[test]
    fn path_tolerance_degrades_to_exact() {
        let mut tree = Tree::new();
        let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(1e-9);
        let shape = tree.create(ItemKind::Path {
            path,
            fill: Rgba::opaque(0, 0, 0),
        });
        updated(&mut tree, shape);
        assert_eq!(
            pick_item(&tree, shape, Point::new(5.0, 5.0), 4.0, PickFlags::empty()),
            Some(shape)
        );
        // Tolerance does not stretch the fill.
        assert_eq!(
            pick_item(&tree, shape, Point::new(12.0, 5.0), 4.0, PickFlags::empty()),
            None
        );
    }

    #[test]
    fn stale_transform_gates_pick_until_update() {
        let mut tree = Tree::new();
        let shape = rect_node(&mut tree, Rect::new(0.0, 0.0, 10.0, 10.0));
        updated(&mut tree, shape);
        tree.set_transform(shape, Affine::translate((100.0, 0.0)));
        // Not yet updated: pick still answers from the old snapshot.
        assert_eq!(
            pick_item(&tree, shape, Point::new(5.0, 5.0), 0.0, PickFlags::empty()),
            Some(shape)
        );
        assert_eq!(
            pick_item(&tree, shape, Point::new(105.0, 5.0), 0.0, PickFlags::empty()),
            None
        );
        updated(&mut tree, shape);
        assert_eq!(
            pick_item(&tree, shape, Point::new(5.0, 5.0), 0.0, PickFlags::empty()),
            None
        );
        assert_eq!(
            pick_item(&tree, shape, Point::new(105.0, 5.0), 0.0, PickFlags::empty()),
            Some(shape)
        );
    }

    #[test]
    fn rotated_rect_rejects_corner_of_its_aabb() {
        let mut tree = Tree::new();
        let root = tree.create(ItemKind::Group);
        let shape = rect_node(&mut tree, Rect::new(-50.0, -50.0, 50.0, 50.0));
        tree.append_child(root, shape);
        tree.set_transform(shape, Affine::rotate(core::f64::consts::FRAC_PI_4));
        updated(&mut tree, root);
        // Inside the axis-aligned box but outside the rotated square.
        assert_eq!(
            pick_item(&tree, root, Point::new(60.0, 60.0), 0.0, PickFlags::empty()),
            None
        );
        assert_eq!(
            pick_item(&tree, root, Point::new(0.0, 0.0), 0.0, PickFlags::empty()),
            Some(shape)
        );
    }
}
