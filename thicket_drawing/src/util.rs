// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Rect};
use smallvec::SmallVec;
use thicket_raster::IntRect;

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}

/// Union of two optional rectangles; `None` acts as the empty region.
pub(crate) fn union_opt(a: Option<IntRect>, b: Option<IntRect>) -> Option<IntRect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// The part of `outer` not covered by `inner`, as up to four disjoint bands
/// (top, bottom, left, right). Returns `outer` whole when they do not
/// overlap.
pub(crate) fn rect_complement(outer: IntRect, inner: IntRect) -> SmallVec<[IntRect; 4]> {
    let mut out = SmallVec::new();
    let Some(mid) = outer.intersect(inner) else {
        out.push(outer);
        return out;
    };
    out.extend(IntRect::new(outer.x0, outer.y0, outer.x1, mid.y0));
    out.extend(IntRect::new(outer.x0, mid.y1, outer.x1, outer.y1));
    out.extend(IntRect::new(outer.x0, mid.y0, mid.x0, mid.y1));
    out.extend(IntRect::new(mid.x1, mid.y0, outer.x1, mid.y1));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn bbox_of_rotated_rect_expands() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let out = transform_rect_bbox(Affine::rotate(core::f64::consts::FRAC_PI_4), r);
        assert!(out.width() > 10.0);
        assert!(out.height() > 10.0);
    }

    #[test]
    fn bbox_of_translated_rect_is_exact() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        let out = transform_rect_bbox(Affine::translate(Vec2::new(10.0, 20.0)), r);
        assert_eq!(out, Rect::new(11.0, 22.0, 13.0, 24.0));
    }

    #[test]
    fn union_opt_treats_none_as_empty() {
        let a = IntRect::new(0, 0, 1, 1);
        assert_eq!(union_opt(a, None), a);
        assert_eq!(union_opt(None, a), a);
        assert_eq!(union_opt(None, None), None);
    }

    #[test]
    fn complement_covers_exactly_the_rest() {
        let outer = IntRect::new(0, 0, 10, 10).unwrap();
        let inner = IntRect::new(2, 3, 6, 7).unwrap();
        let parts = rect_complement(outer, inner);
        assert_eq!(parts.len(), 4);
        let area: i64 = parts.iter().map(IntRect::area).sum();
        assert_eq!(area, outer.area() - inner.area());
        for p in &parts {
            assert!(p.intersect(inner).is_none());
            assert_eq!(p.intersect(outer), Some(*p));
        }
    }

    #[test]
    fn complement_of_disjoint_is_outer() {
        let outer = IntRect::new(0, 0, 4, 4).unwrap();
        let inner = IntRect::new(10, 10, 12, 12).unwrap();
        assert_eq!(rect_complement(outer, inner).as_slice(), &[outer]);
        // Full coverage leaves nothing.
        assert!(rect_complement(inner, inner).is_empty());
    }
}
