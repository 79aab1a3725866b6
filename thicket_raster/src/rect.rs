// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer device-pixel rectangles.

use kurbo::{Point, Rect};

/// An axis-aligned rectangle in integer device pixels, half-open on both axes.
///
/// A valid `IntRect` always has `x0 < x1` and `y0 < y1`; empty regions are
/// represented as `Option<IntRect>` being `None`. Constructors and operations
/// that could produce a degenerate rectangle return `Option` accordingly, so
/// a zero-area rectangle can never leak into intersection tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntRect {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl IntRect {
    /// Create a rectangle from its edges. Returns `None` if the result would
    /// be empty.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        if x0 < x1 && y0 < y1 {
            Some(Self { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    /// Create a rectangle from an origin and a size. Returns `None` for zero
    /// or negative sizes.
    pub fn from_origin_size(x: i32, y: i32, w: i32, h: i32) -> Option<Self> {
        Self::new(x, y, x.saturating_add(w), y.saturating_add(h))
    }

    /// Conservative outward rounding of a float rectangle to device pixels.
    ///
    /// Degenerate input (zero or negative area) yields `None`.
    pub fn round_out(r: Rect) -> Option<Self> {
        if !(r.width() > 0.0 && r.height() > 0.0) {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "device coordinates fit in i32 by construction"
        )]
        Self::new(
            r.x0.floor() as i32,
            r.y0.floor() as i32,
            r.x1.ceil() as i32,
            r.y1.ceil() as i32,
        )
    }

    /// Width in pixels. Always positive.
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    /// Height in pixels. Always positive.
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Area in pixels, computed in `i64` to avoid overflow for large regions.
    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    /// Intersection with another rectangle, `None` if they do not overlap.
    pub fn intersect(&self, other: Self) -> Option<Self> {
        Self::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether the pixel at `(x, y)` lies inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Whether a float point lies inside the half-open extent.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= f64::from(self.x0)
            && p.x < f64::from(self.x1)
            && p.y >= f64::from(self.y0)
            && p.y < f64::from(self.y1)
    }

    /// Grow (or shrink, for negative `d`) on all sides. Returns `None` if the
    /// result would be empty.
    pub fn inflated(&self, d: i32) -> Option<Self> {
        Self::new(
            self.x0.saturating_sub(d),
            self.y0.saturating_sub(d),
            self.x1.saturating_add(d),
            self.y1.saturating_add(d),
        )
    }

    /// Convert back to a float rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }
}
