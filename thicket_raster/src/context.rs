// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device-anchored render targets.

use crate::{ColorMatrix, IntRect, Pixmap};

/// A render target: a borrowed [`Pixmap`] anchored at a device-space origin.
///
/// Render passes address pixels in device coordinates; the context translates
/// them into buffer coordinates and drops anything outside the target. This
/// lets the same paint code render a screen region, a cache bitmap, or a
/// scratch surface without knowing which it is writing to.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pixmap: &'a mut Pixmap,
    origin_x: i32,
    origin_y: i32,
}

impl<'a> RenderContext<'a> {
    /// Wrap a pixmap whose top-left pixel sits at `(origin_x, origin_y)` in
    /// device space.
    pub fn new(pixmap: &'a mut Pixmap, origin_x: i32, origin_y: i32) -> Self {
        Self {
            pixmap,
            origin_x,
            origin_y,
        }
    }

    /// The device rectangle this target covers, or `None` for a zero-sized
    /// buffer.
    pub fn target_rect(&self) -> Option<IntRect> {
        IntRect::from_origin_size(
            self.origin_x,
            self.origin_y,
            i32::try_from(self.pixmap.width()).unwrap_or(i32::MAX),
            i32::try_from(self.pixmap.height()).unwrap_or(i32::MAX),
        )
    }

    /// Source-over composite one premultiplied pixel at device coordinates.
    pub fn over(&mut self, x: i32, y: i32, src: [u8; 4]) {
        let (Ok(bx), Ok(by)) = (
            u32::try_from(x - self.origin_x),
            u32::try_from(y - self.origin_y),
        ) else {
            return;
        };
        self.pixmap.over(bx, by, src);
    }

    /// Source-over composite a pixmap whose top-left is at device
    /// coordinates `(x, y)`.
    pub fn composite_over(&mut self, src: &Pixmap, x: i32, y: i32) {
        self.pixmap
            .composite_over(src, x - self.origin_x, y - self.origin_y);
    }

    /// Apply a color matrix to the entire target buffer.
    pub fn apply_color_matrix(&mut self, m: &ColorMatrix) {
        self.pixmap.apply_color_matrix(m);
    }
}
