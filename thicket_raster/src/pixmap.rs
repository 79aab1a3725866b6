// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Premultiplied RGBA8 pixel buffers.

use crate::ColorMatrix;

/// A straight-alpha RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Construct from straight-alpha channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Premultiply into the `[r, g, b, a]` layout used by [`Pixmap`].
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let mul = |c: u8| -> u8 {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "product of two u8 channels divided by 255 fits in u8"
            )]
            {
                ((u16::from(c) * a + 127) / 255) as u8
            }
        };
        [mul(self.r), mul(self.g), mul(self.b), self.a]
    }
}

/// A premultiplied RGBA8 pixel buffer.
///
/// All compositing is source-over on premultiplied pixels. Out-of-bounds
/// writes are silently dropped so callers can clip loosely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Create a fully transparent pixmap. Zero dimensions are allowed and
    /// yield an empty buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Estimated heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Read one premultiplied pixel; `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let o = self.offset(x, y);
        Some([self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]])
    }

    /// Overwrite one premultiplied pixel. Out of bounds is a no-op.
    pub fn put_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let o = self.offset(x, y);
        self.data[o..o + 4].copy_from_slice(&px);
    }

    /// Source-over composite one premultiplied pixel. Out of bounds is a no-op.
    pub fn over(&mut self, x: u32, y: u32, src: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let o = self.offset(x, y);
        let inv_a = 255 - u16::from(src[3]);
        for c in 0..4 {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "source-over result of u8 channels fits in u8"
            )]
            let blended = (u16::from(src[c]) + (u16::from(self.data[o + c]) * inv_a + 127) / 255)
                .min(255) as u8;
            self.data[o + c] = blended;
        }
    }

    /// Fill the whole buffer with one color.
    pub fn fill(&mut self, color: Rgba) {
        let px = color.premultiplied();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Source-over composite another pixmap with its top-left at `(dx, dy)` in
    /// this pixmap's coordinates. Parts falling outside either buffer are
    /// skipped.
    pub fn composite_over(&mut self, src: &Self, dx: i32, dy: i32) {
        for sy in 0..src.height {
            let Some(ty) = checked_add(sy, dy) else { continue };
            if ty >= self.height {
                continue;
            }
            for sx in 0..src.width {
                let Some(tx) = checked_add(sx, dx) else { continue };
                if tx >= self.width {
                    continue;
                }
                // Bounds were checked above.
                if let Some(px) = src.pixel(sx, sy) {
                    self.over(tx, ty, px);
                }
            }
        }
    }

    /// Apply a 4×5 color matrix to every pixel.
    ///
    /// The matrix operates on unpremultiplied channels in [0, 1]; results are
    /// clamped and re-premultiplied.
    pub fn apply_color_matrix(&mut self, m: &ColorMatrix) {
        for chunk in self.data.chunks_exact_mut(4) {
            let a = f64::from(chunk[3]) / 255.0;
            let (r, g, b) = if a > 0.0 {
                (
                    f64::from(chunk[0]) / 255.0 / a,
                    f64::from(chunk[1]) / 255.0 / a,
                    f64::from(chunk[2]) / 255.0 / a,
                )
            } else {
                (0.0, 0.0, 0.0)
            };
            let [nr, ng, nb, na] = m.apply([r, g, b, a]);
            let na = na.clamp(0.0, 1.0);
            let to_premul = |c: f64| -> u8 {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "clamped to [0, 255] before the cast"
                )]
                {
                    (c.clamp(0.0, 1.0) * na * 255.0).round().clamp(0.0, 255.0) as u8
                }
            };
            chunk[0] = to_premul(nr);
            chunk[1] = to_premul(ng);
            chunk[2] = to_premul(nb);
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "clamped to [0, 255] before the cast"
            )]
            {
                chunk[3] = (na * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    /// Premultiplied average color over the whole buffer, channels in [0, 1].
    ///
    /// Returns transparent black for an empty buffer.
    pub fn average_color(&self) -> [f64; 4] {
        let count = (self.width as usize) * (self.height as usize);
        if count == 0 {
            return [0.0; 4];
        }
        let mut sums = [0u64; 4];
        for chunk in self.data.chunks_exact(4) {
            for c in 0..4 {
                sums[c] += u64::from(chunk[c]);
            }
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "pixel counts are far below f64 integer precision"
        )]
        let denom = (count as f64) * 255.0;
        [
            sums[0] as f64 / denom,
            sums[1] as f64 / denom,
            sums[2] as f64 / denom,
            sums[3] as f64 / denom,
        ]
    }
}

fn checked_add(u: u32, d: i32) -> Option<u32> {
    let v = i64::from(u) + i64::from(d);
    u32::try_from(v).ok()
}
