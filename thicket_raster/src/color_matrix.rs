// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 4×5 color matrices for whole-buffer post-processing.

/// A 4×5 color matrix in row-major order.
///
/// Each output channel is a linear combination of the four unpremultiplied
/// input channels plus a constant term:
///
/// ```text
/// r' = m[0]*r + m[1]*g + m[2]*b + m[3]*a + m[4]
/// g' = m[5]*r + ...
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix([f64; 20]);

impl ColorMatrix {
    /// The default grayscale matrix (luminance weights 0.21/0.72/0.072).
    pub const GRAYSCALE: Self = Self([
        0.21, 0.72, 0.072, 0.0, 0.0, //
        0.21, 0.72, 0.072, 0.0, 0.0, //
        0.21, 0.72, 0.072, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    /// The identity matrix (no color change).
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    /// Build from raw row-major coefficients.
    pub const fn from_coeffs(coeffs: [f64; 20]) -> Self {
        Self(coeffs)
    }

    /// Build a grayscale matrix from per-channel luminance weights, typically
    /// sourced from user preferences.
    pub fn grayscale_from_weights(r: f64, g: f64, b: f64) -> Self {
        Self([
            r, g, b, 0.0, 0.0, //
            r, g, b, 0.0, 0.0, //
            r, g, b, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    /// Raw coefficients.
    pub const fn coeffs(&self) -> &[f64; 20] {
        &self.0
    }

    /// Apply to one unpremultiplied RGBA sample. Output is not clamped.
    pub fn apply(&self, [r, g, b, a]: [f64; 4]) -> [f64; 4] {
        let m = &self.0;
        let row = |i: usize| m[i] * r + m[i + 1] * g + m[i + 2] * b + m[i + 3] * a + m[i + 4];
        [row(0), row(5), row(10), row(15)]
    }
}
