// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Raster: the software raster substrate for the Thicket drawing engine.
//!
//! This crate is deliberately small and free of scene-graph concerns. It provides:
//!
//! - [`IntRect`]: half-open axis-aligned rectangles in integer device pixels,
//!   with `Option<IntRect>` as the "possibly empty" representation used across
//!   the engine. Degenerate geometry rounds to `None`, never to a zero-area
//!   rectangle that would wrongly intersect everything.
//! - [`Pixmap`]: a premultiplied RGBA8 pixel buffer with source-over
//!   compositing, whole-buffer color-matrix filtering, and a premultiplied
//!   average-color reduction.
//! - [`RenderContext`]: a pixmap borrowed together with a device-space origin,
//!   so render passes can address pixels in device coordinates regardless of
//!   which region the target buffer covers.
//! - [`ColorMatrix`]: a 4×5 color matrix applied to unpremultiplied RGBA,
//!   used for the grayscale color-mode post-process.
//! - [`Rgba`]: a straight-alpha color with premultiplication helpers.
//!
//! Coordinates follow the usual raster convention: x grows right, y grows
//! down, and a pixel `(x, y)` covers the half-open unit square with its
//! center at `(x + 0.5, y + 0.5)`.

mod color_matrix;
mod context;
mod pixmap;
mod rect;

pub use color_matrix::ColorMatrix;
pub use context::RenderContext;
pub use pixmap::{Pixmap, Rgba};
pub use rect::IntRect;
