// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable item kinds.

use kurbo::{BezPath, Rect, Shape};
use thicket_raster::Rgba;

/// What a node draws, as a closed sum type.
///
/// Kind geometry is fixed at creation; geometric change is expressed through
/// the node's transform (or by replacing the node), so pick and render always
/// agree with the data computed by the last update pass.
#[derive(Clone, Debug)]
pub enum ItemKind {
    /// Paints nothing itself; its bounding box is the union of its children.
    Group,
    /// A filled axis-aligned rectangle in local coordinates.
    Rect {
        /// Local-space extent.
        rect: Rect,
        /// Fill color.
        fill: Rgba,
    },
    /// A filled path in local coordinates, hit-tested by containment.
    Path {
        /// Local-space outline.
        path: BezPath,
        /// Fill color.
        fill: Rgba,
    },
    /// Contains every point at zero distance and paints nothing. Added as the
    /// first (bottom-most) sibling, it guarantees event routing always finds
    /// a node while losing every tie to real content.
    CatchAll,
}

impl ItemKind {
    /// Local-space bounding rectangle of this kind's own geometry, if any.
    pub(crate) fn local_bounds(&self) -> Option<Rect> {
        match self {
            Self::Group | Self::CatchAll => None,
            Self::Rect { rect, .. } => Some(*rect),
            Self::Path { path, .. } => Some(path.bounding_box()),
        }
    }

    /// Whether this kind produces pixels of its own.
    pub(crate) fn paints(&self) -> bool {
        matches!(self, Self::Rect { .. } | Self::Path { .. })
    }

    pub(crate) fn set_fill(&mut self, new_fill: Rgba) {
        match self {
            Self::Rect { fill, .. } | Self::Path { fill, .. } => *fill = new_fill,
            Self::Group | Self::CatchAll => {}
        }
    }
}
