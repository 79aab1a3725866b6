// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: node identifiers, flag sets, modes, and quality levels.

/// Identifier for a node in the tree (generational).
///
/// A `NodeId` stays valid until its node is removed. After removal the slot
/// may be reused with a bumped generation, so stale identifiers are
/// detectable and every public accessor treats them as absent.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Aspects of a node's derived state, used both as "up to date" markers
    /// on nodes and as request masks for [`crate::Drawing::update`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct StateFlags: u8 {
        /// Bounding box and world transform.
        const BBOX   = 0b0000_0001;
        /// Cache score, size estimate, and cache rectangle.
        const CACHE  = 0b0000_0010;
        /// Pick-related state.
        const PICK   = 0b0000_0100;
        /// Rendered output (cached bitmaps go stale when this is dirtied).
        const RENDER = 0b0000_1000;
        /// Everything.
        const ALL    = 0b0000_1111;
    }
}

bitflags::bitflags! {
    /// Flags controlling a pick traversal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PickFlags: u8 {
        /// Match hidden and unpickable nodes too ("sticky" picking).
        const STICKY = 0b0000_0001;
    }
}

bitflags::bitflags! {
    /// Flags controlling a render traversal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u8 {
        /// Paint directly, ignoring cached bitmaps.
        const BYPASS_CACHE = 0b0000_0001;
    }
}

/// Global rendering mode requested by the view.
///
/// The effective mode is reported by [`crate::Drawing::render_mode`], which
/// applies the `exact` override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Full-quality rendering.
    #[default]
    Normal,
    /// Outline-only preview.
    Outline,
    /// Full rendering with filter effects disabled.
    NoFilters,
    /// Full rendering with hairlines forced visible.
    VisibleHairlines,
    /// Full rendering with an outline overlay.
    OutlineOverlay,
}

/// Global color post-processing mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// No color post-processing.
    #[default]
    Normal,
    /// Whole-buffer grayscale color-matrix pass after rendering.
    Grayscale,
    /// Print-colors preview (no whole-buffer pass at this layer).
    PrintColorsPreview,
}

/// Opaque key correlating a document element's show and hide calls.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DisplayKey(pub u64);

/// Best blur quality, used in exact mode.
pub const BLUR_QUALITY_BEST: i32 = 2;
/// Good blur quality.
pub const BLUR_QUALITY_GOOD: i32 = 1;
/// Default blur quality.
pub const BLUR_QUALITY_NORMAL: i32 = 0;
/// Reduced blur quality.
pub const BLUR_QUALITY_WORSE: i32 = -1;
/// Worst blur quality, used in preview modes.
pub const BLUR_QUALITY_WORST: i32 = -2;

/// Best filter quality, used in exact mode.
pub const FILTER_QUALITY_BEST: i32 = 2;
/// Default filter quality.
pub const FILTER_QUALITY_NORMAL: i32 = 0;
/// Worst filter quality, used in preview modes.
pub const FILTER_QUALITY_WORST: i32 = -2;
