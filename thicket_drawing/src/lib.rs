// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Drawing: a retained scene-graph drawing engine with a
//! budget-constrained render cache.
//!
//! The engine coordinates a mutable tree of drawable nodes, an incremental
//! update pass, a software render pass, a hit-testing ("pick") pass, and a
//! byte-budgeted bitmap cache that memoizes expensive subtrees.
//!
//! ## Architecture
//!
//! - [`Tree`]: a generational arena owning all nodes. Nodes are addressed by
//!   [`NodeId`] handles; stale handles are detected and degrade to no-ops.
//!   Each node is in exactly one attachment state (orphan, root, or child),
//!   enforced at attach time, so cycles cannot be constructed.
//! - [`ItemKind`]: a closed sum type over drawable kinds (group, filled rect,
//!   filled path, and a catch-all that matches every pick).
//! - [`Drawing`]: the façade consumed by a view layer. It owns the tree root,
//!   the global render/color modes with their precedence rules, the cache
//!   budget, and the four pipeline entry points:
//!   [`Drawing::update`], [`Drawing::render`], [`Drawing::pick`], and
//!   [`Drawing::set_root`].
//!
//! ## Per-frame protocol
//!
//! The driving view calls [`Drawing::update`] after any mutation, then
//! [`Drawing::render`] to paint a region, and [`Drawing::pick`] in response
//! to pointer events. Update is where bounding boxes, world transforms, and
//! cache scores are recomputed; render and pick trust that data and skip
//! clean or out-of-region subtrees.
//!
//! ## The cache
//!
//! Nodes whose estimated repaint cost exceeds a threshold become cache
//! candidates, scored and sized during the update pass. After every
//! cache-relevant update (and on every budget change) a greedy prefix of the
//! score-sorted candidate list is selected under the byte budget; selected
//! nodes keep a rasterized bitmap that the render pass blits instead of
//! re-painting the subtree. Caching is purely a performance device: output
//! pixels are identical with the cache on, off, or bypassed.
//!
//! This crate never returns errors across its public boundary: contract
//! violations and degenerate inputs are logged via the [`log`] facade and
//! degrade to the least surprising fallback.

mod cache;
mod drawing;
mod item;
mod pick;
mod render;
mod tree;
mod types;
mod update;
mod util;

pub use drawing::Drawing;
pub use item::ItemKind;
pub use types::{
    BLUR_QUALITY_BEST, BLUR_QUALITY_GOOD, BLUR_QUALITY_NORMAL, BLUR_QUALITY_WORSE,
    BLUR_QUALITY_WORST, ColorMode, DisplayKey, FILTER_QUALITY_BEST, FILTER_QUALITY_NORMAL,
    FILTER_QUALITY_WORST, NodeId, PickFlags, RenderFlags, RenderMode, StateFlags,
};
pub use tree::Tree;
