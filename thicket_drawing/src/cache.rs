// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cache subsystem: candidate bookkeeping and budget-constrained
//! selection of which subtrees keep a rasterized bitmap.

use hashbrown::HashSet;

use crate::tree::Tree;
use crate::types::NodeId;

/// Minimum score for a node to be considered for caching at all. Keeps
/// trivially cheap leaf shapes out of the candidate list entirely.
pub(crate) const MIN_CACHE_SCORE: f64 = 50_000.0;

/// One cache-eligible node with its selection inputs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CacheCandidate {
    pub(crate) id: NodeId,
    /// Benefit of caching; higher means more expensive to re-render relative
    /// to its footprint.
    pub(crate) score: f64,
    /// Estimated bitmap footprint in bytes.
    pub(crate) size: usize,
}

/// The global candidate list, kept sorted by score descending.
///
/// All mutation goes through [`CandidateList::reindex`] (remove and
/// re-insert at the sorted position) and [`CandidateList::remove`], keeping
/// the ordering invariant local to this type. Entries with equal scores keep
/// their relative insertion order.
#[derive(Debug, Default)]
pub(crate) struct CandidateList {
    entries: Vec<CacheCandidate>,
}

impl CandidateList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Remove any existing entry for `id` and insert it at its sorted
    /// position for the new score.
    pub(crate) fn reindex(&mut self, id: NodeId, score: f64, size: usize) {
        self.remove(id);
        let at = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(at, CacheCandidate { id, score, size });
    }

    pub(crate) fn remove(&mut self, id: NodeId) {
        self.entries.retain(|e| e.id != id);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &CacheCandidate> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Select the set of nodes to keep cached under `budget` bytes and
/// promote/demote nodes so the cached set matches the selection.
///
/// The scan walks the score-sorted candidate list accumulating sizes and
/// stops at the first candidate whose inclusion would exceed the budget
/// (greedy prefix; no bin packing, no skip-and-continue). A budget of zero
/// therefore empties the cached set, and a candidate larger than the whole
/// budget blocks everything behind it.
pub(crate) fn pick_items_for_caching(
    tree: &mut Tree,
    candidates: &CandidateList,
    budget: usize,
    cached: &mut HashSet<NodeId>,
) {
    let mut used: usize = 0;
    let mut prefix: Vec<NodeId> = Vec::new();
    for c in candidates.iter() {
        let Some(next) = used.checked_add(c.size) else {
            break;
        };
        if next > budget {
            break;
        }
        used = next;
        prefix.push(c.id);
    }

    let to_cache: HashSet<NodeId> = prefix.iter().copied().collect();
    let to_uncache: Vec<NodeId> = cached.difference(&to_cache).copied().collect();
    for id in to_uncache {
        set_cached(tree, cached, id, false);
    }
    for id in prefix {
        set_cached(tree, cached, id, true);
    }
}

/// Move a node in or out of the cached set.
///
/// Caching is lazy: promotion only records membership, and the render pass
/// provisions the bitmap on its next visit. Demotion releases the bitmap
/// immediately so membership and bitmap presence always agree.
pub(crate) fn set_cached(tree: &mut Tree, cached: &mut HashSet<NodeId>, id: NodeId, on: bool) {
    if !tree.is_alive(id) {
        cached.remove(&id);
        return;
    }
    if on {
        cached.insert(id);
    } else {
        cached.remove(&id);
        tree.node_mut(id).cache = None;
    }
}
