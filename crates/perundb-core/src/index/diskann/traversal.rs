//! Best-first graph traversal.
//!
//! The traversal expands the graph greedily from the entrypoint: a
//! min-priority frontier of unexpanded candidates and a bounded max-priority
//! result set, both keyed by distance to the query. It terminates once the
//! closest frontier entry is farther than the worst retained result and the
//! result set is full.
//!
//! Both heaps order lexicographically by `(distance, internal ID)`, so for a
//! given stored graph the visit order and the returned list are
//! deterministic.

use super::index::DiskAnnIndex;
use crate::element::Element;
use rustc_hash::FxHashSet;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Wrapper for f32 distances providing IEEE 754 total ordering for heaps.
///
/// Uses `f32::total_cmp`, keeping Ord/Eq/PartialEq consistent even for NaN
/// so heap ordering can never be corrupted by a degenerate distance.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderedDist(pub(crate) f32);

impl PartialEq for OrderedDist {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedDist {}

impl PartialOrd for OrderedDist {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedDist {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl<T: Element> DiskAnnIndex<T> {
    /// Expands the graph best-first from the entrypoint.
    ///
    /// Returns up to `ef` `(distance, internal ID)` pairs sorted by ascending
    /// distance, ties by ascending ID. An empty index yields an empty list.
    pub(crate) fn traverse(&self, query: &[T], ef: usize) -> Vec<(f32, u32)> {
        let Some(entry) = self.entrypoint() else {
            return Vec::new();
        };

        let mut visited: FxHashSet<u32> = FxHashSet::default();
        let mut frontier: BinaryHeap<Reverse<(OrderedDist, u32)>> = BinaryHeap::new();
        let mut results: BinaryHeap<(OrderedDist, u32)> = BinaryHeap::new();

        let entry_dist = self.metric().distance(query, self.vector(entry));
        frontier.push(Reverse((OrderedDist(entry_dist), entry)));
        results.push((OrderedDist(entry_dist), entry));
        visited.insert(entry);

        while let Some(Reverse((OrderedDist(dist), node))) = frontier.pop() {
            let worst = results.peek().map_or(f32::MAX, |r| r.0 .0);
            if dist > worst && results.len() >= ef {
                break;
            }

            for neighbor in self.neighbors(node) {
                if visited.insert(neighbor) {
                    debug_assert!(
                        !self.is_tombstoned(neighbor),
                        "tombstoned slot {neighbor} reachable from slot {node}"
                    );
                    let d = self.metric().distance(query, self.vector(neighbor));
                    let worst = results.peek().map_or(f32::MAX, |r| r.0 .0);

                    if results.len() < ef || d < worst {
                        frontier.push(Reverse((OrderedDist(d), neighbor)));
                        results.push((OrderedDist(d), neighbor));

                        if results.len() > ef {
                            results.pop();
                        }
                    }
                }
            }
        }

        let mut out: Vec<(f32, u32)> = results.into_iter().map(|(d, id)| (d.0, id)).collect();
        out.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        out
    }
}
