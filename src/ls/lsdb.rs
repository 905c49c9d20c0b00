// routingsim: distance-vector and link-state routing agents for a simulated network
// Copyright (c) 2024 the routingsim authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Component C: sequence-numbered link-state records keyed by originator, and Dijkstra over the
//! graph they describe.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::types::{Cost, RouterAddr};

/// One originator's link-state record: its sequence number and its current neighbor costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsaEntry<A: RouterAddr> {
    /// Sequence number this LSA was stamped with by its originator.
    pub sequence: u64,
    /// The originator's neighbors and the cost of each directed edge to them.
    pub neighbors: BTreeMap<A, Cost>,
}

/// The link-state database: one entry per originator ever heard from, always including `self`.
#[derive(Debug, Clone, Default)]
pub struct Lsdb<A: RouterAddr> {
    entries: BTreeMap<A, LsaEntry<A>>,
}

impl<A: RouterAddr> Lsdb<A> {
    /// An empty database.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The stored sequence number for `originator`, if any.
    pub fn sequence_of(&self, originator: &A) -> Option<u64> {
        self.entries.get(originator).map(|e| e.sequence)
    }

    /// Unconditionally install an LSA, replacing any prior entry for its originator.
    pub fn install(&mut self, originator: A, sequence: u64, neighbors: BTreeMap<A, Cost>) {
        self.entries
            .insert(originator, LsaEntry { sequence, neighbors });
    }

    /// Apply an incoming LSA iff its sequence is strictly newer than what is stored (or the
    /// originator is new). Equal or lower sequences are ignored, not reapplied.
    ///
    /// Returns whether the LSA was applied.
    pub fn apply_if_newer(&mut self, originator: A, sequence: u64, neighbors: BTreeMap<A, Cost>) -> bool {
        let is_newer = match self.entries.get(&originator) {
            None => true,
            Some(existing) => sequence > existing.sequence,
        };
        if is_newer {
            self.install(originator, sequence, neighbors);
        }
        is_newer
    }

    /// The neighbor-cost map stored for `originator`, if any.
    pub fn neighbors_of(&self, originator: &A) -> Option<&BTreeMap<A, Cost>> {
        self.entries.get(originator).map(|e| &e.neighbors)
    }

    /// Run Dijkstra from `source` over the directed graph formed by every LSA's edges.
    ///
    /// Vertices are every address appearing as an originator or as a referenced neighbor.
    /// Returns `(distances, predecessors)`, both keyed by reachable vertex.
    pub fn dijkstra(&self, source: &A) -> (BTreeMap<A, Cost>, BTreeMap<A, A>) {
        let mut distances: BTreeMap<A, Cost> = BTreeMap::new();
        let mut predecessors: BTreeMap<A, A> = BTreeMap::new();
        let mut visited: BTreeSet<A> = BTreeSet::new();

        distances.insert(source.clone(), 0);
        // Min-heap via Reverse; duplicates are pushed and stale entries skipped on pop
        // (lazy deletion) rather than maintaining a mutable heap with decrease-key.
        let mut heap: BinaryHeap<Reverse<(Cost, A)>> = BinaryHeap::new();
        heap.push(Reverse((0, source.clone())));

        while let Some(Reverse((dist, node))) = heap.pop() {
            if !visited.insert(node.clone()) {
                continue;
            }
            let Some(edges) = self.entries.get(&node).map(|e| &e.neighbors) else {
                continue;
            };
            for (neighbor, cost) in edges {
                let candidate = dist.saturating_add(*cost);
                let better = distances
                    .get(neighbor)
                    .map(|&known| candidate < known)
                    .unwrap_or(true);
                if better {
                    distances.insert(neighbor.clone(), candidate);
                    predecessors.insert(neighbor.clone(), node.clone());
                    heap.push(Reverse((candidate, neighbor.clone())));
                }
            }
        }

        (distances, predecessors)
    }

    /// For every destination with finite distance, the neighbor of `source` that the
    /// shortest-path tree routes through (walking `predecessors` back to the root's direct
    /// child). `None` if `dest == source` or `dest` is unreachable.
    pub fn first_hop(source: &A, dest: &A, predecessors: &BTreeMap<A, A>) -> Option<A> {
        if dest == source {
            return None;
        }
        let mut hop = dest.clone();
        loop {
            let pred = predecessors.get(&hop)?;
            if pred == source {
                return Some(hop);
            }
            hop = pred.clone();
        }
    }
}
