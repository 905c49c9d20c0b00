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

//! Component E: the destination -> output port lookup, strictly derived from B or C.

use std::collections::BTreeMap;

use crate::types::{Port, RouterAddr};

/// Destination -> output port. Never contains an entry for the owning router itself, and every
/// entry's port is (at the time it was built) present in the neighbor table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardingTable<A: RouterAddr> {
    entries: BTreeMap<A, Port>,
}

impl<A: RouterAddr> ForwardingTable<A> {
    /// An empty forwarding table.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Look up the outbound port for `dst`.
    pub fn lookup(&self, dst: &A) -> Option<Port> {
        self.entries.get(dst).copied()
    }

    /// Replace the whole table. Used by both DV and LS after each recomputation.
    pub fn set(&mut self, entries: BTreeMap<A, Port>) {
        self.entries = entries;
    }

    /// Remove every entry whose out-port is `port` (used on link-down before recomputation).
    pub fn retain_not_via(&mut self, port: Port) {
        self.entries.retain(|_, p| *p != port);
    }

    /// Iterate destinations in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&A, Port)> {
        self.entries.iter().map(|(a, p)| (a, *p))
    }

    /// Number of reachable destinations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_not_via_drops_only_matching_port() {
        let mut f: ForwardingTable<String> = ForwardingTable::new();
        f.set(BTreeMap::from([
            ("B".to_string(), Port(1)),
            ("C".to_string(), Port(1)),
            ("D".to_string(), Port(2)),
        ]));
        f.retain_not_via(Port(1));
        assert_eq!(f.lookup(&"B".to_string()), None);
        assert_eq!(f.lookup(&"C".to_string()), None);
        assert_eq!(f.lookup(&"D".to_string()), Some(Port(2)));
    }
}
