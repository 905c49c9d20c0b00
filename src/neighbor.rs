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

//! Component A: the port <-> (endpoint, cost) table shared by both protocol variants.

use std::collections::BTreeMap;

use crate::types::{Cost, Port, RoutingError, RouterAddr};

/// Port &lt;-&gt; (endpoint address, link cost) mapping, updated by link events.
///
/// Invariants: at most one entry per port; the same endpoint appears under at most one port
/// at a time (parallel links are not modeled); entries exist iff the link is up.
#[derive(Debug, Clone, Default)]
pub struct NeighborTable<A: RouterAddr> {
    entries: BTreeMap<Port, (A, Cost)>,
}

impl<A: RouterAddr> NeighborTable<A> {
    /// Create an empty neighbor table.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Install or replace the entry for `port`.
    ///
    /// Rejects the link if `endpoint` is already attached on a *different* port (parallel links
    /// to the same endpoint are unspecified behavior upstream; this implementation refuses the
    /// second link rather than guessing). Re-adding the same `(port, endpoint, cost)` is
    /// idempotent, and changing the cost of an already-known port is always allowed.
    pub fn add(&mut self, port: Port, endpoint: A, cost: Cost) -> Result<(), RoutingError<A>> {
        if let Some(existing_port) = self.lookup_port_by_endpoint(&endpoint) {
            if existing_port != port {
                return Err(RoutingError::DuplicateEndpoint {
                    endpoint,
                    existing: existing_port,
                    attempted: port,
                });
            }
        }
        self.entries.insert(port, (endpoint, cost));
        Ok(())
    }

    /// Remove the entry for `port`, if present. Idempotent on an absent port.
    pub fn remove(&mut self, port: Port) -> Option<(A, Cost)> {
        self.entries.remove(&port)
    }

    /// Look up the endpoint and cost for a port.
    pub fn get(&self, port: Port) -> Option<&(A, Cost)> {
        self.entries.get(&port)
    }

    /// Find the unique port whose endpoint equals `addr`, if the link is up.
    pub fn lookup_port_by_endpoint(&self, addr: &A) -> Option<Port> {
        self.entries
            .iter()
            .find(|(_, (endpoint, _))| endpoint == addr)
            .map(|(port, _)| *port)
    }

    /// Whether `port` currently has an up link.
    pub fn contains_port(&self, port: Port) -> bool {
        self.entries.contains_key(&port)
    }

    /// Iterate over all `(port, endpoint, cost)` triples in port order.
    pub fn iter(&self) -> impl Iterator<Item = (Port, &A, Cost)> {
        self.entries.iter().map(|(p, (a, c))| (*p, a, *c))
    }

    /// Number of currently-up links.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no up links.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
