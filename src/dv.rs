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

//! Component B: distance-vector state and Bellman-Ford recomputation, plus the DV agent that
//! wires it into the event dispatcher (component F).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    agent::{AgentSnapshot, RoutingAgent},
    codec::ControlMessage,
    forwarding::ForwardingTable,
    neighbor::NeighborTable,
    packet::{Packet, PacketKind},
    types::{clamp_add, Cost, Port, RouterAddr, INFINITY},
};

/// A distance-vector routing agent.
///
/// Maintains its own distance vector and the latest vector heard from each currently-connected
/// neighbor, recomputing both on every topology change or neighbor update, and periodically
/// rebroadcasting to guarantee liveness under lossy delivery.
#[derive(Debug)]
pub struct DvAgent<A: RouterAddr + Serialize + for<'de> Deserialize<'de>> {
    self_addr: A,
    heartbeat_time_ms: u64,
    last_broadcast_time_ms: u64,
    neighbors: NeighborTable<A>,
    own_vector: BTreeMap<A, Cost>,
    neighbor_vectors: BTreeMap<A, BTreeMap<A, Cost>>,
    forwarding: ForwardingTable<A>,
}

impl<A: RouterAddr + Serialize + for<'de> Deserialize<'de>> DvAgent<A> {
    /// Construct a new DV agent for `self_addr`, rebroadcasting at most once per
    /// `heartbeat_time_ms` of simulated time.
    pub fn new(self_addr: A, heartbeat_time_ms: u64) -> Self {
        let mut own_vector = BTreeMap::new();
        own_vector.insert(self_addr.clone(), 0);
        Self {
            self_addr,
            heartbeat_time_ms,
            last_broadcast_time_ms: 0,
            neighbors: NeighborTable::new(),
            own_vector,
            neighbor_vectors: BTreeMap::new(),
            forwarding: ForwardingTable::new(),
        }
    }

    /// Recompute `own_vector` from the neighbor table and cached neighbor vectors.
    ///
    /// Returns whether the vector changed (same key set, same cost per key, counts as equal).
    fn recompute(&mut self) -> bool {
        let mut new_vector: BTreeMap<A, Cost> = BTreeMap::new();
        new_vector.insert(self.self_addr.clone(), 0);
        for (_, endpoint, cost) in self.neighbors.iter() {
            new_vector.insert(endpoint.clone(), cost);
        }
        for (_, endpoint, link_cost) in self.neighbors.iter() {
            let Some(from_vector) = self.neighbor_vectors.get(endpoint) else {
                continue;
            };
            for (dest, cost) in from_vector {
                if *dest == self.self_addr {
                    continue;
                }
                let total = clamp_add(link_cost, *cost);
                let entry = new_vector.entry(dest.clone()).or_insert(INFINITY);
                if total < *entry {
                    *entry = total;
                }
            }
        }

        // Destinations known before (directly or via a neighbor) but now unreachable are
        // advertised as INFINITY rather than silently dropped, so withdrawals propagate.
        let mut known: BTreeSet<A> = self.own_vector.keys().cloned().collect();
        for vector in self.neighbor_vectors.values() {
            known.extend(vector.keys().cloned());
        }
        for dest in known {
            if dest != self.self_addr {
                new_vector.entry(dest).or_insert(INFINITY);
            }
        }

        let changed = self.own_vector != new_vector;
        self.own_vector = new_vector;
        changed
    }

    /// Rebuild the forwarding table from the current neighbor table and `own_vector`/neighbor
    /// vectors. Ties are broken by first match in neighbor-table (port) iteration order.
    fn rebuild_forwarding(&mut self) {
        let destinations: Vec<A> = self
            .own_vector
            .keys()
            .filter(|d| **d != self.self_addr)
            .cloned()
            .collect();
        let mut table = BTreeMap::new();
        for dest in destinations {
            let mut best_cost = Cost::MAX;
            let mut best_port = None;
            for (port, endpoint, cost) in self.neighbors.iter() {
                if *endpoint == dest {
                    best_cost = cost;
                    best_port = Some(port);
                    break;
                }
            }
            for (port, endpoint, cost_to_neighbor) in self.neighbors.iter() {
                let Some(from_neighbor) = self.neighbor_vectors.get(endpoint) else {
                    continue;
                };
                let Some(&cost_from_neighbor) = from_neighbor.get(&dest) else {
                    continue;
                };
                let total = cost_to_neighbor.saturating_add(cost_from_neighbor);
                if total < best_cost {
                    best_cost = total;
                    best_port = Some(port);
                }
            }
            if let Some(port) = best_port {
                if best_cost < INFINITY {
                    table.insert(dest, port);
                }
            }
        }
        self.forwarding.set(table);
    }

    fn vector_packet_to(&self, dest_addr: A) -> Packet<A> {
        let content = ControlMessage::DistanceVector(self.own_vector.clone()).encode();
        Packet::new(PacketKind::Routing, self.self_addr.clone(), dest_addr, content)
    }

    /// Send the current distance vector to every current neighbor.
    fn broadcast(&self) -> Vec<(Port, Packet<A>)> {
        self.neighbors
            .iter()
            .map(|(port, endpoint, _)| (port, self.vector_packet_to(endpoint.clone())))
            .collect()
    }

    /// Send the current distance vector to one specific neighbor.
    fn send_to(&self, port: Port) -> Option<(Port, Packet<A>)> {
        let (endpoint, _) = self.neighbors.get(port)?;
        Some((port, self.vector_packet_to(endpoint.clone())))
    }
}

impl<A: RouterAddr + Serialize + for<'de> Deserialize<'de>> RoutingAgent<A> for DvAgent<A> {
    fn handle_packet(&mut self, port: Port, packet: Packet<A>) -> Vec<(Port, Packet<A>)> {
        log::trace!("{:?}: handle_packet({port:?}, {:?})", self.self_addr, packet.kind);
        if packet.is_traceroute() {
            return match self.forwarding.lookup(&packet.dst_addr) {
                Some(out_port) => vec![(out_port, packet)],
                None => Vec::new(),
            };
        }

        let Ok(ControlMessage::DistanceVector(received)) = ControlMessage::decode(&packet.content)
        else {
            log::debug!("{:?}: dropping malformed or mistyped DV payload", self.self_addr);
            return Vec::new();
        };

        let neighbor_addr = packet.src_addr;
        if self.neighbors.lookup_port_by_endpoint(&neighbor_addr).is_none() {
            log::debug!(
                "{:?}: dropping DV update from non-neighbor {:?}",
                self.self_addr,
                neighbor_addr
            );
            return Vec::new();
        }

        if self.neighbor_vectors.get(&neighbor_addr) == Some(&received) {
            return Vec::new();
        }
        self.neighbor_vectors.insert(neighbor_addr, received);

        let changed = self.recompute();
        self.rebuild_forwarding();
        if changed {
            self.broadcast()
        } else {
            Vec::new()
        }
    }

    fn handle_new_link(
        &mut self,
        port: Port,
        endpoint_addr: A,
        cost: Cost,
    ) -> Vec<(Port, Packet<A>)> {
        log::trace!(
            "{:?}: handle_new_link({port:?}, {endpoint_addr:?}, {cost})",
            self.self_addr
        );
        if let Err(e) = self.neighbors.add(port, endpoint_addr.clone(), cost) {
            log::warn!("{:?}: {e}", self.self_addr);
            return Vec::new();
        }
        self.own_vector.insert(endpoint_addr, cost);
        self.recompute();
        self.rebuild_forwarding();

        let mut out = self.broadcast();
        if let Some(direct) = self.send_to(port) {
            out.push(direct);
        }
        out
    }

    fn handle_remove_link(&mut self, port: Port) -> Vec<(Port, Packet<A>)> {
        log::trace!("{:?}: handle_remove_link({port:?})", self.self_addr);
        let Some((endpoint, _)) = self.neighbors.remove(port) else {
            return Vec::new();
        };
        self.neighbor_vectors.remove(&endpoint);
        self.own_vector.insert(endpoint, INFINITY);
        self.forwarding.retain_not_via(port);
        self.recompute();
        self.rebuild_forwarding();
        self.broadcast()
    }

    fn handle_time(&mut self, time_ms_since_start: u64) -> Vec<(Port, Packet<A>)> {
        log::trace!("{:?}: handle_time({time_ms_since_start})", self.self_addr);
        if time_ms_since_start.saturating_sub(self.last_broadcast_time_ms) >= self.heartbeat_time_ms
        {
            self.last_broadcast_time_ms = time_ms_since_start;
            self.broadcast()
        } else {
            Vec::new()
        }
    }

    fn snapshot(&self) -> AgentSnapshot<A> {
        AgentSnapshot {
            self_addr: self.self_addr.clone(),
            routing_state: self
                .own_vector
                .iter()
                .map(|(a, c)| (a.clone(), *c))
                .collect(),
            forwarding_table: self.forwarding.iter().map(|(a, p)| (a.clone(), p)).collect(),
        }
    }
}
