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

//! Link-state agent: components C (LSDB + Dijkstra) and D (controlled flooding), wired into the
//! event dispatcher (component F).

mod lsdb;
pub use lsdb::{Lsdb, LsaEntry};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    agent::{AgentSnapshot, RoutingAgent},
    codec::ControlMessage,
    forwarding::ForwardingTable,
    neighbor::NeighborTable,
    packet::{Packet, PacketKind},
    types::{Cost, Port, RouterAddr},
};

/// A link-state routing agent.
///
/// Floods sequence-numbered link-state advertisements to all neighbors, derives a shortest-path
/// tree rooted at itself via Dijkstra, and periodically rebroadcasts its own LSA for liveness.
#[derive(Debug)]
pub struct LsAgent<A: RouterAddr + Serialize + for<'de> Deserialize<'de>> {
    self_addr: A,
    heartbeat_time_ms: u64,
    last_broadcast_time_ms: u64,
    own_sequence: u64,
    neighbors: NeighborTable<A>,
    lsdb: Lsdb<A>,
    /// Highest sequence number re-flooded per originator, so an LSA is never re-flooded twice
    /// even if it is re-derived from the (unbounded in principle) LSDB. Capped to one entry per
    /// originator rather than growing with every (originator, sequence) pair ever seen.
    seen_floods: BTreeMap<A, u64>,
    forwarding: ForwardingTable<A>,
}

impl<A: RouterAddr + Serialize + for<'de> Deserialize<'de>> LsAgent<A> {
    /// Construct a new LS agent for `self_addr`, rebroadcasting at most once per
    /// `heartbeat_time_ms` of simulated time.
    pub fn new(self_addr: A, heartbeat_time_ms: u64) -> Self {
        let mut lsdb = Lsdb::new();
        lsdb.install(self_addr.clone(), 0, BTreeMap::new());
        Self {
            self_addr,
            heartbeat_time_ms,
            last_broadcast_time_ms: 0,
            own_sequence: 0,
            neighbors: NeighborTable::new(),
            lsdb,
            seen_floods: BTreeMap::new(),
            forwarding: ForwardingTable::new(),
        }
    }

    /// The sequence number of this agent's own LSA. Equals the number of `link_up`/`link_down`
    /// events processed so far.
    pub fn own_sequence(&self) -> u64 {
        self.own_sequence
    }

    /// Bump the sequence number and rebuild this agent's own LSA from the neighbor table.
    fn rebuild_own_lsa(&mut self) {
        self.own_sequence += 1;
        let neighbors: BTreeMap<A, Cost> = self
            .neighbors
            .iter()
            .map(|(_, endpoint, cost)| (endpoint.clone(), cost))
            .collect();
        self.lsdb
            .install(self.self_addr.clone(), self.own_sequence, neighbors);
        self.seen_floods
            .insert(self.self_addr.clone(), self.own_sequence);
    }

    /// Recompute the shortest-path tree rooted at `self` and rebuild the forwarding table from
    /// it, omitting any destination whose first-hop neighbor is not currently in the neighbor
    /// table (the LSDB may be momentarily ahead of or behind the physical topology).
    fn run_dijkstra(&mut self) {
        let (distances, predecessors) = self.lsdb.dijkstra(&self.self_addr);
        let mut table = BTreeMap::new();
        for dest in distances.keys() {
            if *dest == self.self_addr {
                continue;
            }
            let Some(first_hop) = Lsdb::first_hop(&self.self_addr, dest, &predecessors) else {
                continue;
            };
            if let Some(port) = self.neighbors.lookup_port_by_endpoint(&first_hop) {
                table.insert(dest.clone(), port);
            }
        }
        self.forwarding.set(table);
    }

    fn own_lsa_packet_to(&self, dest_addr: A) -> Packet<A> {
        let neighbors = self
            .lsdb
            .neighbors_of(&self.self_addr)
            .cloned()
            .unwrap_or_default();
        let content = ControlMessage::LinkState {
            originator: self.self_addr.clone(),
            sequence: self.own_sequence,
            neighbors,
        }
        .encode();
        Packet::new(PacketKind::Routing, self.self_addr.clone(), dest_addr, content)
    }

    /// Flood this agent's own LSA to every current neighbor.
    fn flood_own_lsa(&self) -> Vec<(Port, Packet<A>)> {
        self.neighbors
            .iter()
            .map(|(port, endpoint, _)| (port, self.own_lsa_packet_to(endpoint.clone())))
            .collect()
    }
}

impl<A: RouterAddr + Serialize + for<'de> Deserialize<'de>> RoutingAgent<A> for LsAgent<A> {
    fn handle_packet(&mut self, arrival_port: Port, packet: Packet<A>) -> Vec<(Port, Packet<A>)> {
        log::trace!(
            "{:?}: handle_packet({arrival_port:?}, {:?})",
            self.self_addr,
            packet.kind
        );
        if packet.is_traceroute() {
            return match self.forwarding.lookup(&packet.dst_addr) {
                Some(out_port) => vec![(out_port, packet)],
                None => Vec::new(),
            };
        }

        let Ok(ControlMessage::LinkState {
            originator,
            sequence,
            neighbors,
        }) = ControlMessage::decode(&packet.content)
        else {
            log::debug!("{:?}: dropping malformed or mistyped LSA payload", self.self_addr);
            return Vec::new();
        };

        let is_newer = self
            .lsdb
            .apply_if_newer(originator.clone(), sequence, neighbors);
        if !is_newer {
            return Vec::new();
        }
        self.seen_floods.insert(originator, sequence);
        self.run_dijkstra();

        self.neighbors
            .iter()
            .filter(|(port, _, _)| *port != arrival_port)
            .map(|(port, _, _)| (port, packet.clone()))
            .collect()
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
        if let Err(e) = self.neighbors.add(port, endpoint_addr, cost) {
            log::warn!("{:?}: {e}", self.self_addr);
            return Vec::new();
        }
        self.rebuild_own_lsa();
        self.run_dijkstra();
        self.flood_own_lsa()
    }

    fn handle_remove_link(&mut self, port: Port) -> Vec<(Port, Packet<A>)> {
        log::trace!("{:?}: handle_remove_link({port:?})", self.self_addr);
        if self.neighbors.remove(port).is_none() {
            return Vec::new();
        }
        self.rebuild_own_lsa();
        self.run_dijkstra();
        self.flood_own_lsa()
    }

    fn handle_time(&mut self, time_ms_since_start: u64) -> Vec<(Port, Packet<A>)> {
        log::trace!("{:?}: handle_time({time_ms_since_start})", self.self_addr);
        if time_ms_since_start.saturating_sub(self.last_broadcast_time_ms) >= self.heartbeat_time_ms
        {
            self.last_broadcast_time_ms = time_ms_since_start;
            self.flood_own_lsa()
        } else {
            Vec::new()
        }
    }

    fn snapshot(&self) -> AgentSnapshot<A> {
        let routing_state = self
            .lsdb
            .neighbors_of(&self.self_addr)
            .map(|m| m.iter().map(|(a, c)| (a.clone(), *c)).collect())
            .unwrap_or_default();
        AgentSnapshot {
            self_addr: self.self_addr.clone(),
            routing_state,
            forwarding_table: self.forwarding.iter().map(|(a, p)| (a.clone(), p)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recv_lsa(originator: &str, sequence: u64, neighbors: &[(&str, Cost)]) -> Packet<String> {
        let neighbors = neighbors.iter().map(|(a, c)| (a.to_string(), *c)).collect();
        Packet::new(
            PacketKind::Routing,
            originator.to_string(),
            "ignored".to_string(),
            ControlMessage::LinkState {
                originator: originator.to_string(),
                sequence,
                neighbors,
            }
            .encode(),
        )
    }

    #[test]
    fn link_up_bumps_sequence_and_floods() {
        let mut a = LsAgent::new("A".to_string(), 1000);
        let out = a.handle_new_link(Port(1), "B".to_string(), 1);
        assert_eq!(a.own_sequence(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, Port(1));
    }

    #[test]
    fn sequence_counts_topology_events() {
        let mut a = LsAgent::new("A".to_string(), 1000);
        a.handle_new_link(Port(1), "B".to_string(), 1);
        a.handle_new_link(Port(2), "C".to_string(), 1);
        a.handle_remove_link(Port(2));
        assert_eq!(a.own_sequence(), 3);
    }

    #[test]
    fn stale_sequence_is_ignored_and_not_reflooded() {
        let mut a = LsAgent::new("A".to_string(), 1000);
        a.handle_new_link(Port(1), "B".to_string(), 1);

        let applied = a.handle_packet(Port(1), recv_lsa("B", 5, &[("A", 1)]));
        assert_eq!(applied.len(), 0, "no other neighbors to flood to yet");
        assert_eq!(a.lsdb.sequence_of(&"B".to_string()), Some(5));

        // an older sequence number must be ignored, and the LSDB must keep showing 5.
        let stale = a.handle_packet(Port(1), recv_lsa("B", 3, &[("A", 99)]));
        assert!(stale.is_empty());
        assert_eq!(a.lsdb.sequence_of(&"B".to_string()), Some(5));
        assert_eq!(
            a.lsdb.neighbors_of(&"B".to_string()).unwrap().get("A"),
            Some(&1)
        );
    }

    #[test]
    fn redelivering_the_same_lsa_is_idempotent() {
        let mut a = LsAgent::new("A".to_string(), 1000);
        a.handle_new_link(Port(1), "B".to_string(), 1);
        a.handle_new_link(Port(2), "C".to_string(), 1);

        let first = a.handle_packet(Port(1), recv_lsa("D", 4, &[("A", 1)]));
        assert_eq!(first.len(), 1, "floods once, to the one other neighbor");
        let table_before = a.forwarding.clone();

        let second = a.handle_packet(Port(1), recv_lsa("D", 4, &[("A", 1)]));
        assert!(second.is_empty(), "an already-seen sequence is not reflooded");
        assert_eq!(a.forwarding, table_before, "LSDB/forwarding table is unchanged");
    }

    #[test]
    fn flooding_excludes_arrival_port() {
        let mut a = LsAgent::new("A".to_string(), 1000);
        a.handle_new_link(Port(1), "B".to_string(), 1);
        a.handle_new_link(Port(2), "C".to_string(), 1);

        let out = a.handle_packet(Port(1), recv_lsa("D", 1, &[("A", 1)]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, Port(2));
    }

    #[test]
    fn triangle_converges_to_shortest_path() {
        let mut a = LsAgent::new("A".to_string(), 1000);
        a.handle_new_link(Port(1), "B".to_string(), 1);
        a.handle_new_link(Port(2), "C".to_string(), 5);
        a.handle_packet(Port(1), recv_lsa("B", 1, &[("A", 1), ("C", 1)]));
        a.handle_packet(Port(2), recv_lsa("C", 1, &[("A", 5), ("B", 1)]));

        assert_eq!(a.forwarding.lookup(&"C".to_string()), Some(Port(1)));
        assert_eq!(a.forwarding.lookup(&"B".to_string()), Some(Port(1)));
    }

    #[test]
    fn traceroute_miss_is_dropped_silently() {
        let mut a = LsAgent::new("A".to_string(), 1000);
        let packet = Packet::new(PacketKind::Data, "Q".to_string(), "Z".to_string(), vec![]);
        assert!(a.handle_packet(Port(1), packet).is_empty());
    }

    #[test]
    fn heartbeat_rebroadcasts_without_bumping_sequence() {
        let mut a = LsAgent::new("A".to_string(), 100);
        a.handle_new_link(Port(1), "B".to_string(), 1);
        let seq_before = a.own_sequence();
        let out = a.handle_time(100);
        assert_eq!(out.len(), 1);
        assert_eq!(a.own_sequence(), seq_before);
    }
}
