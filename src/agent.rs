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

//! The capability a harness drives, shared by both protocol variants.
//!
//! Rather than an inheritance hierarchy rooted in a common `Router` base, the two variants are
//! independent implementations of one trait, chosen at construction by the caller (`DvAgent` or
//! `LsAgent`); they share only [`crate::neighbor::NeighborTable`].

use itertools::Itertools;

use crate::{packet::Packet, types::Cost, types::Port, types::RouterAddr};

/// Four events a harness delivers to a routing agent, and the two things it may ask the harness
/// to do in response (emit packets, nothing else — there are no other side effects).
pub trait RoutingAgent<A: RouterAddr> {
    /// Process an inbound packet arriving on `port`.
    fn handle_packet(&mut self, port: Port, packet: Packet<A>) -> Vec<(Port, Packet<A>)>;

    /// A link to `endpoint_addr` with the given cost came up on `port`.
    fn handle_new_link(&mut self, port: Port, endpoint_addr: A, cost: Cost) -> Vec<(Port, Packet<A>)>;

    /// The link on `port` went down.
    fn handle_remove_link(&mut self, port: Port) -> Vec<(Port, Packet<A>)>;

    /// The simulation clock advanced to `time_ms_since_start`.
    fn handle_time(&mut self, time_ms_since_start: u64) -> Vec<(Port, Packet<A>)>;

    /// A human-readable snapshot of the agent's current routing state, for debugging.
    fn snapshot(&self) -> AgentSnapshot<A>;
}

/// A structured, harness-agnostic report of an agent's current state.
///
/// This is the trait-object-friendly analogue of the original Python routers' `__repr__`, and of
/// `bgpsim`'s `NetworkFormatter` trait: plain data the caller can render however it likes instead
/// of a hardcoded string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSnapshot<A: RouterAddr> {
    /// The address of the router this snapshot describes.
    pub self_addr: A,
    /// For a DV agent: its own distance vector. For an LS agent: its own LSA's neighbor costs.
    pub routing_state: Vec<(A, Cost)>,
    /// The current forwarding table, as `(destination, port)` pairs in destination order.
    pub forwarding_table: Vec<(A, Port)>,
}

impl<A: RouterAddr + std::fmt::Display> std::fmt::Display for AgentSnapshot<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Router({})", self.self_addr)?;
        writeln!(
            f,
            "  routing state: {}",
            self.routing_state
                .iter()
                .map(|(a, c)| format!("{a}={c}"))
                .join(", ")
        )?;
        write!(
            f,
            "  forwarding table: {}",
            self.forwarding_table
                .iter()
                .map(|(a, p)| format!("{a}->{p}"))
                .join(", ")
        )
    }
}
