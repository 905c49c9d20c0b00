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

#![deny(missing_docs, missing_debug_implementations)]

//! # routingsim
//!
//! Core routing logic for a per-node agent in a simulated packet-switched network: a
//! forwarding table keyed by destination address, control-message exchange with directly
//! connected neighbors, and forwarding of data packets along computed shortest paths.
//!
//! Two independent, non-interoperating agent variants are provided:
//!
//! - [`DvAgent`]: distance-vector, Bellman-Ford style, with explicit poisoning to bound
//!   count-to-infinity.
//! - [`LsAgent`]: link-state, flooding sequence-numbered advertisements and running Dijkstra
//!   over the resulting database.
//!
//! Both implement the single [`RoutingAgent`] trait the harness drives. This crate owns none of
//! the simulation itself: the harness that delivers packets, the physical link layer, packet
//! wire framing, and any `send`-providing `Router` base are all external collaborators.
//!
//! ## Example
//!
//! ```
//! use routingsim::{DvAgent, Port, RoutingAgent};
//!
//! let mut a = DvAgent::new("A".to_string(), 1000);
//! let mut b = DvAgent::new("B".to_string(), 1000);
//!
//! // wire up a single link between A (port 1) and B (port 1), cost 4.
//! let from_a = a.handle_new_link(Port(1), "B".to_string(), 4);
//! let from_b = b.handle_new_link(Port(1), "A".to_string(), 4);
//!
//! for (_, packet) in from_a {
//!     b.handle_packet(Port(1), packet);
//! }
//! for (_, packet) in from_b {
//!     a.handle_packet(Port(1), packet);
//! }
//!
//! assert_eq!(a.snapshot().forwarding_table, vec![("B".to_string(), Port(1))]);
//! ```

pub mod agent;
pub mod codec;
pub mod dv;
pub mod forwarding;
pub mod ls;
pub mod neighbor;
pub mod packet;
pub mod types;

pub use agent::{AgentSnapshot, RoutingAgent};
pub use dv::DvAgent;
pub use ls::LsAgent;
pub use packet::{Packet, PacketKind};
pub use types::{Cost, Port, RouterAddr, RoutingError, INFINITY};

#[cfg(test)]
mod test;
