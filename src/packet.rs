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

//! The packet envelope exchanged between routing agents and the harness.
//!
//! The wire framing, the `Router` base class, and the physical link layer are all external
//! collaborators (see the crate's top-level documentation); this module only defines the shape
//! both protocol variants agree on.

use serde::{Deserialize, Serialize};

use crate::types::RouterAddr;

/// The two kinds of traffic an agent exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketKind {
    /// End-user/traceroute traffic, forwarded using the current forwarding table.
    Data,
    /// Control-plane traffic (a DV vector or an LS advertisement), decoded locally.
    Routing,
}

/// A packet as delivered by the harness, or emitted for the harness to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet<A: RouterAddr> {
    /// Whether this is end-user data or a control message.
    pub kind: PacketKind,
    /// The packet's original sender.
    pub src_addr: A,
    /// The packet's intended recipient.
    pub dst_addr: A,
    /// Opaque payload: end-user content for [`PacketKind::Data`], an encoded
    /// [`crate::codec::ControlMessage`] for [`PacketKind::Routing`].
    pub content: Vec<u8>,
}

impl<A: RouterAddr> Packet<A> {
    /// Build a new packet with the given kind, envelope, and payload.
    pub fn new(kind: PacketKind, src_addr: A, dst_addr: A, content: Vec<u8>) -> Self {
        Self {
            kind,
            src_addr,
            dst_addr,
            content,
        }
    }

    /// Whether this packet should be forwarded via the forwarding table rather than decoded.
    ///
    /// Derived, not stored: `is_traceroute` is true exactly when `kind == Data`.
    pub fn is_traceroute(&self) -> bool {
        self.kind == PacketKind::Data
    }
}
