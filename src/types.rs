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

//! Shared scalar types: addresses, ports, costs, and the crate's error type.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bound satisfied by any opaque node identifier usable as a routing destination.
///
/// The protocol only ever compares, hashes, and orders addresses; it never interprets
/// their structure, so both `String` and integer identifiers work out of the box.
pub trait RouterAddr: Clone + Eq + Ord + Hash + Debug {}
impl<T: Clone + Eq + Ord + Hash + Debug> RouterAddr for T {}

/// Local identifier for one attached link, meaningful only to the owning agent and its harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Port(pub u32);

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "port {}", self.0)
    }
}

impl From<u32> for Port {
    fn from(value: u32) -> Self {
        Port(value)
    }
}

/// Link/path cost. Values `>= INFINITY` are all equally "unreachable".
pub type Cost = u32;

/// Poison value: any computed path cost at or above this is treated as unreachable.
///
/// This is the classic distance-vector bound that caps count-to-infinity oscillation at a
/// bounded number of rounds.
pub const INFINITY: Cost = 16;

/// Add two costs, saturating (and clamping) at [`INFINITY`] rather than overflowing.
pub(crate) fn clamp_add(a: Cost, b: Cost) -> Cost {
    let total = a.saturating_add(b);
    if total >= INFINITY {
        INFINITY
    } else {
        total
    }
}

/// Errors surfaced by the core routing components.
///
/// Per the error-handling policy, none of these are ever propagated to the harness from the
/// [`crate::agent::RoutingAgent`] event handlers: they are logged and the offending input is
/// dropped. The type exists so that components below the dispatcher (which *do* have a caller
/// that can reasonably react) can report what happened instead of silently misbehaving.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError<A: RouterAddr> {
    /// A `link_up` named an endpoint that is already reachable through a different port.
    ///
    /// Parallel links to the same endpoint are not modeled (spec: at most one port per
    /// endpoint at a time); the second `link_up` is rejected rather than guessed at.
    #[error("endpoint {endpoint:?} is already attached on {existing}, refusing duplicate link on {attempted}")]
    DuplicateEndpoint {
        /// The endpoint address that is already attached.
        endpoint: A,
        /// The port it is currently attached on.
        existing: Port,
        /// The port the rejected `link_up` named.
        attempted: Port,
    },
    /// A control payload failed to decode.
    #[error("malformed control payload: {0}")]
    Decode(String),
}
