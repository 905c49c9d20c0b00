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

//! Component G: encode/decode DV vectors and LS advertisements as opaque byte payloads.
//!
//! Any wire format is acceptable as long as both ends of a link agree; this implementation uses
//! JSON (via `serde_json`), the same choice `original_source/{DVrouter,LSrouter}.py` make with
//! Python's `json` module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Cost, RouterAddr, RoutingError};

/// A decoded control-plane payload, carried opaquely in [`crate::packet::Packet::content`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMessage<A: RouterAddr> {
    /// A distance-vector advertisement: the sender's full `own_vector`.
    ///
    /// The sender's address is not carried in the payload; it is taken from the enclosing
    /// packet's `src_addr` envelope, per spec.
    DistanceVector(BTreeMap<A, Cost>),
    /// A link-state advertisement.
    LinkState {
        /// The router that produced this LSA.
        originator: A,
        /// Monotonically increasing per-originator sequence number.
        sequence: u64,
        /// The originator's current neighbors and link costs.
        neighbors: BTreeMap<A, Cost>,
    },
}

impl<A> ControlMessage<A>
where
    A: RouterAddr + Serialize + for<'de> Deserialize<'de>,
{
    /// Encode this message as an opaque byte payload.
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("serializing a ControlMessage never fails")
    }

    /// Decode a payload previously produced by [`ControlMessage::encode`].
    ///
    /// Per the error-handling policy, callers treat any `Err` as "drop silently" — never panic
    /// on adversarial or stale input.
    pub fn decode(bytes: &[u8]) -> Result<Self, RoutingError<A>> {
        serde_json::from_slice(bytes).map_err(|e| RoutingError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dv_round_trips() {
        let msg = ControlMessage::DistanceVector(BTreeMap::from([
            ("A".to_string(), 0u32),
            ("B".to_string(), 1),
        ]));
        let bytes = msg.encode();
        let decoded: ControlMessage<String> = ControlMessage::decode(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn ls_round_trips() {
        let msg = ControlMessage::LinkState {
            originator: "A".to_string(),
            sequence: 3,
            neighbors: BTreeMap::from([("B".to_string(), 2u32)]),
        };
        let bytes = msg.encode();
        let decoded: ControlMessage<String> = ControlMessage::decode(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn malformed_payload_is_reported_not_panicked() {
        let result: Result<ControlMessage<String>, _> = ControlMessage::decode(b"not json");
        assert!(result.is_err());
    }
}
