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

//! A minimal stand-in for the simulation harness: just enough to wire agents' ports together
//! and drain their outbound packets. Not part of the public API; the real harness is an external
//! collaborator (see the crate's top-level documentation).

use std::collections::{BTreeMap, VecDeque};

use crate::{agent::RoutingAgent, packet::Packet, types::Port};

type Endpoint = (usize, Port);

/// Wires a fixed set of agents together over point-to-point links and delivers packets until
/// quiescence (or a round budget is exhausted, to keep a misbehaving test from hanging).
pub(crate) struct Harness {
    agents: Vec<Box<dyn RoutingAgent<String>>>,
    links: BTreeMap<Endpoint, Endpoint>,
}

impl Harness {
    pub(crate) fn new(agents: Vec<Box<dyn RoutingAgent<String>>>) -> Self {
        Self {
            agents,
            links: BTreeMap::new(),
        }
    }

    /// Connect `(a, port_a)` to `(b, port_b)` with the given per-direction costs, delivering the
    /// resulting `link_up` events to both sides and queueing their reactions for [`Self::drain`].
    pub(crate) fn link_up(
        &mut self,
        a: usize,
        port_a: Port,
        cost_a_to_b: u32,
        b: usize,
        port_b: Port,
        cost_b_to_a: u32,
    ) -> VecDeque<(usize, Port, Packet<String>)> {
        self.links.insert((a, port_a), (b, port_b));
        self.links.insert((b, port_b), (a, port_a));

        let b_addr = self.agents[b].snapshot().self_addr;
        let a_addr = self.agents[a].snapshot().self_addr;

        let mut queue = VecDeque::new();
        for (port, packet) in self.agents[a].handle_new_link(port_a, b_addr, cost_a_to_b) {
            queue.push_back((a, port, packet));
        }
        for (port, packet) in self.agents[b].handle_new_link(port_b, a_addr, cost_b_to_a) {
            queue.push_back((b, port, packet));
        }
        queue
    }

    pub(crate) fn link_down(&mut self, node: usize, port: Port) -> VecDeque<(usize, Port, Packet<String>)> {
        self.links.remove(&(node, port));
        let mut queue = VecDeque::new();
        for (out_port, packet) in self.agents[node].handle_remove_link(port) {
            queue.push_back((node, out_port, packet));
        }
        queue
    }

    /// Deliver queued packets (and whatever they provoke) until the queue runs dry or `max_steps`
    /// deliveries have happened, whichever comes first.
    pub(crate) fn drain(&mut self, mut queue: VecDeque<(usize, Port, Packet<String>)>, max_steps: usize) {
        let mut steps = 0;
        while let Some((from, port, packet)) = queue.pop_front() {
            steps += 1;
            assert!(steps <= max_steps, "network did not converge within the step budget");
            let Some(&(to, to_port)) = self.links.get(&(from, port)) else {
                continue;
            };
            for (next_port, next_packet) in self.agents[to].handle_packet(to_port, packet) {
                queue.push_back((to, next_port, next_packet));
            }
        }
    }

    pub(crate) fn agent(&self, idx: usize) -> &dyn RoutingAgent<String> {
        self.agents[idx].as_ref()
    }
}
