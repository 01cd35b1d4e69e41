//! `RouterHandshake` — per-router handshake state (steps 2, 4, 6), client
//! beacon learning, and client-location mapping gossip.

use std::collections::{HashMap, HashSet};

use dtn_bundle::{Bundle, ClientMappingDictPayload, ClientPayload, Payload};
use dtn_core::{AgentId, Tick};
use dtn_routing::{IngestKind, RoutingProtocol};

pub struct RouterHandshake {
    pub router_id: AgentId,
    client_mapping_timeout: u64,

    seen_payload_ids: HashSet<String>,
    payloads_received_for_client: HashMap<AgentId, Vec<ClientPayload>>,
    outgoing_payloads_to_send: Vec<ClientPayload>,

    /// `client_id -> (router_id -> expiration_ts)`.
    client_router_mapping: HashMap<AgentId, HashMap<AgentId, Tick>>,
}

fn payload_identifier(p: &ClientPayload) -> String {
    format!("src:{}\tdst:{}\tdrop:{}", p.source_client, p.dest_client, p.drop_id)
}

impl RouterHandshake {
    pub fn new(router_id: AgentId, client_mapping_timeout: u64) -> Self {
        Self {
            router_id,
            client_mapping_timeout,
            seen_payload_ids: HashSet::new(),
            payloads_received_for_client: HashMap::new(),
            outgoing_payloads_to_send: Vec::new(),
            client_router_mapping: HashMap::new(),
        }
    }

    /// A `ClientBeaconPayload` was observed from `client_id`: refresh our
    /// self-entry in the mapping.
    pub fn receive_beacon(&mut self, client_id: AgentId, now: Tick) {
        self.client_router_mapping
            .entry(client_id)
            .or_default()
            .insert(self.router_id.clone(), now.offset(self.client_mapping_timeout));
    }

    /// Merge a peer router's mapping dict: per `(client, router)` pair, keep
    /// the larger expiration (monotone max-merge).
    pub fn merge_mapping_dict(&mut self, payload: &ClientMappingDictPayload) {
        for (client_id, routers) in &payload.client_mappings {
            let entry = self.client_router_mapping.entry(client_id.clone()).or_default();
            for (router_id, expiration) in routers {
                entry
                    .entry(router_id.clone())
                    .and_modify(|existing| {
                        if *expiration > *existing {
                            *existing = *expiration;
                        }
                    })
                    .or_insert(*expiration);
            }
        }
    }

    pub fn export_mapping_dict(&self) -> ClientMappingDictPayload {
        ClientMappingDictPayload {
            client_mappings: self.client_router_mapping.clone(),
        }
    }

    /// A `ClientPayload` arrived for a client reachable from this router
    /// (via the DTN); hold it until the client connects.
    pub fn handle_payload(&mut self, payload: ClientPayload) {
        let id = payload_identifier(&payload);
        if self.seen_payload_ids.contains(&id) {
            return;
        }
        self.seen_payload_ids.insert(id);
        self.payloads_received_for_client
            .entry(payload.dest_client.clone())
            .or_default()
            .push(payload);
    }

    /// Step 2: metadata for every payload held for `client_id`. Also useful
    /// to callers outside the handshake exchange itself (e.g. state
    /// snapshots) as a read-only count of what's pending.
    pub fn payload_metadata_for(&self, client_id: &AgentId) -> Vec<(String, Tick)> {
        self.payloads_received_for_client
            .get(client_id)
            .map(|list| list.iter().map(|p| (payload_identifier(p), p.expiration_ts)).collect())
            .unwrap_or_default()
    }

    /// Step 4: the subset of held payloads for `client_id` matching
    /// `desired_ids`; always clears the held list regardless of match.
    pub(crate) fn take_desired_payloads(&mut self, client_id: &AgentId, desired_ids: &[String]) -> Vec<ClientPayload> {
        let held = self.payloads_received_for_client.remove(client_id).unwrap_or_default();
        held.into_iter()
            .filter(|p| desired_ids.contains(&payload_identifier(p)))
            .collect()
    }

    /// Step 6: absorb payloads uploaded by a client for later DTN routing.
    pub(crate) fn accept_outgoing(&mut self, payloads: Vec<ClientPayload>) {
        self.outgoing_payloads_to_send.extend(payloads);
    }

    /// Expire stale held payloads and mapping entries, then attempt to send
    /// every queued outgoing payload as a Bundle via the routing protocol.
    pub fn refresh(&mut self, now: Tick, bundle_lifespan: u64, routing: &mut dyn RoutingProtocol) {
        for list in self.payloads_received_for_client.values_mut() {
            list.retain(|p| p.expiration_ts > now);
        }

        for routers in self.client_router_mapping.values_mut() {
            routers.retain(|_, exp| *exp > now);
        }

        let mut unhandled = Vec::new();
        for payload in self.outgoing_payloads_to_send.drain(..) {
            if payload.expiration_ts <= now {
                continue;
            }
            match self.client_router_mapping.get(&payload.dest_client) {
                Some(router_ids) if !router_ids.is_empty() => {
                    for router_id in router_ids.keys() {
                        let bundle_id = format!(
                            "bundle(routerdst[{router_id}]creationtime[{}],{})",
                            now, payload_identifier(&payload)
                        );
                        let bundle = Bundle::new(
                            bundle_id,
                            router_id.clone(),
                            Payload::Client(payload.clone()),
                            now,
                            bundle_lifespan,
                        );
                        routing.handle_bundle(&self.router_id, IngestKind::Direct, bundle, now);
                    }
                }
                _ => unhandled.push(payload),
            }
        }
        self.outgoing_payloads_to_send = unhandled;
    }
}
