//! `ClientHandshake` — per-client handshake state (steps 1, 3, 5 of the
//! 6-step exchange; see `handshake::run_handshake` for the full sequence).

use dtn_bundle::ClientPayload;
use dtn_core::{AgentId, Tick};

/// A delivered `ClientPayload` recorded for metrics/output purposes.
#[derive(Clone, Debug)]
pub struct ReceivedPayload {
    pub drop_id: u64,
    pub source_client: AgentId,
    pub dest_client: AgentId,
    pub creation_ts: Tick,
    pub delivery_ts: Tick,
    pub delivery_latency: u64,
}

pub struct ClientHandshake {
    pub client_id: AgentId,
    payloads_to_send: Vec<ClientPayload>,
    /// `(dedup key as string, expiration_ts)` — mirrors the identifier the
    /// router uses so both sides agree on what counts as "already have it".
    already_received_ids: Vec<(String, Tick)>,

    pub num_payloads_sent: u64,
    pub num_payloads_received: u64,
    pub num_drops_picked_up: u64,
    pub received_payloads: Vec<ReceivedPayload>,
}

fn payload_identifier(p: &ClientPayload) -> String {
    format!("src:{}\tdst:{}\tdrop:{}", p.source_client, p.dest_client, p.drop_id)
}

impl ClientHandshake {
    pub fn new(client_id: AgentId) -> Self {
        Self {
            client_id,
            payloads_to_send: Vec::new(),
            already_received_ids: Vec::new(),
            num_payloads_sent: 0,
            num_payloads_received: 0,
            num_drops_picked_up: 0,
            received_payloads: Vec::new(),
        }
    }

    /// Stash a `ClientPayload` picked up from a ground data drop, to be sent
    /// to the next connected router.
    pub fn store_payload(&mut self, payload: ClientPayload) {
        self.already_received_ids
            .push((payload_identifier(&payload), payload.expiration_ts));
        self.payloads_to_send.push(payload);
        self.num_drops_picked_up += 1;
    }

    pub fn has_payloads_to_send(&self) -> bool {
        !self.payloads_to_send.is_empty()
    }

    pub(crate) fn already_has(&self, id: &str, expiration_ts: Tick) -> bool {
        self.already_received_ids
            .iter()
            .any(|(pid, exp)| pid == id && *exp == expiration_ts)
    }

    pub(crate) fn take_payloads_to_send(&mut self) -> Vec<ClientPayload> {
        std::mem::take(&mut self.payloads_to_send)
    }

    pub(crate) fn record_received(&mut self, payload: &ClientPayload, now: Tick) {
        self.already_received_ids
            .push((payload_identifier(payload), payload.expiration_ts));
        self.num_payloads_received += 1;
        let latency = now.since(payload.creation_ts);
        self.received_payloads.push(ReceivedPayload {
            drop_id: payload.drop_id,
            source_client: payload.source_client.clone(),
            dest_client: payload.dest_client.clone(),
            creation_ts: payload.creation_ts,
            delivery_ts: now,
            delivery_latency: latency,
        });
    }

    /// Drop expired queued-to-send payloads and expired dedup records.
    pub fn refresh(&mut self, now: Tick) {
        self.payloads_to_send.retain(|p| p.expiration_ts > now);
        self.already_received_ids.retain(|(_, exp)| *exp > now);
    }
}
