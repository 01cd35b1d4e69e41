//! `run_handshake` — the 6-step client/router payload exchange, driven as
//! one synchronous call so both sides observe the exchange's effects within
//! the same tick (see spec.md §5's same-tick visibility guarantee).

use dtn_core::Tick;

use crate::client::ClientHandshake;
use crate::router::RouterHandshake;

/// Run the full handshake between a connected client and router.
///
/// Mirrors the original step numbering:
/// 1. client -> router: request.
/// 2. router -> client: metadata of payloads held for the client.
/// 3. client -> router: desired ids (skipped straight to step 5 if the
///    metadata was empty — but step 5 always runs).
/// 4. router -> client: the requested payloads; router's held list for this
///    client is cleared either way.
/// 5. client -> router: client's outgoing payloads (suppressed if the client
///    has none queued).
/// 6. router absorbs the client's uploaded payloads for later DTN routing.
pub fn run_handshake(client: &mut ClientHandshake, router: &mut RouterHandshake, now: Tick) {
    // Step 2.
    let metadata = router.payload_metadata_for(&client.client_id);

    // Step 3.
    let payloads_from_router = if metadata.is_empty() {
        Vec::new()
    } else {
        let desired_ids: Vec<String> = metadata
            .into_iter()
            .filter(|(id, exp)| !client.already_has(id, *exp))
            .map(|(id, _)| id)
            .collect();
        // Step 4.
        router.take_desired_payloads(&client.client_id, &desired_ids)
    };

    // Step 5.
    for payload in &payloads_from_router {
        client.record_received(payload, now);
    }
    if client.has_payloads_to_send() {
        let outgoing = client.take_payloads_to_send();
        client.num_payloads_sent += outgoing.len() as u64;
        // Step 6.
        router.accept_outgoing(outgoing);
    }
}
