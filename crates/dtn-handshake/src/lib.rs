//! Client-router payload handshake, beacon emission, and client-location
//! mapping gossip.
//!
//! | Module        | Contents                                                |
//! |----------------|----------------------------------------------------------|
//! | `client`       | `ClientHandshake` — steps 1, 3, 5                       |
//! | `router`       | `RouterHandshake` — steps 2, 4, 6, beacon + map gossip   |
//! | `handshake`    | `run_handshake` — drives the full 6-step exchange        |
//! | `error`        | `HandshakeError` / `HandshakeResult`                     |

mod client;
mod error;
mod handshake;
mod router;

pub use client::{ClientHandshake, ReceivedPayload};
pub use error::{HandshakeError, HandshakeResult};
pub use handshake::run_handshake;
pub use router::RouterHandshake;

#[cfg(test)]
mod tests {
    use super::*;
    use dtn_bundle::ClientPayload;
    use dtn_core::{AgentId, Tick};
    use dtn_routing::{Cgr, RoutingProtocol};
    use dtn_contact::ContactPlan;

    fn aid(s: &str) -> AgentId {
        AgentId::new(s)
    }

    #[test]
    fn full_handshake_delivers_and_uploads() {
        let mut router = RouterHandshake::new(aid("r0"), 50);
        let payload = ClientPayload::new(1, aid("src"), aid("c0"), Tick(0));
        router.handle_payload(payload);

        let mut client = ClientHandshake::new(aid("c0"));
        client.store_payload(ClientPayload::new(2, aid("c0"), aid("other"), Tick(0)));

        run_handshake(&mut client, &mut router, Tick(5));

        assert_eq!(client.num_payloads_received, 1);
        assert_eq!(client.received_payloads[0].drop_id, 1);
        assert_eq!(client.num_payloads_sent, 1);
        // router's held list for this client is drained either way.
        assert!(router.payload_metadata_for(&aid("c0")).is_empty());
    }

    #[test]
    fn empty_metadata_still_runs_step_five() {
        let mut router = RouterHandshake::new(aid("r0"), 50);
        let mut client = ClientHandshake::new(aid("c0"));
        client.store_payload(ClientPayload::new(7, aid("c0"), aid("other"), Tick(0)));

        run_handshake(&mut client, &mut router, Tick(1));

        assert_eq!(client.num_payloads_sent, 1);
    }

    #[test]
    fn beacon_learning_and_gossip_merge_keeps_max_expiration() {
        let mut r0 = RouterHandshake::new(aid("r0"), 50);
        r0.receive_beacon(aid("c0"), Tick(0));

        let mut r1 = RouterHandshake::new(aid("r1"), 10);
        r1.merge_mapping_dict(&r0.export_mapping_dict());
        // r1 learns r0's mapping at expiration 50; re-merging a lower value must not regress it.
        let lower = dtn_bundle::ClientMappingDictPayload {
            client_mappings: [(aid("c0"), [(aid("r0"), Tick(10))].into_iter().collect())]
                .into_iter()
                .collect(),
        };
        r1.merge_mapping_dict(&lower);

        let merged = r1.export_mapping_dict();
        assert_eq!(*merged.client_mappings.get(&aid("c0")).unwrap().get(&aid("r0")).unwrap(), Tick(50));
    }

    #[test]
    fn payload_egress_builds_bundle_when_mapping_known() {
        let mut router = RouterHandshake::new(aid("r0"), 50);
        router.receive_beacon(aid("dest_client"), Tick(0));
        router.accept_outgoing(vec![ClientPayload::new(1, aid("src"), aid("dest_client"), Tick(0))]);

        let mut cgr = Cgr::new(ContactPlan::new());
        router.refresh(Tick(1), 100, &mut cgr);

        assert_eq!(cgr.get_state().num_stored_bundles, 1);
    }

    #[test]
    fn payload_egress_holds_locally_without_mapping() {
        let mut router = RouterHandshake::new(aid("r0"), 50);
        router.accept_outgoing(vec![ClientPayload::new(1, aid("src"), aid("unknown_client"), Tick(0))]);

        let mut cgr = Cgr::new(ContactPlan::new());
        router.refresh(Tick(1), 100, &mut cgr);

        assert_eq!(cgr.get_state().num_stored_bundles, 0);
    }
}
