//! Contact-Graph Routing: earliest-arrival forwarding over a mutable
//! time-windowed contact plan (see dtn-contact for the Dijkstra itself).

use std::collections::HashMap;

use dtn_bundle::{Bundle, Storage};
use dtn_contact::ContactPlan;
use dtn_core::{AgentId, SimRng, Tick};

use crate::protocol::{HandleOutcome, IngestKind, NeighborSink, Outgoing, RoutingProtocol};
use crate::state::RoutingState;

/// CGR protocol instance. Each node owns its own `ContactPlan` (contact
/// updates are broadcast to every node's plan by the simulation layer, not
/// shared by reference — see spec.md §9 open-question resolution in
/// DESIGN.md).
pub struct Cgr {
    pub contact_plan: ContactPlan,
    storage: Storage,
    num_bundle_sends: u64,
    num_repeated_bundle_receives: u64,
    num_bundle_reached_destination: u64,
}

impl Cgr {
    pub fn new(contact_plan: ContactPlan) -> Self {
        Self {
            contact_plan,
            storage: Storage::new(),
            num_bundle_sends: 0,
            num_repeated_bundle_receives: 0,
            num_bundle_reached_destination: 0,
        }
    }

    pub fn add_contact(
        &mut self,
        src: AgentId,
        dst: AgentId,
        start: Tick,
        end: Tick,
        rate: i64,
        owlt: i64,
        confidence: f64,
    ) {
        self.contact_plan
            .add_contact(src, dst, start, end, rate, owlt, confidence);
    }

    pub fn remove_all_contacts_for_node(&mut self, node: &AgentId) {
        self.contact_plan.remove_all_contacts_for_node(node);
    }

    pub fn remove_contacts_in_time_window(&mut self, a: &AgentId, b: &AgentId, start: Tick, end: Tick) {
        self.contact_plan.remove_contacts_in_time_window(a, b, start, end);
    }
}

impl RoutingProtocol for Cgr {
    fn handle_bundle(
        &mut self,
        local_id: &AgentId,
        _kind: IngestKind,
        bundle: Bundle,
        _now: Tick,
    ) -> HandleOutcome {
        if &bundle.dest_id == local_id {
            self.num_bundle_reached_destination += 1;
            return HandleOutcome::Delivered(bundle);
        }
        let dest = bundle.dest_id.clone();
        if self.storage.store_bundle(dest, bundle) {
            self.num_repeated_bundle_receives += 1;
            HandleOutcome::Repeated
        } else {
            HandleOutcome::Stored
        }
    }

    fn refresh(
        &mut self,
        local_id: &AgentId,
        now: Tick,
        connected_neighbors: &[AgentId],
        sink: &mut dyn NeighborSink,
        _rng: &mut SimRng,
    ) {
        // 1-2: best route per stored destination, grouped by first hop.
        let dest_ids = self.storage.all_bundle_dest_ids();
        let mut first_hop_groups: HashMap<AgentId, Vec<AgentId>> = HashMap::new();
        for dest_id in dest_ids {
            if let Some(route) = self.contact_plan.best_route(local_id, &dest_id, now) {
                if !route.is_empty() {
                    let first_hop = route.hops[0].dst.clone();
                    first_hop_groups.entry(first_hop).or_default().push(dest_id);
                }
            }
        }

        // 3: expiry sweep.
        self.storage.refresh(now);

        // 4: hand off every bundle whose first hop is a currently connected
        // neighbor, atomically per destination group.
        for neighbor in connected_neighbors {
            let Some(dest_ids) = first_hop_groups.get(neighbor) else {
                continue;
            };
            for dest_id in dest_ids {
                if let Some(bundles) = self.storage.remove_all_bundles_for_dest(dest_id) {
                    for bundle in bundles {
                        self.num_bundle_sends += 1;
                        sink.send(Outgoing {
                            neighbor: neighbor.clone(),
                            bundle,
                            kind: IngestKind::Direct,
                        });
                    }
                }
            }
        }
    }

    fn get_state(&self) -> RoutingState {
        RoutingState {
            num_stored_bundles: self.storage.all_bundles().len(),
            num_bundle_sends: self.num_bundle_sends,
            num_repeated_bundle_receives: self.num_repeated_bundle_receives,
            num_bundle_reached_destination: self.num_bundle_reached_destination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtn_bundle::{ClientBeaconPayload, Payload};

    fn aid(s: &str) -> AgentId {
        AgentId::new(s)
    }

    fn bundle(id: &str, dest: &str) -> Bundle {
        Bundle::new(
            id.to_string(),
            aid(dest),
            Payload::ClientBeacon(ClientBeaconPayload { client_id: aid("c") }),
            Tick::ZERO,
            1000,
        )
    }

    #[test]
    fn stores_until_route_and_connection_exist() {
        let mut plan = ContactPlan::new();
        plan.add_contact(aid("0"), aid("1"), Tick(0), Tick(1000), 100, 0, 1.0);
        let mut cgr = Cgr::new(plan);

        let outcome = cgr.handle_bundle(&aid("0"), IngestKind::Direct, bundle("b0", "1"), Tick(0));
        assert!(matches!(outcome, HandleOutcome::Stored));

        let mut sent = Vec::new();
        let mut rng = SimRng::new(0);
        cgr.refresh(&aid("0"), Tick(0), &[aid("1")], &mut |o: Outgoing| {
            sent.push((o.neighbor, o.bundle.bundle_id))
        }, &mut rng);
        assert_eq!(sent, vec![(aid("1"), "b0".to_string())]);
        assert_eq!(cgr.get_state().num_stored_bundles, 0);
    }

    #[test]
    fn no_forward_without_connection() {
        let mut plan = ContactPlan::new();
        plan.add_contact(aid("0"), aid("1"), Tick(0), Tick(1000), 100, 0, 1.0);
        let mut cgr = Cgr::new(plan);
        cgr.handle_bundle(&aid("0"), IngestKind::Direct, bundle("b0", "1"), Tick(0));

        let mut sent = Vec::new();
        let mut rng = SimRng::new(0);
        cgr.refresh(&aid("0"), Tick(0), &[], &mut |o: Outgoing| sent.push(o.neighbor), &mut rng);
        assert!(sent.is_empty());
        assert_eq!(cgr.get_state().num_stored_bundles, 1);
    }

    #[test]
    fn destination_arrival_delivers() {
        let plan = ContactPlan::new();
        let mut cgr = Cgr::new(plan);
        let outcome = cgr.handle_bundle(&aid("1"), IngestKind::Direct, bundle("b0", "1"), Tick(0));
        assert!(matches!(outcome, HandleOutcome::Delivered(_)));
        assert_eq!(cgr.get_state().num_bundle_reached_destination, 1);
    }
}
