//! Spray-and-Wait: spray a bundle to a bounded number of nearby nodes, then
//! wait for one of them to physically meet the destination.

use std::collections::HashMap;

use dtn_bundle::Bundle;
use dtn_core::{AgentId, SimRng, Tick};

use crate::protocol::{HandleOutcome, IngestKind, NeighborSink, Outgoing, RoutingProtocol};
use crate::state::RoutingState;

/// Cap on how many distinct neighbors a bundle is sprayed to before the
/// originator stops propagating it (default per spec.md §4.5.3).
pub const NUM_NODES_TO_SPRAY: usize = 4;

struct Spraying {
    bundle: Bundle,
    sprayed_to: Vec<AgentId>,
}

pub struct SprayAndWait {
    bundle_sprays: HashMap<String, Spraying>,
    waiting_bundles: Vec<Bundle>,
    num_bundle_sends: u64,
    num_repeated_bundle_receives: u64,
    num_bundle_reached_destination: u64,
}

impl SprayAndWait {
    pub fn new() -> Self {
        Self {
            bundle_sprays: HashMap::new(),
            waiting_bundles: Vec::new(),
            num_bundle_sends: 0,
            num_repeated_bundle_receives: 0,
            num_bundle_reached_destination: 0,
        }
    }
}

impl Default for SprayAndWait {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingProtocol for SprayAndWait {
    fn handle_bundle(
        &mut self,
        local_id: &AgentId,
        kind: IngestKind,
        bundle: Bundle,
        _now: Tick,
    ) -> HandleOutcome {
        match kind {
            // Origination: start spraying, no destination or dedup check —
            // the original implementation unconditionally inserts here.
            IngestKind::Direct => {
                self.bundle_sprays.insert(
                    bundle.bundle_id.clone(),
                    Spraying {
                        bundle,
                        sprayed_to: Vec::new(),
                    },
                );
                HandleOutcome::Stored
            }
            // Sprayed receipt: hold the bundle until we meet the destination.
            IngestKind::Spray => {
                self.waiting_bundles.push(bundle);
                HandleOutcome::Stored
            }
            // Final delivery: the sender already confirmed we are the
            // destination, dispatch unconditionally.
            IngestKind::Final => {
                let _ = local_id;
                self.num_bundle_reached_destination += 1;
                HandleOutcome::Delivered(bundle)
            }
        }
    }

    fn refresh(
        &mut self,
        _local_id: &AgentId,
        now: Tick,
        connected_neighbors: &[AgentId],
        sink: &mut dyn NeighborSink,
        rng: &mut SimRng,
    ) {
        self.bundle_sprays
            .retain(|_, s| !s.bundle.is_expired(now));
        self.waiting_bundles.retain(|b| !b.is_expired(now));

        let mut shuffled: Vec<AgentId> = connected_neighbors.to_vec();
        rng.shuffle(&mut shuffled);

        for neighbor in &shuffled {
            let mut finished_spraying = Vec::new();
            for (bundle_id, spraying) in self.bundle_sprays.iter_mut() {
                if spraying.sprayed_to.contains(neighbor) {
                    continue;
                }
                self.num_bundle_sends += 1;
                sink.send(Outgoing {
                    neighbor: neighbor.clone(),
                    bundle: spraying.bundle.clone(),
                    kind: IngestKind::Spray,
                });
                spraying.sprayed_to.push(neighbor.clone());
                if spraying.sprayed_to.len() == NUM_NODES_TO_SPRAY {
                    finished_spraying.push(bundle_id.clone());
                }
            }
            for bundle_id in finished_spraying {
                self.bundle_sprays.remove(&bundle_id);
            }

            let mut finished_waiting = Vec::new();
            for (i, bundle) in self.waiting_bundles.iter().enumerate() {
                if &bundle.dest_id == neighbor {
                    self.num_bundle_sends += 1;
                    sink.send(Outgoing {
                        neighbor: neighbor.clone(),
                        bundle: bundle.clone(),
                        kind: IngestKind::Final,
                    });
                    finished_waiting.push(i);
                }
            }
            for i in finished_waiting.into_iter().rev() {
                self.waiting_bundles.remove(i);
            }
        }
    }

    fn get_state(&self) -> RoutingState {
        RoutingState {
            num_stored_bundles: self.waiting_bundles.len(),
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
    fn sprays_up_to_cap_then_stops() {
        let mut saw = SprayAndWait::new();
        saw.handle_bundle(&aid("0"), IngestKind::Direct, bundle("b0", "z"), Tick(0));

        let neighbors: Vec<AgentId> = (0..6).map(|i| aid(&i.to_string())).collect();
        let mut rng = SimRng::new(1);
        let mut sent = Vec::new();
        saw.refresh(&aid("0"), Tick(0), &neighbors, &mut |o: Outgoing| sent.push(o.neighbor), &mut rng);

        assert_eq!(sent.len(), NUM_NODES_TO_SPRAY);
        assert_eq!(saw.get_state().num_stored_bundles, 0);
    }

    #[test]
    fn waiting_bundle_forwarded_only_to_destination() {
        let mut saw = SprayAndWait::new();
        saw.handle_bundle(&aid("0"), IngestKind::Spray, bundle("b0", "dest"), Tick(0));

        let mut rng = SimRng::new(1);
        let mut sent = Vec::new();
        saw.refresh(&aid("0"), Tick(0), &[aid("other"), aid("dest")], &mut |o: Outgoing| {
            sent.push((o.neighbor, o.kind))
        }, &mut rng);

        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, aid("dest"));
        assert!(matches!(sent[0].1, IngestKind::Final));
    }
}
