//! `Agent` — the tagged-variant union of every agent kind the simulator
//! supports, plus the peripherals (movement, radio, history) every kind
//! shares.
//!
//! Cross-agent orchestration — who is whose neighbor this tick, which
//! bundles flow from one agent's routing refresh into another's inbox —
//! is deliberately not handled here; it belongs to the engine, which is
//! the only component with simultaneous access to every agent. This
//! module defines what a single agent *is* and the hooks the engine
//! drives each tick.

use dtn_bundle::{ClientBeaconPayload, Payload};
use dtn_core::{radio::NeighborReport, AgentId, Position, Radio, Tick};
use dtn_handshake::{ClientHandshake, RouterHandshake};
use dtn_mobility::Movement;
use dtn_routing::{HandleOutcome, RoutingProtocol};

use crate::client_state::ClientState;
use crate::ground::GroundPayloadHandler;
use crate::history::{History, HistoryEntry};

/// Peripherals shared by every agent kind.
#[derive(Clone, Debug)]
pub struct Peripherals {
    pub movement: Movement,
    pub radio: Radio,
    pub history: History,
}

impl Peripherals {
    pub fn new(movement: Movement, radio: Radio) -> Self {
        Self {
            movement,
            radio,
            history: History::new(),
        }
    }

    pub fn pos(&self) -> Position {
        self.movement.pos()
    }

    pub fn push_history(&mut self, now: Tick) {
        self.history.push(HistoryEntry {
            tick: now,
            pos: self.movement.pos(),
            neighborhood: self.radio.neighborhood().to_vec(),
        });
    }

    /// Detected router neighbors this agent is not yet radio-connected to.
    pub fn detected_not_connected(&self) -> impl Iterator<Item = &NeighborReport> {
        self.radio.neighborhood().iter().filter(|n| !n.connected)
    }

    pub fn connected_neighbors(&self) -> impl Iterator<Item = &NeighborReport> {
        self.radio.neighborhood().iter().filter(|n| n.connected)
    }
}

/// A backbone DTN node relaying bundles between clients via whichever
/// routing protocol the run is configured with (CGR, Epidemic, or
/// Spray-and-Wait — spec.md §6's `routing_protocol` selector).
pub struct RouterAgent {
    pub id: AgentId,
    pub peripherals: Peripherals,
    pub routing: Box<dyn RoutingProtocol + Send>,
    pub handshake: RouterHandshake,
}

/// A client reachable only through the six-step handshake with whichever
/// router it is momentarily connected to.
pub struct ClientAgent {
    pub id: AgentId,
    pub peripherals: Peripherals,
    pub handshake: ClientHandshake,
    pub state: ClientState,
}

/// A flat-topology node that is both a routing-protocol participant and a
/// direct payload destination (epidemic or spray-and-wait agent types,
/// where there is no client/router distinction).
pub struct FlatAgent {
    pub id: AgentId,
    pub peripherals: Peripherals,
    pub routing: Box<dyn RoutingProtocol + Send>,
    pub ground: GroundPayloadHandler,
}

/// A node with no DTN participation at all — movement and radio only,
/// optionally chasing a target via RSSI-gradient localization (spec.md
/// §4.10's `special_behavior`).
pub struct SimpleAgent {
    pub id: AgentId,
    pub peripherals: Peripherals,
    pub chase_target: Option<AgentId>,
}

pub enum Agent {
    Router(RouterAgent),
    Client(ClientAgent),
    Epidemic(FlatAgent),
    Spray(FlatAgent),
    Simple(SimpleAgent),
}

impl Agent {
    pub fn id(&self) -> &AgentId {
        match self {
            Agent::Router(a) => &a.id,
            Agent::Client(a) => &a.id,
            Agent::Epidemic(a) => &a.id,
            Agent::Spray(a) => &a.id,
            Agent::Simple(a) => &a.id,
        }
    }

    pub fn peripherals(&self) -> &Peripherals {
        match self {
            Agent::Router(a) => &a.peripherals,
            Agent::Client(a) => &a.peripherals,
            Agent::Epidemic(a) => &a.peripherals,
            Agent::Spray(a) => &a.peripherals,
            Agent::Simple(a) => &a.peripherals,
        }
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals {
        match self {
            Agent::Router(a) => &mut a.peripherals,
            Agent::Client(a) => &mut a.peripherals,
            Agent::Epidemic(a) => &mut a.peripherals,
            Agent::Spray(a) => &mut a.peripherals,
            Agent::Simple(a) => &mut a.peripherals,
        }
    }

    pub fn pos(&self) -> Position {
        self.peripherals().pos()
    }

    /// State-snapshot "type" tag (spec.md §6 agent JSON `type` values).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Agent::Router(_) => "router",
            Agent::Client(_) => "client",
            Agent::Epidemic(_) => "epidemic",
            Agent::Spray(_) => "spray",
            Agent::Simple(_) => "simple",
        }
    }

    /// Whether this agent is a legitimate ground-drop pickup target: any
    /// client or flat-topology agent other than the drop's own target.
    pub fn can_pick_up_drop_for(&self, drop_target: &AgentId) -> bool {
        match self {
            Agent::Client(a) => &a.id != drop_target,
            Agent::Epidemic(a) | Agent::Spray(a) => &a.id != drop_target,
            Agent::Router(_) | Agent::Simple(_) => false,
        }
    }

    /// Dispatch a bundle that has just arrived at its destination, per
    /// spec.md §4.6. Only meaningful for `Router`, `Epidemic`, and `Spray`
    /// variants; a no-op otherwise.
    pub fn deliver_payload(&mut self, payload: Payload, now: Tick) {
        match self {
            Agent::Router(router) => match payload {
                Payload::ClientMappingDict(dict) => router.handshake.merge_mapping_dict(&dict),
                Payload::Client(p) => {
                    router.handshake.handle_payload(p);
                }
                Payload::ClientBeacon(ClientBeaconPayload { client_id }) => {
                    router.handshake.receive_beacon(client_id, now);
                }
            },
            Agent::Epidemic(flat) | Agent::Spray(flat) => {
                if let Payload::Client(p) = payload {
                    flat.ground.handle_payload(p, now);
                }
            }
            Agent::Client(_) | Agent::Simple(_) => {}
        }
    }

    /// Unwrap a routing-protocol delivery outcome and run `deliver_payload`
    /// when the bundle actually reached its destination.
    pub fn accept_handle_outcome(&mut self, outcome: HandleOutcome, now: Tick) {
        if let HandleOutcome::Delivered(bundle) = outcome {
            self.deliver_payload(bundle.payload, now);
        }
    }

    /// A ground data drop was just picked up by this agent.
    pub fn pick_up_drop(&mut self, payload: dtn_bundle::ClientPayload, now: Tick, bundle_lifespan: u64) {
        match self {
            Agent::Client(a) => a.handshake.store_payload(payload),
            Agent::Epidemic(a) | Agent::Spray(a) => {
                a.ground.store_payload(&a.id.clone(), payload, now, bundle_lifespan, a.routing.as_mut())
            }
            Agent::Router(_) | Agent::Simple(_) => {}
        }
    }

    /// Append this tick's history entry. Movement stepping is driven by the
    /// engine separately (it may need RSSI-gradient pursuit data spanning
    /// this agent's whole history, so it is not folded in here).
    pub fn push_history(&mut self, now: Tick) {
        self.peripherals_mut().push_history(now);
    }

    /// The pursuit target this agent is chasing via RSSI-gradient
    /// localization this tick, if any (spec.md §4.10).
    pub fn chase_target(&self) -> Option<&AgentId> {
        match self {
            Agent::Client(a) => a.state.pursuit_target.as_ref(),
            Agent::Simple(a) => a.chase_target.as_ref(),
            Agent::Router(_) | Agent::Epidemic(_) | Agent::Spray(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtn_bundle::ClientPayload;
    use dtn_contact::ContactPlan;
    use dtn_core::{Position, RadioParams};
    use dtn_mobility::{FixedPattern, MovementPattern};
    use dtn_routing::Cgr;

    fn aid(s: &str) -> AgentId {
        AgentId::new(s)
    }

    fn peripherals() -> Peripherals {
        Peripherals::new(
            Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(0.0, 0.0))), 1.0, f32::MAX),
            Radio::new(RadioParams::default()),
        )
    }

    #[test]
    fn router_delivers_client_payload_into_handshake() {
        let mut router = Agent::Router(RouterAgent {
            id: aid("r0"),
            peripherals: peripherals(),
            routing: Box::new(Cgr::new(ContactPlan::new())),
            handshake: RouterHandshake::new(aid("r0"), 50),
        });

        let payload = ClientPayload::new(1, aid("src"), aid("c0"), Tick(0));
        router.deliver_payload(Payload::Client(payload), Tick(5));

        if let Agent::Router(r) = &router {
            assert_eq!(r.handshake.payload_metadata_for(&aid("c0")).len(), 1);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn flat_agent_records_delivered_payload() {
        let mut epidemic = Agent::Epidemic(FlatAgent {
            id: aid("e0"),
            peripherals: peripherals(),
            routing: Box::new(dtn_routing::Epidemic::new()),
            ground: GroundPayloadHandler::new(),
        });

        let payload = ClientPayload::new(1, aid("src"), aid("e0"), Tick(0));
        epidemic.deliver_payload(Payload::Client(payload), Tick(3));

        if let Agent::Epidemic(flat) = &epidemic {
            assert_eq!(flat.ground.num_payloads_received, 1);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn non_drop_targets_can_pick_up() {
        let client = Agent::Client(ClientAgent {
            id: aid("c0"),
            peripherals: peripherals(),
            handshake: ClientHandshake::new(aid("c0")),
            state: ClientState::new(),
        });
        assert!(client.can_pick_up_drop_for(&aid("other")));
        assert!(!client.can_pick_up_drop_for(&aid("c0")));
    }
}
