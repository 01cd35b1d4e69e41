//! Snapshot data shapes: the nested JSON form consumed by visualization
//! (spec.md §6) plus a flattened tabular row for the optional CSV/SQLite/
//! Parquet backends.

use serde::Serialize;

use dtn_agent::Agent;
use dtn_core::Tick;

#[derive(Debug, Clone, Serialize)]
pub struct NeighborSnapshot {
    pub id: String,
    pub rssi: f32,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    pub tick: u64,
    pub x: f32,
    pub y: f32,
    pub neighborhood: Vec<NeighborSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutingSnapshot {
    pub num_stored_bundles: usize,
    pub num_bundle_sends: u64,
    pub num_repeated_bundle_receives: u64,
    pub num_bundle_reached_destination: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentCounters {
    pub num_payloads_received: u64,
    pub num_payloads_sent: u64,
    pub num_drops_picked_up: u64,
}

/// One agent's full state as reported to the visualization layer
/// (spec.md §6: `{id, pos, name?, radio, history, routing_protocol?,
/// type, counters...}`).
///
/// `name` is always `None`: the agent config's `name` key is accepted by
/// `config::load_agents` for documentation purposes but not retained on
/// the runtime `Agent`, which has nothing that reads it back.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub pos: (f32, f32),
    pub name: Option<String>,
    pub radio: Vec<NeighborSnapshot>,
    pub history: Vec<HistorySnapshot>,
    pub routing_protocol: Option<RoutingSnapshot>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub counters: AgentCounters,
}

impl AgentSnapshot {
    pub fn to_row(&self, tick: Tick) -> AgentSnapshotRow {
        AgentSnapshotRow {
            agent_id: self.id.clone(),
            tick: tick.0,
            kind: self.kind,
            x: self.pos.0,
            y: self.pos.1,
            connected_neighbor_count: self.radio.iter().filter(|n| n.connected).count() as u32,
            num_stored_bundles: self.routing_protocol.as_ref().map(|r| r.num_stored_bundles as u64).unwrap_or(0),
            num_payloads_received: self.counters.num_payloads_received,
        }
    }
}

/// Flattened tabular view of one agent's state at one tick.
#[derive(Debug, Clone)]
pub struct AgentSnapshotRow {
    pub agent_id: String,
    pub tick: u64,
    pub kind: &'static str,
    pub x: f32,
    pub y: f32,
    pub connected_neighbor_count: u32,
    pub num_stored_bundles: u64,
    pub num_payloads_received: u64,
}

/// Build the nested snapshot for one agent (radio neighborhood, bounded
/// history, routing state for relay-capable kinds, per-kind counters).
pub fn build_snapshot(agent: &Agent) -> AgentSnapshot {
    let peripherals = agent.peripherals();

    let radio = peripherals
        .radio
        .neighborhood()
        .iter()
        .map(|n| NeighborSnapshot {
            id: n.id.to_string(),
            rssi: n.rssi,
            connected: n.connected,
        })
        .collect();

    let history = peripherals
        .history
        .entries()
        .map(|entry| HistorySnapshot {
            tick: entry.tick.0,
            x: entry.pos.x,
            y: entry.pos.y,
            neighborhood: entry
                .neighborhood
                .iter()
                .map(|n| NeighborSnapshot {
                    id: n.id.to_string(),
                    rssi: n.rssi,
                    connected: n.connected,
                })
                .collect(),
        })
        .collect();

    let (routing_protocol, counters) = match agent {
        Agent::Router(r) => {
            let s = r.routing.get_state();
            (
                Some(RoutingSnapshot {
                    num_stored_bundles: s.num_stored_bundles,
                    num_bundle_sends: s.num_bundle_sends,
                    num_repeated_bundle_receives: s.num_repeated_bundle_receives,
                    num_bundle_reached_destination: s.num_bundle_reached_destination,
                }),
                AgentCounters::default(),
            )
        }
        Agent::Epidemic(f) | Agent::Spray(f) => {
            let s = f.routing.get_state();
            (
                Some(RoutingSnapshot {
                    num_stored_bundles: s.num_stored_bundles,
                    num_bundle_sends: s.num_bundle_sends,
                    num_repeated_bundle_receives: s.num_repeated_bundle_receives,
                    num_bundle_reached_destination: s.num_bundle_reached_destination,
                }),
                AgentCounters {
                    num_payloads_received: f.ground.num_payloads_received,
                    num_payloads_sent: 0,
                    num_drops_picked_up: f.ground.num_drops_picked_up,
                },
            )
        }
        Agent::Client(c) => (
            None,
            AgentCounters {
                num_payloads_received: c.handshake.num_payloads_received,
                num_payloads_sent: c.handshake.num_payloads_sent,
                num_drops_picked_up: c.handshake.num_drops_picked_up,
            },
        ),
        Agent::Simple(_) => (None, AgentCounters::default()),
    };

    AgentSnapshot {
        id: agent.id().to_string(),
        pos: (agent.pos().x, agent.pos().y),
        name: None,
        radio,
        history,
        routing_protocol,
        kind: agent.kind_name(),
        counters,
    }
}

/// Cumulative counters reported once per tick (spec.md §4.12).
#[derive(Debug, Clone, Copy, Default)]
pub struct TickSummaryRow {
    pub tick: u64,
    pub total_bundles_stored_cumulative: u64,
    pub num_drops_picked_up: u64,
}
