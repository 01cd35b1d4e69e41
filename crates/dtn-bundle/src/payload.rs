//! Application-level payload variants carried inside a [`crate::Bundle`]
//! or sent directly between a client and its host router (beacons and
//! mapping gossip bypass the bundle layer entirely — see spec.md §4.8).

use std::collections::HashMap;

use dtn_core::{AgentId, Tick};

/// How long a `ClientPayload` lives before expiring, in simulation ticks.
pub const CLIENT_PAYLOAD_LIFESPAN: u64 = 20;

/// Application data exchanged between two clients over the DTN.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientPayload {
    /// Identifies the originating data drop; paired with `creation_ts` this
    /// forms the duplicate-delivery key (spec.md §3: "two received payloads
    /// with equal (drop_id, creation_ts) are duplicates").
    pub drop_id: u64,
    pub source_client: AgentId,
    pub dest_client: AgentId,
    pub creation_ts: Tick,
    pub expiration_ts: Tick,
}

impl ClientPayload {
    pub fn new(drop_id: u64, source_client: AgentId, dest_client: AgentId, creation_ts: Tick) -> Self {
        Self {
            drop_id,
            source_client,
            dest_client,
            creation_ts,
            expiration_ts: creation_ts.offset(CLIENT_PAYLOAD_LIFESPAN),
        }
    }

    /// Key used to recognize a duplicate delivery of the same application
    /// data, independent of which bundle or flood path carried it.
    pub fn dedup_key(&self) -> (u64, Tick) {
        (self.drop_id, self.creation_ts)
    }
}

/// A client's announcement that it is within radio range of a router.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientBeaconPayload {
    pub client_id: AgentId,
}

/// Router-to-router gossip of the client-location map this router currently
/// knows: `client_id -> (router_id -> expiration_ts)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientMappingDictPayload {
    pub client_mappings: HashMap<AgentId, HashMap<AgentId, Tick>>,
}

/// The union of everything that can travel as Bundle contents or be sent
/// directly between handshake peers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    Client(ClientPayload),
    ClientBeacon(ClientBeaconPayload),
    ClientMappingDict(ClientMappingDictPayload),
}

impl Payload {
    pub fn as_client(&self) -> Option<&ClientPayload> {
        match self {
            Payload::Client(p) => Some(p),
            _ => None,
        }
    }
}
