//! The `Bundle`: a store-and-forward envelope around one [`Payload`].

use dtn_core::{AgentId, Tick};

use crate::payload::Payload;

/// A bundle on the network. Immutable once created; forwarding transfers
/// ownership (CGR) or clones it (Epidemic / Spray-and-Wait flooding), with
/// `seen_bundle_ids` on the receiving `Storage` preventing re-ingestion of a
/// flooded clone.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bundle {
    pub bundle_id: String,
    pub dest_id: AgentId,
    pub payload: Payload,
    pub creation_ts: Tick,
    pub expiration_ts: Tick,
}

impl Bundle {
    pub fn new(bundle_id: String, dest_id: AgentId, payload: Payload, creation_ts: Tick, lifespan: u64) -> Self {
        Self {
            bundle_id,
            dest_id,
            payload,
            creation_ts,
            expiration_ts: creation_ts.offset(lifespan),
        }
    }

    pub fn is_expired(&self, now: Tick) -> bool {
        self.expiration_ts <= now
    }
}
