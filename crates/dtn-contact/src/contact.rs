//! The `Contact` type: a scheduled directed transmission opportunity.

use dtn_core::{AgentId, ContactId, Tick};
use serde::{Deserialize, Serialize};

/// A directed, time-windowed transmission opportunity `src -> dst` over
/// `[start, end]`. Immutable once constructed — the Schrouter replaces
/// rather than mutates contacts when a window is split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "contact")]
    pub id: ContactId,
    #[serde(rename = "source")]
    pub src: AgentId,
    #[serde(rename = "dest")]
    pub dst: AgentId,
    #[serde(rename = "startTime")]
    pub start_ts: Tick,
    #[serde(rename = "endTime")]
    pub end_ts: Tick,
    pub rate: i64,
    #[serde(default)]
    pub owlt: i64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Earliest-arrival working value used only during a single Dijkstra
    /// run; `ContactId::ROOT`'s synthetic contact sets this to `now` before
    /// relaxation starts. Not part of the contact plan's persisted state.
    #[serde(skip)]
    pub arrival_time: Tick,
}

fn default_confidence() -> f64 {
    1.0
}

impl Contact {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ContactId,
        src: AgentId,
        dst: AgentId,
        start_ts: Tick,
        end_ts: Tick,
        rate: i64,
        owlt: i64,
        confidence: f64,
    ) -> Self {
        Self {
            id,
            src,
            dst,
            start_ts,
            end_ts,
            rate,
            owlt,
            confidence,
            arrival_time: Tick::ZERO,
        }
    }

    /// `true` if this contact's window overlaps `[s, e]`.
    pub fn overlaps(&self, s: Tick, e: Tick) -> bool {
        self.start_ts <= e && s <= self.end_ts
    }

    /// `true` if this contact lies entirely within `[s, e]`.
    pub fn within(&self, s: Tick, e: Tick) -> bool {
        self.start_ts >= s && self.end_ts <= e
    }
}
