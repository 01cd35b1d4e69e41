//! `dtn-core` — foundational types for the DTN routing simulator.
//!
//! This crate is a dependency of every other crate in the workspace. It
//! intentionally has no intra-workspace dependencies and minimal external
//! ones (`rand`, `thiserror`, `log`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                              |
//! |----------------|---------------------------------------------------------|
//! | [`ids`]        | `AgentId`, `ContactId`                                |
//! | [`position`]   | `Position`, bounded 2-D space                         |
//! | [`radio`]      | RSSI channel model, neighbor detection                |
//! | [`time`]       | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]        | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`error`]      | `DtnError`, `DtnResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                               |
//! |---------|-------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.    |

pub mod error;
pub mod ids;
pub mod position;
pub mod radio;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DtnError, DtnResult};
pub use ids::{AgentId, ContactId};
pub use position::{Bounds, Position};
pub use radio::{NeighborReport, Radio, RadioParams, RssiSource};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};
