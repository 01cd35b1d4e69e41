//! Tagged-variant agent state machines: router, client, epidemic,
//! spray-and-wait, and simple — plus the store the engine holds them in.
//!
//! | Module          | Contents                                                      |
//! |-----------------|------------------------------------------------------------------|
//! | `agent`         | `Agent` enum, `Peripherals`, per-kind structs, §4.6 dispatch  |
//! | `client_state`  | `ClientAgentMode` / `ClientState` (§4.7)                      |
//! | `ground`        | `GroundPayloadHandler` for flat epidemic/spray agents         |
//! | `history`       | `History` / `HistoryEntry`, bounded per-agent state log       |
//! | `localization`  | RSSI-gradient target position fit (§4.10)                     |
//! | `store`         | `AgentStore`, insertion-order iteration, cross-agent pair access |
//! | `error`         | `AgentError` / `AgentResult`                                  |

mod agent;
mod client_state;
mod error;
mod ground;
mod history;
mod localization;
mod store;

pub use agent::{Agent, ClientAgent, FlatAgent, Peripherals, RouterAgent, SimpleAgent};
pub use client_state::{ClientAgentMode, ClientState, RECONNECTION_INTERVAL};
pub use error::{AgentError, AgentResult};
pub use ground::GroundPayloadHandler;
pub use history::{History, HistoryEntry, MAX_HISTORY_LENGTH};
pub use localization::{fit, Estimate, Sample, LOCALIZATION_WINDOW, MIN_SAMPLES};
pub use store::AgentStore;
