//! `SimError` — setup-time failures. Per-tick anomalies (out-of-bounds move,
//! unreachable destination, expired bundle) are logged and swallowed as the
//! protocol/mobility layers already specify; they never reach this type.

use dtn_agent::AgentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("unknown agent type: {0}")]
    UnknownAgentType(String),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type SimResult<T> = Result<T, SimError>;
