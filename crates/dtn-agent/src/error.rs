use thiserror::Error;

use dtn_core::AgentId;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {0} not found")]
    NotFound(AgentId),

    #[error("agent {0} already registered")]
    Duplicate(AgentId),

    #[error("invalid agent configuration: {0}")]
    InvalidConfig(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
