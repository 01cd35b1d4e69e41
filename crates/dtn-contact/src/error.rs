//! `dtn-contact` error type.

use thiserror::Error;

use dtn_core::AgentId;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("no route from {from} to {to} at the current time")]
    UnreachableAtNow { from: AgentId, to: AgentId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ContactResult<T> = Result<T, ContactError>;
