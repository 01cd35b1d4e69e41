//! Shared error type.
//!
//! Sub-crates define their own error enums for domain-specific failures and
//! convert into `DtnError` via `From`, or wrap it as one variant — whichever
//! keeps call sites clean. `DtnError` itself only carries the handful of
//! kinds common across the whole workspace.

use thiserror::Error;

use crate::AgentId;

/// Common error type shared by `dtn-core` and any crate that doesn't need a
/// richer domain-specific enum of its own.
#[derive(Debug, Error)]
pub enum DtnError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type.
pub type DtnResult<T> = Result<T, DtnError>;
