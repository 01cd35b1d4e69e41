//! Error types for configuration loading and output writing.

use thiserror::Error;

/// Errors raised while loading or validating the model/agents JSON
/// documents (spec.md §6, §7's `ConfigMissing`/`UnknownAgentType`).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("malformed JSON in {path}: {source}")]
    Json { path: String, source: serde_json::Error },

    #[error("required configuration key missing: {0}")]
    Missing(String),

    #[error("unknown agent type: {0}")]
    UnknownAgentType(String),

    #[error("contact plan error: {0}")]
    Contact(#[from] dtn_contact::ContactError),

    #[error("agent store error: {0}")]
    Agent(#[from] dtn_agent::AgentError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while writing simulation output (snapshots, metrics
/// reports, contact plans).
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("contact plan error: {0}")]
    Contact(#[from] dtn_contact::ContactError),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "parquet")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type OutputResult<T> = Result<T, OutputError>;
