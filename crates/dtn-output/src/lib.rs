//! `dtn-output` — configuration loading, contact-plan I/O, state
//! snapshots, metrics reporting, and the `dtnsim` CLI runner.
//!
//! | Module            | Contents                                              |
//! |--------------------|--------------------------------------------------------|
//! | `config`           | Model/Agents JSON loading, deep-merge, `Sim` building  |
//! | `contact_io`       | Contact-plan load/save/verify wrappers                |
//! | `row`              | Snapshot data shapes (nested JSON + flattened tabular) |
//! | `json`             | `JsonSnapshotWriter` — the canonical spec.md §6 format |
//! | `writer`           | `OutputWriter` trait for the tabular backends          |
//! | `csv`              | `CsvWriter` (default, always compiled)                |
//! | `sqlite`           | `SqliteWriter` (feature `sqlite`)                      |
//! | `parquet`          | `ParquetWriter` (feature `parquet`)                    |
//! | `observer`         | `SimOutputObserver` bridging `dtn_sim::SimObserver`    |
//! | `metrics_report`   | Metrics text-file report (single-trial + batch)        |
//! | `error`            | `ConfigError`/`OutputError` and their `Result` aliases |

pub mod config;
pub mod contact_io;
pub mod csv;
pub mod error;
pub mod json;
pub mod metrics_report;
pub mod observer;
#[cfg(feature = "parquet")]
pub mod parquet;
pub mod row;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod writer;

pub use error::{ConfigError, ConfigResult, OutputError, OutputResult};
pub use json::JsonSnapshotWriter;
pub use observer::SimOutputObserver;
pub use row::{build_snapshot, AgentSnapshot, AgentSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;
