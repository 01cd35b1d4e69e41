//! The `OutputWriter` trait implemented by the optional tabular backends
//! (CSV, SQLite, Parquet). The canonical JSON state snapshot (spec.md §6)
//! is written separately by [`crate::json::JsonSnapshotWriter`] since its
//! nested shape does not fit a tabular row.

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::OutputResult;

/// Trait implemented by every tabular output backend.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with `SimOutputObserver::take_error`.
pub trait OutputWriter {
    /// Write a batch of agent snapshot rows for one tick.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles. Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
