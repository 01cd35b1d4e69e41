//! `SimOutputObserver<W>` — bridges `dtn_sim::SimObserver` to the canonical
//! JSON snapshot writer and an optional tabular `OutputWriter` backend.
//!
//! `SimObserver` methods have no return value, so write errors from either
//! sink are stored internally; check [`take_error`][Self::take_error]
//! after `sim.run()` returns.

use dtn_agent::AgentStore;
use dtn_core::Tick;
use dtn_sim::{Metrics, SimObserver};

use crate::json::JsonSnapshotWriter;
use crate::row::{build_snapshot, AgentSnapshot, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

pub struct SimOutputObserver<W: OutputWriter> {
    json: JsonSnapshotWriter,
    tabular: Option<W>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(json: JsonSnapshotWriter, tabular: Option<W>) -> Self {
        Self {
            json,
            tabular,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore) {
        let snapshots: Vec<AgentSnapshot> = agents.iter().map(build_snapshot).collect();
        let result = self.json.write_snapshot(tick, &snapshots);
        self.store_err(result);

        if let Some(writer) = self.tabular.as_mut() {
            let rows: Vec<_> = snapshots.iter().map(|s| s.to_row(tick)).collect();
            let result = writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick, metrics: &Metrics) {
        let result = self.json.finish();
        self.store_err(result);

        if let Some(writer) = self.tabular.as_mut() {
            let row = TickSummaryRow {
                tick: _final_tick.0,
                total_bundles_stored_cumulative: metrics.total_bundles_stored_cumulative,
                num_drops_picked_up: metrics.num_drops_picked_up,
            };
            let result = writer.write_tick_summary(&row);
            self.store_err(result);
            let result = writer.finish();
            self.store_err(result);
        }
    }
}
