//! Simulation observer trait for progress reporting and snapshot capture.

use dtn_agent::AgentStore;
use dtn_core::Tick;

use crate::metrics::Metrics;

/// Callbacks invoked by [`crate::Sim::run`] at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only
/// override what they care about.
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick, after metrics have been updated.
    fn on_tick_end(&mut self, _tick: Tick) {}

    /// Called every tick with read-only access to every agent, for
    /// visualization consumers that want a state snapshot (spec.md §6).
    fn on_snapshot(&mut self, _tick: Tick, _agents: &AgentStore) {}

    /// Called once after the final tick, with the finalized metrics.
    fn on_sim_end(&mut self, _final_tick: Tick, _metrics: &Metrics) {}
}

/// A [`SimObserver`] that does nothing. Use when driving `run` headlessly
/// with no need for progress callbacks (e.g. `-nv` / batch trials).
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
