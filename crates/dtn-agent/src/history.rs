//! Bounded per-agent history of observed state, appended once per tick.
//!
//! Every agent kind keeps one of these for state-snapshot output; it is
//! capped at `MAX_HISTORY_LENGTH` so a long-running simulation's memory
//! doesn't grow without bound.

use std::collections::VecDeque;

use dtn_core::{radio::NeighborReport, Position, Tick};

/// Cap applied uniformly across agent kinds (mirrors the source simulator's
/// per-agent `MAX_HISTORY_LENGTH` truncation of its history list).
pub const MAX_HISTORY_LENGTH: usize = 150;

#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub tick: Tick,
    pub pos: Position,
    pub neighborhood: Vec<NeighborReport>,
}

#[derive(Clone, Debug, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > MAX_HISTORY_LENGTH {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtn_core::AgentId;

    fn entry(tick: u64) -> HistoryEntry {
        HistoryEntry {
            tick: Tick(tick),
            pos: Position::new(0.0, 0.0),
            neighborhood: Vec::new(),
        }
    }

    #[test]
    fn truncates_to_max_length() {
        let mut history = History::new();
        for i in 0..(MAX_HISTORY_LENGTH + 10) {
            history.push(entry(i as u64));
        }
        assert_eq!(history.len(), MAX_HISTORY_LENGTH);
        assert_eq!(history.entries().next().unwrap().tick, Tick(10));
    }

    #[test]
    fn keeps_neighbor_reports() {
        let mut history = History::new();
        let mut e = entry(0);
        e.neighborhood.push(NeighborReport {
            id: AgentId::new("n0"),
            rssi: -40.0,
            connected: true,
        });
        history.push(e);
        assert_eq!(history.entries().next().unwrap().neighborhood.len(), 1);
    }
}
