//! Scheduled data drops (spec.md §4.9) — the simulation's sole payload
//! origination event. An entry fires once at `start_tick`, or repeatedly
//! every `period` ticks thereafter (optionally bounded by `count`); each
//! firing materializes a [`DataDrop`] sitting at a fixed position until a
//! client within [`DROP_PICKUP_RANGE`] picks it up.
//!
//! The `data_drop_schedule` list in Model JSON (spec.md §6) is parsed by
//! `dtn-output`'s config loader into a `Vec<DropScheduleEntry>`; the shape
//! here is this simulator's own, since the retrieved original source does
//! not carry the schedule-parsing code (see DESIGN.md).

use dtn_core::{AgentId, Position, Tick};

/// Clients within this many units of a drop's position may pick it up.
pub const DROP_PICKUP_RANGE: f32 = 5.0;

#[derive(Clone, Debug)]
pub struct DropScheduleEntry {
    pub target_id: AgentId,
    pub pos: Position,
    pub start_tick: Tick,
    /// `None` = fires once at `start_tick`. `Some(p)` = fires again every
    /// `p` ticks after `start_tick`.
    pub period: Option<u64>,
    /// Caps the number of firings for a periodic entry. Ignored for
    /// one-shot entries. `None` = unbounded (runs until `max_steps`).
    pub count: Option<u64>,
}

/// A live, unclaimed data drop sitting in the world.
#[derive(Clone, Debug)]
pub struct DataDrop {
    pub drop_id: u64,
    pub target_id: AgentId,
    pub pos: Position,
}

#[derive(Default)]
pub struct DropSchedule {
    entries: Vec<DropScheduleEntry>,
    fired_counts: Vec<u64>,
    next_drop_id: u64,
    active: Vec<DataDrop>,
}

impl DropSchedule {
    pub fn new(entries: Vec<DropScheduleEntry>) -> Self {
        let fired_counts = vec![0; entries.len()];
        Self {
            entries,
            fired_counts,
            next_drop_id: 0,
            active: Vec::new(),
        }
    }

    /// Materialize every entry due to fire at `now`.
    pub fn materialize(&mut self, now: Tick) {
        for (entry, fired) in self.entries.iter().zip(self.fired_counts.iter_mut()) {
            let due = match entry.period {
                None => *fired == 0 && now == entry.start_tick,
                Some(period) if period > 0 => {
                    now >= entry.start_tick
                        && (now.0 - entry.start_tick.0) % period == 0
                        && entry.count.is_none_or(|cap| *fired < cap)
                }
                Some(_) => false,
            };
            if due {
                self.active.push(DataDrop {
                    drop_id: self.next_drop_id,
                    target_id: entry.target_id.clone(),
                    pos: entry.pos,
                });
                self.next_drop_id += 1;
                *fired += 1;
            }
        }
    }

    pub fn active(&self) -> &[DataDrop] {
        &self.active
    }

    /// Remove a picked-up drop by id.
    pub fn remove(&mut self, drop_id: u64) {
        self.active.retain(|d| d.drop_id != drop_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aid(s: &str) -> AgentId {
        AgentId::new(s)
    }

    #[test]
    fn one_shot_entry_fires_exactly_once() {
        let mut sched = DropSchedule::new(vec![DropScheduleEntry {
            target_id: aid("c0"),
            pos: Position::new(0.0, 0.0),
            start_tick: Tick(5),
            period: None,
            count: None,
        }]);
        for t in 0..10 {
            sched.materialize(Tick(t));
        }
        assert_eq!(sched.active().len(), 1);
    }

    #[test]
    fn periodic_entry_respects_count_cap() {
        let mut sched = DropSchedule::new(vec![DropScheduleEntry {
            target_id: aid("c0"),
            pos: Position::new(0.0, 0.0),
            start_tick: Tick(0),
            period: Some(2),
            count: Some(3),
        }]);
        for t in 0..20 {
            sched.materialize(Tick(t));
        }
        assert_eq!(sched.active().len(), 3);
    }

    #[test]
    fn removing_a_drop_drops_only_that_id() {
        let mut sched = DropSchedule::new(vec![
            DropScheduleEntry {
                target_id: aid("a"),
                pos: Position::new(0.0, 0.0),
                start_tick: Tick(0),
                period: None,
                count: None,
            },
            DropScheduleEntry {
                target_id: aid("b"),
                pos: Position::new(0.0, 0.0),
                start_tick: Tick(0),
                period: None,
                count: None,
            },
        ]);
        sched.materialize(Tick(0));
        assert_eq!(sched.active().len(), 2);
        sched.remove(0);
        assert_eq!(sched.active().len(), 1);
        assert_eq!(sched.active()[0].drop_id, 1);
    }
}
