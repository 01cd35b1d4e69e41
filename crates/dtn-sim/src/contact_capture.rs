//! Contact-plan capture (`--make-contact-plan`, spec.md §4.11 step 2 and
//! its finalize step): record which router pairs are radio-connected each
//! tick, then collapse each pair's tick-set into maximal contiguous ranges
//! and emit a bidirectional [`Contact`] list.

use std::collections::HashMap;

use dtn_contact::Contact;
use dtn_core::{AgentId, ContactId, Tick};

fn ordered_pair(a: &AgentId, b: &AgentId) -> (AgentId, AgentId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[derive(Default)]
pub struct ContactCapture {
    /// `(a, b)` with `a <= b` -> ticks observed connected, strictly
    /// ascending (one `record_tick` call per simulated tick).
    ticks: HashMap<(AgentId, AgentId), Vec<Tick>>,
}

impl ContactCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every connected pair among `connected_routers` for tick `now`.
    pub fn record_tick(&mut self, now: Tick, connected_routers: &[AgentId]) {
        for i in 0..connected_routers.len() {
            for j in (i + 1)..connected_routers.len() {
                let pair = ordered_pair(&connected_routers[i], &connected_routers[j]);
                self.ticks.entry(pair).or_default().push(now);
            }
        }
    }

    /// Collapse every pair's tick-set into maximal contiguous ranges and
    /// emit both directions as [`Contact`]s (`rate`/`owlt`/`confidence`
    /// take neutral defaults; capture records *when* a link existed, not
    /// its bandwidth).
    pub fn finalize(&self) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let mut next_id = 0i64;
        for ((a, b), ticks) in &self.ticks {
            for (start, end) in collapse_to_ranges(ticks) {
                contacts.push(Contact::new(ContactId(next_id), a.clone(), b.clone(), start, end, 100, 0, 1.0));
                next_id += 1;
                contacts.push(Contact::new(ContactId(next_id), b.clone(), a.clone(), start, end, 100, 0, 1.0));
                next_id += 1;
            }
        }
        contacts
    }
}

/// Collapse a strictly ascending list of ticks into `(start, end)` inclusive
/// ranges of consecutive ticks.
fn collapse_to_ranges(ticks: &[Tick]) -> Vec<(Tick, Tick)> {
    let mut ranges = Vec::new();
    let mut iter = ticks.iter();
    let Some(&first) = iter.next() else {
        return ranges;
    };
    let (mut start, mut end) = (first, first);
    for &t in iter {
        if t.0 == end.0 + 1 {
            end = t;
        } else {
            ranges.push((start, end));
            start = t;
            end = t;
        }
    }
    ranges.push((start, end));
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aid(s: &str) -> AgentId {
        AgentId::new(s)
    }

    #[test]
    fn collapses_consecutive_ticks_into_one_range() {
        let ranges = collapse_to_ranges(&[Tick(0), Tick(1), Tick(2), Tick(5), Tick(6)]);
        assert_eq!(ranges, vec![(Tick(0), Tick(2)), (Tick(5), Tick(6))]);
    }

    #[test]
    fn finalize_emits_both_directions() {
        let mut cap = ContactCapture::new();
        cap.record_tick(Tick(0), &[aid("r0"), aid("r1")]);
        cap.record_tick(Tick(1), &[aid("r0"), aid("r1")]);
        let contacts = cap.finalize();
        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().any(|c| c.src == aid("r0") && c.dst == aid("r1")));
        assert!(contacts.iter().any(|c| c.src == aid("r1") && c.dst == aid("r0")));
        for c in &contacts {
            assert_eq!(c.start_ts, Tick(0));
            assert_eq!(c.end_ts, Tick(1));
        }
    }

    #[test]
    fn order_of_recorded_pair_does_not_matter() {
        let mut cap = ContactCapture::new();
        cap.record_tick(Tick(0), &[aid("r1"), aid("r0")]);
        cap.record_tick(Tick(1), &[aid("r0"), aid("r1")]);
        assert_eq!(cap.finalize().len(), 2);
    }
}
