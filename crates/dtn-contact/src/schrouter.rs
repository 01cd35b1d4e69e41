//! `ContactPlan` — the Schrouter: a mutable collection of directed contacts
//! plus earliest-arrival Dijkstra route computation (Contact-Graph Routing).

use std::collections::HashMap;

use dtn_core::{AgentId, ContactId, Tick};

use crate::contact::Contact;

/// An ordered list of contacts from a source to a destination, as found by
/// [`ContactPlan::best_route`].
#[derive(Clone, Debug)]
pub struct Route {
    pub hops: Vec<Contact>,
    pub arrival_time: Tick,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

/// Mutable set of time-windowed directed contacts, owned per routing-protocol
/// instance (each CGR node holds its own copy — see spec.md §5, "Contact
/// plan is owned by each routing-protocol instance").
#[derive(Clone, Debug, Default)]
pub struct ContactPlan {
    contacts: Vec<Contact>,
    next_contact_id: i64,
}

/// Working state for one contact during a single `best_route` Dijkstra run.
/// Not part of the persisted contact plan.
#[derive(Clone)]
struct Work {
    contact: Contact,
    arrival: Option<Tick>,
    hops: u32,
    visited: bool,
    pred: Option<ContactId>,
}

impl ContactPlan {
    pub fn new() -> Self {
        Self {
            contacts: Vec::new(),
            next_contact_id: 0,
        }
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Add a contact, assigning the next monotonically increasing id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_contact(
        &mut self,
        src: AgentId,
        dst: AgentId,
        start_ts: Tick,
        end_ts: Tick,
        rate: i64,
        owlt: i64,
        confidence: f64,
    ) -> ContactId {
        let id = ContactId(self.next_contact_id);
        self.next_contact_id += 1;
        self.contacts
            .push(Contact::new(id, src, dst, start_ts, end_ts, rate, owlt, confidence));
        id
    }

    /// Drop every contact incident to `node`.
    pub fn remove_all_contacts_for_node(&mut self, node: &AgentId) {
        self.contacts.retain(|c| &c.src != node && &c.dst != node);
    }

    pub fn remove_contact_by_id(&mut self, id: ContactId) {
        self.contacts.retain(|c| c.id != id);
    }

    /// For every contact on the unordered `{a, b}` pair that overlaps
    /// `[start, end]`, replace it with the non-overlapping remainder
    /// (`[c.start, start-1]` and/or `[end+1, c.end]`) — see spec.md §4.3.
    pub fn remove_contacts_in_time_window(
        &mut self,
        a: &AgentId,
        b: &AgentId,
        start: Tick,
        end: Tick,
    ) {
        let mut new_plan = Vec::with_capacity(self.contacts.len());
        for contact in self.contacts.drain(..) {
            let touches_pair =
                (&contact.src == a && &contact.dst == b) || (&contact.src == b && &contact.dst == a);

            if !touches_pair {
                new_plan.push(contact);
                continue;
            }

            if contact.within(start, end) {
                // entirely consumed by the removal window
                continue;
            }

            if contact.start_ts.0 < start.0 && end.0 < contact.end_ts.0 {
                new_plan.push(Contact::new(
                    contact.id,
                    contact.src.clone(),
                    contact.dst.clone(),
                    contact.start_ts,
                    Tick(start.0 - 1),
                    contact.rate,
                    contact.owlt,
                    contact.confidence,
                ));
                new_plan.push(Contact::new(
                    contact.id,
                    contact.src,
                    contact.dst,
                    Tick(end.0 + 1),
                    contact.end_ts,
                    contact.rate,
                    contact.owlt,
                    contact.confidence,
                ));
            } else if contact.start_ts.0 < start.0 {
                new_plan.push(Contact::new(
                    contact.id,
                    contact.src,
                    contact.dst,
                    contact.start_ts,
                    Tick(start.0 - 1),
                    contact.rate,
                    contact.owlt,
                    contact.confidence,
                ));
            } else if end.0 < contact.end_ts.0 {
                new_plan.push(Contact::new(
                    contact.id,
                    contact.src,
                    contact.dst,
                    Tick(end.0 + 1),
                    contact.end_ts,
                    contact.rate,
                    contact.owlt,
                    contact.confidence,
                ));
            }
            // else: fully inside [start, end], already handled by `within` above.
        }
        self.contacts = new_plan;
    }

    pub fn check_any_availability(&self, node: &AgentId) -> bool {
        self.contacts.iter().any(|c| &c.dst == node)
    }

    pub fn check_contact_availability(&self, src: &AgentId, dst: &AgentId) -> bool {
        self.contacts.iter().any(|c| &c.src == src && &c.dst == dst)
    }

    /// Earliest-arrival Dijkstra over the contact graph (Contact-Graph
    /// Routing). Returns `None` if `dest` is unreachable at `now`.
    ///
    /// Builds a synthetic root contact `root -> root` with `arrival_time =
    /// now`, then relaxes over every contact reachable at or after the
    /// settled predecessor's arrival time, propagating
    /// `arrival_time = max(arrival_at_src, hop.start) + owlt`. Ties break by
    /// earliest arrival, then fewest hops, then smallest contact id.
    pub fn best_route(&self, root: &AgentId, dest: &AgentId, now: Tick) -> Option<Route> {
        let root_contact = Contact::new(
            ContactId::ROOT,
            root.clone(),
            root.clone(),
            Tick::ZERO,
            Tick(u64::MAX),
            100,
            0,
            1.0,
        );

        let mut work: HashMap<ContactId, Work> = HashMap::new();
        work.insert(
            ContactId::ROOT,
            Work {
                contact: root_contact,
                arrival: Some(now),
                hops: 0,
                visited: false,
                pred: None,
            },
        );
        for c in &self.contacts {
            work.insert(
                c.id,
                Work {
                    contact: c.clone(),
                    arrival: None,
                    hops: u32::MAX,
                    visited: false,
                    pred: None,
                },
            );
        }

        loop {
            // Pick the unvisited, reachable work item with smallest
            // (arrival, hops, contact id).
            let next_id = work
                .values()
                .filter(|w| !w.visited && w.arrival.is_some())
                .min_by(|a, b| {
                    a.arrival
                        .unwrap()
                        .cmp(&b.arrival.unwrap())
                        .then(a.hops.cmp(&b.hops))
                        .then(a.contact.id.cmp(&b.contact.id))
                })
                .map(|w| w.contact.id);

            let Some(current_id) = next_id else {
                return None;
            };

            let (current_dst, current_arrival, current_hops) = {
                let w = work.get_mut(&current_id).unwrap();
                w.visited = true;
                (w.contact.dst.clone(), w.arrival.unwrap(), w.hops)
            };

            if current_id != ContactId::ROOT && &current_dst == dest {
                return Some(reconstruct(&work, current_id));
            }

            // Relax every contact departing from current_dst that is still
            // open at or after current_arrival.
            let candidates: Vec<ContactId> = work
                .values()
                .filter(|w| {
                    !w.visited && w.contact.src == current_dst && w.contact.end_ts >= current_arrival
                })
                .map(|w| w.contact.id)
                .collect();

            for cid in candidates {
                let c = work.get(&cid).unwrap().contact.clone();
                let candidate_arrival =
                    Tick(current_arrival.0.max(c.start_ts.0) + c.owlt.max(0) as u64);
                let candidate_hops = current_hops + 1;

                let w = work.get_mut(&cid).unwrap();
                let better = match w.arrival {
                    None => true,
                    Some(existing) => {
                        candidate_arrival < existing
                            || (candidate_arrival == existing && candidate_hops < w.hops)
                    }
                };
                if better {
                    w.arrival = Some(candidate_arrival);
                    w.hops = candidate_hops;
                    w.pred = Some(current_id);
                }
            }
        }
    }
}

fn reconstruct(work: &HashMap<ContactId, Work>, dest_contact: ContactId) -> Route {
    let mut hops = Vec::new();
    let mut cur = dest_contact;
    let arrival_time = work[&cur].arrival.unwrap();
    loop {
        let w = &work[&cur];
        if w.contact.id == ContactId::ROOT {
            break;
        }
        hops.push(w.contact.clone());
        match w.pred {
            Some(p) => cur = p,
            None => break,
        }
    }
    hops.reverse();
    Route { hops, arrival_time }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AgentId {
        AgentId::new(s)
    }

    #[test]
    fn direct_route_single_hop() {
        let mut plan = ContactPlan::new();
        plan.add_contact(id("A"), id("B"), Tick(0), Tick(1000), 100, 0, 1.0);
        plan.add_contact(id("B"), id("A"), Tick(0), Tick(1000), 100, 0, 1.0);

        let route = plan.best_route(&id("A"), &id("B"), Tick(0)).unwrap();
        assert_eq!(route.hops.len(), 1);
        assert_eq!(route.hops[0].dst, id("B"));
        assert_eq!(route.arrival_time, Tick(0));
    }

    #[test]
    fn indirect_then_direct_route_scenario() {
        // Nodes {0,1,2}; contacts 0->2 and 2->1 on [0,inf), 0->1 on [3,inf).
        let mut plan = ContactPlan::new();
        plan.add_contact(id("0"), id("2"), Tick(0), Tick(1_000_000), 100, 0, 1.0);
        plan.add_contact(id("2"), id("1"), Tick(0), Tick(1_000_000), 100, 0, 1.0);
        plan.add_contact(id("0"), id("1"), Tick(3), Tick(1_000_000), 100, 0, 1.0);

        let at_zero = plan.best_route(&id("0"), &id("1"), Tick(0)).unwrap();
        assert_eq!(at_zero.hops.len(), 2, "route at t=0 should go via node 2");

        let at_three = plan.best_route(&id("0"), &id("1"), Tick(3)).unwrap();
        assert_eq!(at_three.hops.len(), 1, "route at t=3 should go direct");
    }

    #[test]
    fn unreachable_returns_none() {
        let mut plan = ContactPlan::new();
        plan.add_contact(id("0"), id("3"), Tick(0), Tick(100), 100, 0, 1.0);
        assert!(plan.best_route(&id("0"), &id("4"), Tick(0)).is_none());

        plan.add_contact(id("3"), id("4"), Tick(0), Tick(100), 100, 0, 1.0);
        assert!(plan.best_route(&id("0"), &id("4"), Tick(0)).is_some());
    }

    #[test]
    fn window_removal_splits_contact() {
        let mut plan = ContactPlan::new();
        plan.add_contact(id("A"), id("B"), Tick(0), Tick(10), 100, 0, 1.0);
        plan.remove_contacts_in_time_window(&id("A"), &id("B"), Tick(4), Tick(6));

        let remaining: Vec<_> = plan.contacts().to_vec();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().any(|c| c.start_ts == Tick(0) && c.end_ts == Tick(3)));
        assert!(remaining.iter().any(|c| c.start_ts == Tick(7) && c.end_ts == Tick(10)));
    }

    #[test]
    fn window_removal_entirely_consumes_contact() {
        let mut plan = ContactPlan::new();
        plan.add_contact(id("A"), id("B"), Tick(4), Tick(6), 100, 0, 1.0);
        plan.remove_contacts_in_time_window(&id("A"), &id("B"), Tick(0), Tick(10));
        assert!(plan.contacts().is_empty());
    }
}
