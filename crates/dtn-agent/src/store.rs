//! `AgentStore` — the engine's map of every agent in a run, plus helpers
//! for mutating one or two agents against the rest of the store within a
//! single tick.
//!
//! The source framework's agent storage keys agents by a dense `u32` index
//! and reaches for raw pointers (see the teacher's `AgentRngs::get_many_mut`)
//! to hand out two simultaneous `&mut` borrows from one `Vec`. `AgentId`
//! here is a `String`, not a dense index, so the same trick isn't available
//! — instead `with_pair_mut`/`with_agent_mut` temporarily remove the agent(s)
//! being paired from the map, let the caller hold the references via a
//! short-lived local, and reinsert them afterward. No `unsafe` is needed; the
//! cost is one hash-map remove/insert pair per cross-agent interaction, which
//! is not on the hot path relative to the routing/handshake work the
//! callback performs.

use std::collections::HashMap;

use dtn_core::AgentId;

use crate::agent::Agent;
use crate::error::{AgentError, AgentResult};

#[derive(Default)]
pub struct AgentStore {
    agents: HashMap<AgentId, Agent>,
    /// Insertion order, preserved for the engine's "insertion order, no
    /// shuffling" per-tick iteration requirement.
    order: Vec<AgentId>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: Agent) -> AgentResult<()> {
        let id = agent.id().clone();
        if self.agents.contains_key(&id) {
            return Err(AgentError::Duplicate(id));
        }
        self.order.push(id.clone());
        self.agents.insert(id, agent);
        Ok(())
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Every agent id in the order agents were inserted.
    pub fn ids_in_order(&self) -> impl Iterator<Item = &AgentId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.order.iter().filter_map(|id| self.agents.get(id))
    }

    /// Call `f` with exclusive access to both `a` and `b` at once.
    ///
    /// Returns `Err` if either id is missing, or if `a == b` (a single
    /// agent's routing refresh never targets itself as a neighbor).
    pub fn with_pair_mut<R>(
        &mut self,
        a: &AgentId,
        b: &AgentId,
        f: impl FnOnce(&mut Agent, &mut Agent) -> R,
    ) -> AgentResult<R> {
        if a == b {
            return Err(AgentError::InvalidConfig(format!("cannot pair agent {a} with itself")));
        }
        let mut other = self.agents.remove(b).ok_or_else(|| AgentError::NotFound(b.clone()))?;
        let result = match self.agents.get_mut(a) {
            Some(first) => Ok(f(first, &mut other)),
            None => Err(AgentError::NotFound(a.clone())),
        };
        self.agents.insert(b.clone(), other);
        result
    }

    /// Detach `id` from the store and call `f` with it plus unrestricted
    /// mutable access to the rest of the store — used for a per-tick agent
    /// refresh whose routing protocol may need to reach zero or more
    /// distinct neighbors (a fixed pair isn't enough; see dtn-sim's
    /// `NeighborSink` wiring).
    ///
    /// Returns `Err` if `id` is missing.
    pub fn with_agent_mut<R>(
        &mut self,
        id: &AgentId,
        f: impl FnOnce(&mut Agent, &mut AgentStore) -> R,
    ) -> AgentResult<R> {
        let mut agent = self.agents.remove(id).ok_or_else(|| AgentError::NotFound(id.clone()))?;
        let result = f(&mut agent, self);
        self.agents.insert(id.clone(), agent);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtn_core::{Position, RadioParams, Radio};
    use dtn_mobility::{FixedPattern, Movement, MovementPattern};
    use crate::agent::{Peripherals, SimpleAgent};

    fn simple(id: &str) -> Agent {
        Agent::Simple(SimpleAgent {
            id: AgentId::new(id),
            peripherals: Peripherals::new(
                Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(0.0, 0.0))), 1.0, f32::MAX),
                Radio::new(RadioParams::default()),
            ),
            chase_target: None,
        })
    }

    #[test]
    fn preserves_insertion_order() {
        let mut store = AgentStore::new();
        store.insert(simple("b")).unwrap();
        store.insert(simple("a")).unwrap();
        let ids: Vec<&str> = store.ids_in_order().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut store = AgentStore::new();
        store.insert(simple("a")).unwrap();
        assert!(store.insert(simple("a")).is_err());
    }

    #[test]
    fn pair_mut_gives_both_agents_back_afterward() {
        let mut store = AgentStore::new();
        store.insert(simple("a")).unwrap();
        store.insert(simple("b")).unwrap();

        let touched = store
            .with_pair_mut(&AgentId::new("a"), &AgentId::new("b"), |a, b| {
                (a.id().clone(), b.id().clone())
            })
            .unwrap();

        assert_eq!(touched.0.as_str(), "a");
        assert_eq!(touched.1.as_str(), "b");
        assert_eq!(store.len(), 2);
        assert!(store.get(&AgentId::new("b")).is_some());
    }

    #[test]
    fn pair_mut_rejects_self_pairing() {
        let mut store = AgentStore::new();
        store.insert(simple("a")).unwrap();
        assert!(store.with_pair_mut(&AgentId::new("a"), &AgentId::new("a"), |_, _| {}).is_err());
    }

    #[test]
    fn agent_mut_exposes_rest_of_store() {
        let mut store = AgentStore::new();
        store.insert(simple("a")).unwrap();
        store.insert(simple("b")).unwrap();
        store.insert(simple("c")).unwrap();

        let seen = store
            .with_agent_mut(&AgentId::new("a"), |_a, rest| {
                assert!(rest.get(&AgentId::new("a")).is_none());
                rest.get(&AgentId::new("b")).is_some() && rest.get(&AgentId::new("c")).is_some()
            })
            .unwrap();

        assert!(seen);
        assert_eq!(store.len(), 3);
    }
}
