//! Unit tests for dtn-core primitives not already covered by in-module
//! `#[cfg(test)]` blocks (see `position.rs` and `radio.rs`).

#[cfg(test)]
mod ids {
    use crate::{AgentId, ContactId};

    #[test]
    fn agent_id_equality_and_display() {
        let a = AgentId::new("router0");
        let b = AgentId::from("router0".to_string());
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "router0");
    }

    #[test]
    fn contact_id_ordering_and_root() {
        assert!(ContactId(0) < ContactId(1));
        assert_eq!(ContactId::ROOT.0, -1);
        assert_eq!(ContactId(5).next(), ContactId(6));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn clock_advance() {
        let mut clock = SimClock::new();
        assert_eq!(clock.now(), Tick::ZERO);
        clock.advance();
        clock.advance();
        assert_eq!(clock.now(), Tick(2));
    }

    #[test]
    fn sim_config_end_tick() {
        let cfg = SimConfig {
            total_ticks: 500,
            seed: 42,
        };
        assert_eq!(cfg.end_tick(), Tick(500));
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng};

    #[test]
    fn deterministic_same_seed() {
        let id = AgentId::new("a0");
        let mut r1 = AgentRng::new(12345, &id);
        let mut r2 = AgentRng::new(12345, &id);
        for _ in 0..100 {
            let a: f32 = r1.random();
            let b: f32 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, &AgentId::new("a0"));
        let mut r1 = AgentRng::new(1, &AgentId::new("a1"));
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent agent ids should diverge");
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = AgentRng::new(0, &AgentId::new("a0"));
        for _ in 0..1000 {
            let v = rng.gen_range(0.0f32..1.0);
            assert!((0.0..1.0).contains(&v));
        }
    }
}
