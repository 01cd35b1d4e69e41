//! Deterministic per-agent and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (fnv1a(agent_id) * MIXING_CONSTANT)
//!
//! `AgentId` is a string (see [`crate::ids`]), so agent seeds are mixed from
//! an FNV-1a hash of the id rather than a dense integer index. The mixing
//! constant is the 64-bit fractional part of the golden ratio, which spreads
//! similar ids (e.g. `"router0"`, `"router1"`) across the seed space.
//!
//! - Agents never share RNG state (no ordering dependency).
//! - Renaming or reordering other agents never disturbs an existing agent's
//!   seed — runs stay reproducible as the population changes.
//! - Every RSSI noise draw, movement-pattern random offset, and Spray
//!   neighbor shuffle draws from one of these two types so a run seed fully
//!   determines behavior.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// FNV-1a over raw bytes — simple, dependency-free, and stable across
/// compiler/std versions (unlike `DefaultHasher`'s SipHash).
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Create one per agent at simulation init; the simulation engine holds
/// them keyed by `AgentId` alongside the agent's other state.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent id.
    pub fn new(global_seed: u64, agent: &AgentId) -> Self {
        let seed = global_seed ^ fnv1a(agent.as_str().as_bytes()).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Sample a standard-normal value (used for RSSI noise, `N(0, sigma^2)`
    /// is then `sigma * this`). Box-Muller, dependency-free.
    pub fn sample_normal(&mut self) -> f32 {
        let u1: f32 = self.gen_range(f32::EPSILON..1.0);
        let u2: f32 = self.gen_range(0.0..1.0);
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for operations that are not owned by a single agent
/// (e.g. Spray-and-Wait's neighbor shuffle, which the original implementation
/// draws from one process-wide generator rather than a per-agent one).
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
