//! Deterministic random numbers for the sandbox host.
//!
//! RULE: Nothing here may call a platform RNG. A sandbox run is fully
//! reproducible from its seed, so load latencies (and anything else the
//! runner jitters) come from a single seeded stream.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct LatencyRng {
    seed: u64,
    inner: Pcg64Mcg,
}

impl LatencyRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Frame count in [base, base + jitter].
    pub fn frames(&mut self, base: u32, jitter: u32) -> u32 {
        if jitter == 0 {
            return base;
        }
        base + self.next_u64_below(u64::from(jitter) + 1) as u32
    }

    /// Float in [-magnitude, magnitude).
    pub fn signed(&mut self, magnitude: f32) -> f32 {
        ((self.next_f64() * 2.0 - 1.0) as f32) * magnitude
    }
}
