//! Rewind clock: owns the tick counter and accumulated simulated time.

use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RewindClock {
    pub current_tick: Tick,
    /// Simulated seconds since the engine was created.
    pub elapsed_secs: f64,
}

impl RewindClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick by `dt` seconds. Returns the new tick number.
    /// Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, dt: f64) -> Tick {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.current_tick += 1;
        self.elapsed_secs += dt;
        self.current_tick
    }

    pub fn now(&self) -> f64 {
        self.elapsed_secs
    }
}
