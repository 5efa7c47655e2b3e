//! Snapshot: one captured instant of subject state.
//!
//! Only `state::capture` builds a Snapshot, and only from a subject whose
//! every source field was present. A Snapshot never changes after that.

use crate::types::{LocationId, Tick, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Integer stats held by the host's stat container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: i32,
    pub max_health: i32,
    pub currency_primary: i32,
    pub currency_secondary: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    location: LocationId,
    position: Vec3,
    velocity: Vec2,
    vitals: Vitals,
    facing_right: bool,
    taken_at: Tick,
}

impl Snapshot {
    pub(crate) fn new(
        location: LocationId,
        position: Vec3,
        velocity: Vec2,
        vitals: Vitals,
        facing_right: bool,
        taken_at: Tick,
    ) -> Self {
        Self {
            location,
            position,
            velocity,
            vitals,
            facing_right,
            taken_at,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn vitals(&self) -> Vitals {
        self.vitals
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    /// Driver tick the snapshot was captured on. Informational only.
    pub fn taken_at(&self) -> Tick {
        self.taken_at
    }
}
