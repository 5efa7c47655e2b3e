//! Host collaborator contracts.
//!
//! RULE: The core never reaches for global engine state. Everything it
//! reads or writes is looked up through the `Host` handed to each tick.
//! Optional capabilities (physics body, stats, camera) are queried every
//! time they are used; absence is a normal answer, not an error.

use crate::{
    snapshot::Vitals,
    types::{Vec2, Vec3},
};

pub trait WorldManager {
    /// Identifier of the active location.
    fn current_location(&self) -> &str;

    /// True while the host is switching locations.
    fn is_transitioning(&self) -> bool;

    fn is_paused(&self) -> bool {
        false
    }
}

pub trait PhysicsBody {
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
}

/// The tracked character.
pub trait Subject {
    fn is_controllable(&self) -> bool {
        true
    }

    fn is_dead(&self) -> bool;

    /// True while the subject itself is in an entry/exit transition.
    fn is_transitioning(&self) -> bool;

    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    fn facing_right(&self) -> bool;

    /// Toggle facing. Hosts expose no setter.
    fn flip_facing(&mut self);

    fn body(&self) -> Option<&dyn PhysicsBody>;
    fn body_mut(&mut self) -> Option<&mut dyn PhysicsBody>;
}

pub trait StatContainer {
    fn vitals(&self) -> Vitals;
    fn set_vitals(&mut self, vitals: Vitals);
}

pub trait CameraRig {
    fn snap_to(&mut self, x: f32, y: f32);
}

/// Lookup surface over the live host session.
pub trait Host {
    fn world(&self) -> Option<&dyn WorldManager>;

    fn subject(&self) -> Option<&dyn Subject>;
    fn subject_mut(&mut self) -> Option<&mut dyn Subject>;

    fn stats(&self) -> Option<&dyn StatContainer>;
    fn stats_mut(&mut self) -> Option<&mut dyn StatContainer>;

    fn camera_mut(&mut self) -> Option<&mut dyn CameraRig> {
        None
    }

    /// Start an asynchronous load of `location`. Completion is observed
    /// through `world().current_location()`.
    fn begin_location_load(&mut self, location: &str);
}
