//! Sandbox host: an in-memory stand-in for a live game session.
//!
//! `SandboxHost::step` plays the part of the host engine's own frame:
//! it integrates velocity, progresses location loads, respawns the subject
//! and runs a short entry animation that pushes the subject off its spawn
//! point. Those are exactly the things a restore has to survive.
//!
//! With `manual_loads()` a load request is only recorded; the caller
//! switches location and spawns the subject explicitly.

use crate::{
    host::{CameraRig, Host, PhysicsBody, StatContainer, Subject, WorldManager},
    rng::LatencyRng,
    snapshot::Vitals,
    types::{LocationId, Vec2, Vec3},
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxWorld {
    pub location: LocationId,
    pub transitioning: bool,
    pub paused: bool,
}

impl WorldManager for SandboxWorld {
    fn current_location(&self) -> &str {
        &self.location
    }

    fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SandboxBody {
    pub velocity: Vec2,
}

impl PhysicsBody for SandboxBody {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxSubject {
    pub position: Vec3,
    pub facing_right: bool,
    pub body: Option<SandboxBody>,
    pub controllable: bool,
    pub dead: bool,
    pub transitioning: bool,
    /// How many times `flip_facing` was called.
    pub flips: u32,
}

impl SandboxSubject {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            facing_right: true,
            body: Some(SandboxBody::default()),
            controllable: true,
            dead: false,
            transitioning: false,
            flips: 0,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.map_or(Vec2::ZERO, |b| b.velocity)
    }
}

impl Subject for SandboxSubject {
    fn is_controllable(&self) -> bool {
        self.controllable
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn facing_right(&self) -> bool {
        self.facing_right
    }

    fn flip_facing(&mut self) {
        self.facing_right = !self.facing_right;
        self.flips += 1;
    }

    fn body(&self) -> Option<&dyn PhysicsBody> {
        self.body.as_ref().map(|b| b as &dyn PhysicsBody)
    }

    fn body_mut(&mut self) -> Option<&mut dyn PhysicsBody> {
        self.body.as_mut().map(|b| b as &mut dyn PhysicsBody)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerData {
    pub vitals: Vitals,
}

impl StatContainer for PlayerData {
    fn vitals(&self) -> Vitals {
        self.vitals
    }

    fn set_vitals(&mut self, vitals: Vitals) {
        self.vitals = vitals;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SandboxCamera {
    pub last_snap: Option<(f32, f32)>,
    pub snaps: u32,
}

impl CameraRig for SandboxCamera {
    fn snap_to(&mut self, x: f32, y: f32) {
        self.last_snap = Some((x, y));
        self.snaps += 1;
    }
}

/// Frame counts for an automatic location load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadPlan {
    /// Frames the world spends transitioning before the location switches.
    pub load_frames: u32,
    /// Extra random frames added to `load_frames` when an RNG is attached.
    pub load_jitter: u32,
    /// Frames between the location switch and the subject appearing.
    pub spawn_delay_frames: u32,
    /// Frames the entry animation drives the subject after spawning.
    pub entry_frames: u32,
    pub entry_velocity: Vec2,
}

impl Default for LoadPlan {
    fn default() -> Self {
        Self {
            load_frames:        3,
            load_jitter:        0,
            spawn_delay_frames: 2,
            entry_frames:       8,
            entry_velocity:     Vec2::new(6.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Loading { target: LocationId, frames_left: u32 },
    Spawning { frames_left: u32 },
}

pub struct SandboxHost {
    pub world: Option<SandboxWorld>,
    pub subject: Option<SandboxSubject>,
    pub stats: Option<PlayerData>,
    pub camera: Option<SandboxCamera>,
    /// Every location passed to `begin_location_load`, in order.
    pub load_requests: Vec<LocationId>,
    plan: LoadPlan,
    manual_loads: bool,
    spawn_points: HashMap<LocationId, Vec3>,
    pending: Option<Pending>,
    entry_frames_left: u32,
    respawn_with_body: bool,
    rng: Option<LatencyRng>,
}

impl SandboxHost {
    /// A settled session in `location`: subject at the origin with a body,
    /// stats, camera, no pending load.
    pub fn new(location: &str) -> Self {
        Self {
            world: Some(SandboxWorld {
                location: location.to_string(),
                transitioning: false,
                paused: false,
            }),
            subject: Some(SandboxSubject::at(Vec3::ZERO)),
            stats: Some(PlayerData {
                vitals: Vitals {
                    health: 5,
                    max_health: 5,
                    currency_primary: 0,
                    currency_secondary: 0,
                },
            }),
            camera: Some(SandboxCamera::default()),
            load_requests: Vec::new(),
            plan: LoadPlan::default(),
            manual_loads: false,
            spawn_points: HashMap::new(),
            pending: None,
            entry_frames_left: 0,
            respawn_with_body: true,
            rng: None,
        }
    }

    pub fn with_plan(mut self, plan: LoadPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_rng(mut self, rng: LatencyRng) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn with_spawn_point(mut self, location: &str, position: Vec3) -> Self {
        self.spawn_points.insert(location.to_string(), position);
        self
    }

    /// Record load requests but never act on them.
    pub fn manual_loads(mut self) -> Self {
        self.manual_loads = true;
        self
    }

    pub fn plan(&self) -> LoadPlan {
        self.plan
    }

    pub fn location(&self) -> Option<&str> {
        self.world.as_ref().map(|w| w.location.as_str())
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Switch location immediately, as if a load just finished.
    pub fn set_location(&mut self, location: &str) {
        if let Some(world) = self.world.as_mut() {
            world.location = location.to_string();
            world.transitioning = false;
        }
    }

    pub fn despawn_subject(&mut self) {
        if let Some(subject) = self.subject.take() {
            self.respawn_with_body = subject.body.is_some();
        }
        self.entry_frames_left = 0;
    }

    /// Spawn a fresh subject at the current location's spawn point and
    /// start its entry animation.
    pub fn spawn_subject(&mut self) {
        let spawn = self
            .location()
            .and_then(|loc| self.spawn_points.get(loc).copied())
            .unwrap_or(Vec3::ZERO);
        let mut subject = SandboxSubject::at(spawn);
        if !self.respawn_with_body {
            subject.body = None;
        }
        subject.transitioning = self.plan.entry_frames > 0;
        self.subject = Some(subject);
        self.entry_frames_left = self.plan.entry_frames;
    }

    /// Walk into another location the ordinary way (not a restore).
    pub fn travel(&mut self, location: &str) {
        self.start_load(location);
    }

    fn start_load(&mut self, location: &str) {
        if let Some(world) = self.world.as_mut() {
            world.transitioning = true;
        }
        self.despawn_subject();
        let frames_left = match self.rng.as_mut() {
            Some(rng) => rng.frames(self.plan.load_frames, self.plan.load_jitter),
            None => self.plan.load_frames,
        };
        self.pending = Some(Pending::Loading {
            target: location.to_string(),
            frames_left,
        });
    }

    /// One host frame: progress loads and spawns, run the entry animation,
    /// integrate velocity.
    pub fn step(&mut self, dt: f64) {
        match self.pending.take() {
            Some(Pending::Loading { target, frames_left }) if frames_left > 0 => {
                self.pending = Some(Pending::Loading { target, frames_left: frames_left - 1 });
            }
            Some(Pending::Loading { target, .. }) => {
                self.set_location(&target);
                self.pending = Some(Pending::Spawning {
                    frames_left: self.plan.spawn_delay_frames,
                });
            }
            Some(Pending::Spawning { frames_left }) if frames_left > 0 => {
                self.pending = Some(Pending::Spawning { frames_left: frames_left - 1 });
            }
            Some(Pending::Spawning { .. }) => self.spawn_subject(),
            None => {}
        }

        let entry_velocity = self.plan.entry_velocity;
        let Some(subject) = self.subject.as_mut() else {
            return;
        };

        if self.entry_frames_left > 0 {
            self.entry_frames_left -= 1;
            subject.transitioning = self.entry_frames_left > 0;
            subject.position = subject.position.advanced(entry_velocity, dt as f32);
        }

        let velocity = subject.velocity();
        subject.position = subject.position.advanced(velocity, dt as f32);
    }
}

impl Host for SandboxHost {
    fn world(&self) -> Option<&dyn WorldManager> {
        self.world.as_ref().map(|w| w as &dyn WorldManager)
    }

    fn subject(&self) -> Option<&dyn Subject> {
        self.subject.as_ref().map(|s| s as &dyn Subject)
    }

    fn subject_mut(&mut self) -> Option<&mut dyn Subject> {
        self.subject.as_mut().map(|s| s as &mut dyn Subject)
    }

    fn stats(&self) -> Option<&dyn StatContainer> {
        self.stats.as_ref().map(|s| s as &dyn StatContainer)
    }

    fn stats_mut(&mut self) -> Option<&mut dyn StatContainer> {
        self.stats.as_mut().map(|s| s as &mut dyn StatContainer)
    }

    fn camera_mut(&mut self) -> Option<&mut dyn CameraRig> {
        self.camera.as_mut().map(|c| c as &mut dyn CameraRig)
    }

    fn begin_location_load(&mut self, location: &str) {
        self.load_requests.push(location.to_string());
        if !self.manual_loads {
            self.start_load(location);
        }
    }
}
