//! Capture/Apply: the only code that reads or writes live subject state.

use crate::{
    error::{RewindError, RewindResult},
    host::Host,
    snapshot::Snapshot,
    types::{Tick, Vec2, Vec3},
};

/// What `apply` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub flipped: bool,
    pub had_body: bool,
}

/// Read the live subject into a new Snapshot. Performs no mutation.
pub fn capture<H: Host + ?Sized>(host: &H, tick: Tick) -> RewindResult<Snapshot> {
    let world = host
        .world()
        .ok_or(RewindError::CaptureUnavailable { missing: "world" })?;
    let subject = host
        .subject()
        .ok_or(RewindError::CaptureUnavailable { missing: "subject" })?;
    let stats = host
        .stats()
        .ok_or(RewindError::CaptureUnavailable { missing: "stats" })?;

    let velocity = subject.body().map_or(Vec2::ZERO, |b| b.velocity());

    Ok(Snapshot::new(
        world.current_location().to_string(),
        subject.position(),
        velocity,
        stats.vitals(),
        subject.facing_right(),
        tick,
    ))
}

/// Write a Snapshot back onto the live subject.
///
/// Facing is toggled only when it differs; the subject exposes no setter.
pub fn apply<H: Host + ?Sized>(host: &mut H, snapshot: &Snapshot) -> RewindResult<Applied> {
    let subject = host.subject_mut().ok_or(RewindError::SubjectUnavailable)?;

    subject.set_position(snapshot.position());
    let had_body = match subject.body_mut() {
        Some(body) => {
            body.set_velocity(snapshot.velocity());
            true
        }
        None => false,
    };

    let flipped = subject.facing_right() != snapshot.facing_right();
    if flipped {
        subject.flip_facing();
    }

    match host.stats_mut() {
        Some(stats) => stats.set_vitals(snapshot.vitals()),
        None => log::warn!("stat container missing, vitals not restored"),
    }

    Ok(Applied { flipped, had_body })
}

/// Hold the subject at `position` with zero velocity.
/// Returns false if the subject is absent this frame.
pub fn pin<H: Host + ?Sized>(host: &mut H, position: Vec3) -> bool {
    let Some(subject) = host.subject_mut() else {
        return false;
    };
    subject.set_position(position);
    if let Some(body) = subject.body_mut() {
        body.set_velocity(Vec2::ZERO);
    }
    true
}

/// Hand the subject its captured velocity back.
/// Returns false if the subject is absent this frame.
pub fn release<H: Host + ?Sized>(host: &mut H, velocity: Vec2) -> bool {
    let Some(subject) = host.subject_mut() else {
        return false;
    };
    if let Some(body) = subject.body_mut() {
        body.set_velocity(velocity);
    }
    true
}

/// Best-effort camera alignment.
pub fn snap_camera<H: Host + ?Sized>(host: &mut H, position: Vec3) -> bool {
    match host.camera_mut() {
        Some(camera) => {
            camera.snap_to(position.x, position.y);
            true
        }
        None => false,
    }
}
