//! Eligibility gate for automatic snapshots.
//!
//! Pure: `eligibility` looks only at a `CaptureStatus` value and never
//! touches the host. `CaptureStatus::observe` is the one place the host
//! is read.

use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectStatus {
    pub controllable: bool,
    pub dead: bool,
    pub transitioning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldStatus {
    pub transitioning: bool,
    pub paused: bool,
}

/// Everything the gate needs to know about the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureStatus {
    pub subject: Option<SubjectStatus>,
    pub world: Option<WorldStatus>,
}

impl CaptureStatus {
    pub fn observe<H: Host + ?Sized>(host: &H) -> Self {
        Self {
            subject: host.subject().map(|s| SubjectStatus {
                controllable: s.is_controllable(),
                dead: s.is_dead(),
                transitioning: s.is_transitioning(),
            }),
            world: host.world().map(|w| WorldStatus {
                transitioning: w.is_transitioning(),
                paused: w.is_paused(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    NoSubject,
    NotControllable,
    NoWorld,
    WorldTransitioning,
    WorldPaused,
    SubjectDead,
    SubjectTransitioning,
}

impl Ineligible {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSubject            => "no_subject",
            Self::NotControllable      => "not_controllable",
            Self::NoWorld              => "no_world",
            Self::WorldTransitioning   => "world_transitioning",
            Self::WorldPaused          => "world_paused",
            Self::SubjectDead          => "subject_dead",
            Self::SubjectTransitioning => "subject_transitioning",
        }
    }
}

/// Ok when an automatic snapshot may be taken this frame.
pub fn eligibility(status: &CaptureStatus) -> Result<(), Ineligible> {
    let subject = status.subject.ok_or(Ineligible::NoSubject)?;
    if !subject.controllable {
        return Err(Ineligible::NotControllable);
    }
    let world = status.world.ok_or(Ineligible::NoWorld)?;
    if world.transitioning {
        return Err(Ineligible::WorldTransitioning);
    }
    if world.paused {
        return Err(Ineligible::WorldPaused);
    }
    if subject.dead {
        return Err(Ineligible::SubjectDead);
    }
    if subject.transitioning {
        return Err(Ineligible::SubjectTransitioning);
    }
    Ok(())
}

pub fn can_capture(status: &CaptureStatus) -> bool {
    eligibility(status).is_ok()
}
