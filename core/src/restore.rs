//! Restore orchestrator: the multi-tick restore state machine.
//!
//! PHASES (in order, each driven by one `poll` per tick):
//!   WaitingForLocation  only when the snapshot's location is not active;
//!                       exactly one load request is issued on entry
//!   WaitingForSubject   subject must be present, then one grace tick;
//!                       a same-location begin with the subject present
//!                       counts as the sighting
//!   (apply)             single tick: write state, snap camera, start lock
//!   PositionLocked      re-pin position and zero velocity every tick
//!   Done                restore captured velocity once, drop the session
//!
//! RULES:
//!   - At most one session exists. `is_restoring()` is the restoring flag.
//!   - Every transition is decided from the current phase plus what the
//!     host shows this tick (location id, subject presence) and `now`.
//!   - The wait phases give up after `stall_timeout_secs` when set.

use crate::{
    error::{RewindError, RewindResult},
    event::RewindEvent,
    history::History,
    host::Host,
    snapshot::Snapshot,
    state,
    types::{LocationId, Tick},
};

pub const DEFAULT_LOCK_SECS: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoreTiming {
    pub lock_secs: f64,
    pub stall_timeout_secs: Option<f64>,
}

impl Default for RestoreTiming {
    fn default() -> Self {
        Self {
            lock_secs: DEFAULT_LOCK_SECS,
            stall_timeout_secs: Some(30.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestorePhase {
    WaitingForLocation,
    /// `seen` is set on the first tick the subject is present; the apply
    /// happens on the tick after that.
    WaitingForSubject { seen: bool },
    PositionLocked { until: f64 },
    Done,
}

impl RestorePhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WaitingForLocation       => "waiting_for_location",
            Self::WaitingForSubject { .. } => "waiting_for_subject",
            Self::PositionLocked { .. }    => "position_locked",
            Self::Done                     => "done",
        }
    }

    fn is_waiting(&self) -> bool {
        matches!(self, Self::WaitingForLocation | Self::WaitingForSubject { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RestoreSession {
    snapshot: Snapshot,
    phase: RestorePhase,
    started_at: f64,
}

impl RestoreSession {
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }
}

/// Result of one `poll`.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreStep {
    /// No session is active.
    Idle,
    /// Still suspended in the given phase.
    Waiting(RestorePhase),
    /// Holding the subject in place.
    Locked { until: f64 },
    /// Finished this tick; the session is gone.
    Completed { location: LocationId },
}

#[derive(Debug, Default)]
pub struct RestoreOrchestrator {
    session: Option<RestoreSession>,
    timing: RestoreTiming,
}

impl RestoreOrchestrator {
    pub fn new(timing: RestoreTiming) -> Self {
        Self { session: None, timing }
    }

    pub fn is_restoring(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&RestoreSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Option<RestorePhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    pub fn timing(&self) -> RestoreTiming {
        self.timing
    }

    /// New timing applies to the next phase entered; an active lock keeps
    /// its deadline.
    pub fn set_timing(&mut self, timing: RestoreTiming) {
        self.timing = timing;
    }

    /// Pop the newest snapshot and open a session for it.
    ///
    /// Fails with `EmptyHistory` without creating any state. Ignored while a
    /// session is already active.
    pub fn begin<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        history: &mut History,
        now: f64,
        tick: Tick,
        events: &mut Vec<RewindEvent>,
    ) -> RewindResult<()> {
        if self.session.is_some() {
            log::debug!("tick={tick} restore: already restoring, command ignored");
            return Ok(());
        }

        let snapshot = history.pop_newest()?;
        let target = snapshot.location().to_string();
        let cross_location = host
            .world()
            .map_or(true, |w| w.current_location() != target);

        events.push(RewindEvent::RestoreStarted {
            tick,
            location: target.clone(),
            cross_location,
        });

        let phase = if cross_location {
            host.begin_location_load(&target);
            events.push(RewindEvent::LocationLoadRequested {
                tick,
                location: target.clone(),
            });
            log::info!("tick={tick} restore: loading {target}");
            RestorePhase::WaitingForLocation
        } else if host.subject().is_some() {
            // Already in place and present: this tick counts as the first sighting.
            events.push(RewindEvent::SubjectReacquired { tick });
            RestorePhase::WaitingForSubject { seen: true }
        } else {
            RestorePhase::WaitingForSubject { seen: false }
        };

        log::debug!("tick={tick} restore: entering {}", phase.name());
        self.session = Some(RestoreSession {
            snapshot,
            phase,
            started_at: now,
        });
        Ok(())
    }

    /// Advance the active session by one tick.
    ///
    /// A stall drops the session and returns `StalledTransition`.
    pub fn poll<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        now: f64,
        tick: Tick,
        events: &mut Vec<RewindEvent>,
    ) -> RewindResult<RestoreStep> {
        let Some(session) = self.session.as_mut() else {
            return Ok(RestoreStep::Idle);
        };

        if session.phase == RestorePhase::WaitingForLocation {
            let arrived = host
                .world()
                .is_some_and(|w| w.current_location() == session.snapshot.location());
            if !arrived {
                return self.wait_or_stall(now, tick);
            }
            events.push(RewindEvent::LocationReached {
                tick,
                location: session.snapshot.location().to_string(),
            });
            session.phase = RestorePhase::WaitingForSubject { seen: false };
            log::debug!("tick={tick} restore: location reached, waiting for subject");
        }

        if let RestorePhase::WaitingForSubject { seen } = session.phase {
            if host.subject().is_none() {
                session.phase = RestorePhase::WaitingForSubject { seen: false };
                return self.wait_or_stall(now, tick);
            }
            if !seen {
                session.phase = RestorePhase::WaitingForSubject { seen: true };
                events.push(RewindEvent::SubjectReacquired { tick });
                return Ok(RestoreStep::Waiting(session.phase));
            }

            let applied = match state::apply(host, &session.snapshot) {
                Ok(applied) => applied,
                Err(e) => {
                    log::debug!("tick={tick} restore: apply deferred: {e}");
                    session.phase = RestorePhase::WaitingForSubject { seen: false };
                    return self.wait_or_stall(now, tick);
                }
            };
            let camera_snapped = state::snap_camera(host, session.snapshot.position());
            state::pin(host, session.snapshot.position());

            let until = now + self.timing.lock_secs;
            session.phase = RestorePhase::PositionLocked { until };
            events.push(RewindEvent::SnapshotApplied {
                tick,
                flipped: applied.flipped,
                camera_snapped,
            });
            log::debug!("tick={tick} restore: applied, position locked until {until:.3}s");
            return Ok(RestoreStep::Locked { until });
        }

        if let RestorePhase::PositionLocked { until } = session.phase {
            if now < until {
                state::pin(host, session.snapshot.position());
                return Ok(RestoreStep::Locked { until });
            }
            if !state::release(host, session.snapshot.velocity()) {
                log::debug!("tick={tick} restore: subject absent at release, velocity not restored");
            }
            session.phase = RestorePhase::Done;
        }

        let location = self
            .session
            .take()
            .map(|s| s.snapshot.location().to_string())
            .unwrap_or_default();
        Ok(RestoreStep::Completed { location })
    }

    fn wait_or_stall(&mut self, now: f64, tick: Tick) -> RewindResult<RestoreStep> {
        let Some(session) = self.session.as_ref() else {
            return Ok(RestoreStep::Idle);
        };
        debug_assert!(session.phase.is_waiting());

        let waited_secs = now - session.started_at;
        match self.timing.stall_timeout_secs {
            Some(limit) if waited_secs >= limit => {
                let phase = session.phase.name();
                log::debug!("tick={tick} restore: giving up in {phase}");
                self.session = None;
                Err(RewindError::StalledTransition { phase, waited_secs })
            }
            _ => Ok(RestoreStep::Waiting(session.phase)),
        }
    }
}
