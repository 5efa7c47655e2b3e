//! The rewind engine: per-tick driver over history, gate and restore.
//!
//! ORDER EACH TICK (fixed):
//!   1. Advance the clock.
//!   2. If a restore is active, poll it and stop. Nothing else runs.
//!   3. If the subject is absent, stop. The save timer does not advance.
//!   4. If rewind was pressed, begin a restore, reset the save timer, stop.
//!   5. Advance the save timer; on expiry reset it and try a capture.
//!
//! RULES:
//!   - This is the only caller of History, the gate, Capture/Apply and the
//!     orchestrator.
//!   - Failures stay inside the tick: they become events and log lines,
//!     never an Err to the caller.

use crate::{
    clock::RewindClock,
    config::RewindConfig,
    error::{RewindError, RewindResult},
    event::RewindEvent,
    gate::{self, CaptureStatus},
    history::History,
    host::Host,
    restore::{RestoreOrchestrator, RestorePhase, RestoreStep},
    state,
    types::Tick,
};

/// What the host hands the engine each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous tick.
    pub dt: f64,
    /// Edge-triggered: true only on the frame the key went down.
    pub rewind_pressed: bool,
}

impl FrameInput {
    pub fn idle(dt: f64) -> Self {
        Self { dt, rewind_pressed: false }
    }

    pub fn rewind(dt: f64) -> Self {
        Self { dt, rewind_pressed: true }
    }
}

pub struct RewindEngine {
    pub clock:  RewindClock,
    config:     RewindConfig,
    history:    History,
    restore:    RestoreOrchestrator,
    save_timer: f64,
}

impl RewindEngine {
    pub fn new(config: RewindConfig) -> RewindResult<Self> {
        config.validate()?;
        log::info!("rewind ready, press {} to rewind", config.rewind_key);
        Ok(Self {
            clock:      RewindClock::new(),
            history:    History::new(config.max_snapshots),
            restore:    RestoreOrchestrator::new(config.restore_timing()),
            save_timer: 0.0,
            config,
        })
    }

    /// Engine over `RewindConfig::default_test()`.
    pub fn build_test() -> Self {
        let config = RewindConfig::default_test();
        Self {
            clock:      RewindClock::new(),
            history:    History::new(config.max_snapshots),
            restore:    RestoreOrchestrator::new(config.restore_timing()),
            save_timer: 0.0,
            config,
        }
    }

    /// Swap in a new configuration. The history is trimmed oldest-first if
    /// the new capacity is smaller.
    pub fn reconfigure(&mut self, config: RewindConfig) -> RewindResult<()> {
        config.validate()?;
        let evicted = self.history.set_capacity(config.max_snapshots);
        if evicted > 0 {
            log::debug!("reconfigure: dropped {evicted} oldest snapshots");
        }
        self.restore.set_timing(config.restore_timing());
        self.config = config;
        Ok(())
    }

    /// Advance one tick. This is the whole driver.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H, input: FrameInput) -> Vec<RewindEvent> {
        let before = self.clock.now();
        let tick = self.clock.advance(input.dt);
        let now = self.clock.now();
        let dt = now - before;
        let mut events = Vec::new();

        if self.restore.is_restoring() {
            self.poll_restore(host, now, tick, &mut events);
            return events;
        }

        if host.subject().is_none() {
            return events;
        }

        if input.rewind_pressed {
            self.request_restore(host, now, tick, &mut events);
            return events;
        }

        self.save_timer += dt;
        if self.save_timer >= self.config.save_interval_secs {
            self.save_timer = 0.0;
            self.auto_capture(host, tick, &mut events);
        }

        events
    }

    fn poll_restore<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        now: f64,
        tick: Tick,
        events: &mut Vec<RewindEvent>,
    ) {
        match self.restore.poll(host, now, tick, events) {
            Ok(RestoreStep::Completed { location }) => {
                let remaining = self.history.len();
                log::info!("tick={tick} rewound to {location} ({remaining} remaining)");
                events.push(RewindEvent::RestoreCompleted { tick, location, remaining });
            }
            Ok(_) => {}
            Err(RewindError::StalledTransition { phase, waited_secs }) => {
                log::warn!(
                    "tick={tick} restore stalled in {phase} after {waited_secs:.1}s, giving up"
                );
                events.push(RewindEvent::RestoreStalled {
                    tick,
                    phase: phase.to_string(),
                    waited_secs,
                });
            }
            Err(e) => log::warn!("tick={tick} restore: {e}"),
        }
    }

    fn request_restore<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        now: f64,
        tick: Tick,
        events: &mut Vec<RewindEvent>,
    ) {
        if !self.history.is_empty() && host.world().is_none() {
            log::debug!("tick={tick} rewind: no world manager, command ignored");
            return;
        }

        match self.restore.begin(host, &mut self.history, now, tick, events) {
            Ok(()) => self.save_timer = 0.0,
            Err(RewindError::EmptyHistory) => {
                log::warn!("tick={tick} no snapshot available to rewind to");
                events.push(RewindEvent::RestoreRejected {
                    tick,
                    reason: "empty_history".into(),
                });
            }
            Err(e) => {
                log::warn!("tick={tick} rewind: {e}");
                events.push(RewindEvent::RestoreRejected { tick, reason: e.to_string() });
            }
        }
    }

    fn auto_capture<H: Host + ?Sized>(
        &mut self,
        host: &H,
        tick: Tick,
        events: &mut Vec<RewindEvent>,
    ) {
        if let Err(reason) = gate::eligibility(&CaptureStatus::observe(host)) {
            log::debug!("tick={tick} capture skipped: {}", reason.as_str());
            events.push(RewindEvent::CaptureSkipped {
                tick,
                reason: reason.as_str().into(),
            });
            return;
        }

        let snapshot = match state::capture(host, tick) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::debug!("tick={tick} capture skipped: {e}");
                events.push(RewindEvent::CaptureSkipped { tick, reason: e.to_string() });
                return;
            }
        };

        let location = snapshot.location().to_string();
        if let Some(evicted) = self.history.push(snapshot) {
            log::debug!("tick={tick} evicted snapshot from tick {}", evicted.taken_at());
            events.push(RewindEvent::SnapshotEvicted { tick, taken_at: evicted.taken_at() });
        }

        let stored = self.history.len();
        let capacity = self.history.capacity();
        log::info!("tick={tick} snapshot {stored}/{capacity} taken in {location}");
        events.push(RewindEvent::SnapshotTaken { tick, location, stored, capacity });
    }

    pub fn config(&self) -> &RewindConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The restoring flag.
    pub fn is_restoring(&self) -> bool {
        self.restore.is_restoring()
    }

    pub fn restore_phase(&self) -> Option<RestorePhase> {
        self.restore.phase()
    }

    pub fn save_timer(&self) -> f64 {
        self.save_timer
    }
}
