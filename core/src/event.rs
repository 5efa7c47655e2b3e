//! Per-tick event stream.
//!
//! `RewindEngine::tick` returns the events it produced. Nothing in the core
//! reads them back; they exist for embedders, the runner and tests.
//! Variants are append-only.

use crate::types::{LocationId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewindEvent {
    // ── Auto-save path ─────────────────────────────
    SnapshotTaken {
        tick: Tick,
        location: LocationId,
        stored: usize,
        capacity: usize,
    },
    SnapshotEvicted {
        tick: Tick,
        taken_at: Tick,
    },
    CaptureSkipped {
        tick: Tick,
        reason: String,
    },

    // ── Restore path ───────────────────────────────
    RestoreRejected {
        tick: Tick,
        reason: String,
    },
    RestoreStarted {
        tick: Tick,
        location: LocationId,
        cross_location: bool,
    },
    LocationLoadRequested {
        tick: Tick,
        location: LocationId,
    },
    LocationReached {
        tick: Tick,
        location: LocationId,
    },
    SubjectReacquired {
        tick: Tick,
    },
    SnapshotApplied {
        tick: Tick,
        flipped: bool,
        camera_snapped: bool,
    },
    RestoreCompleted {
        tick: Tick,
        location: LocationId,
        remaining: usize,
    },
    RestoreStalled {
        tick: Tick,
        phase: String,
        waited_secs: f64,
    },
}

impl RewindEvent {
    /// Stable snake_case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SnapshotTaken { .. }         => "snapshot_taken",
            Self::SnapshotEvicted { .. }       => "snapshot_evicted",
            Self::CaptureSkipped { .. }        => "capture_skipped",
            Self::RestoreRejected { .. }       => "restore_rejected",
            Self::RestoreStarted { .. }        => "restore_started",
            Self::LocationLoadRequested { .. } => "location_load_requested",
            Self::LocationReached { .. }       => "location_reached",
            Self::SubjectReacquired { .. }     => "subject_reacquired",
            Self::SnapshotApplied { .. }       => "snapshot_applied",
            Self::RestoreCompleted { .. }      => "restore_completed",
            Self::RestoreStalled { .. }        => "restore_stalled",
        }
    }
}
