use crate::{
    error::{RewindError, RewindResult},
    history::{DEFAULT_CAPACITY, MAX_CAPACITY},
    restore::{RestoreTiming, DEFAULT_LOCK_SECS},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewindConfig {
    /// Key name shown to the user. Mapping it to input is the embedder's job.
    pub rewind_key: String,
    /// Seconds between automatic snapshots.
    pub save_interval_secs: f64,
    /// History capacity (12 = 2 minutes at a 10s interval).
    pub max_snapshots: usize,
    /// How long the subject is pinned after a restore is applied.
    pub position_lock_secs: f64,
    /// Give up waiting for a location/subject after this long. `None` waits forever.
    pub stall_timeout_secs: Option<f64>,
}

impl Default for RewindConfig {
    fn default() -> Self {
        Self {
            rewind_key:         "F2".into(),
            save_interval_secs: 10.0,
            max_snapshots:      DEFAULT_CAPACITY,
            position_lock_secs: DEFAULT_LOCK_SECS,
            stall_timeout_secs: Some(30.0),
        }
    }
}

impl RewindConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json(&content)?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> RewindResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with a one-second save interval, for tests.
    pub fn default_test() -> Self {
        Self {
            save_interval_secs: 1.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> RewindResult<()> {
        if !(self.save_interval_secs.is_finite() && self.save_interval_secs > 0.0) {
            return Err(RewindError::InvalidConfig {
                field: "save_interval_secs",
                reason: format!("must be a positive number, got {}", self.save_interval_secs),
            });
        }
        if !(1..=MAX_CAPACITY).contains(&self.max_snapshots) {
            return Err(RewindError::InvalidConfig {
                field: "max_snapshots",
                reason: format!("must be between 1 and {MAX_CAPACITY}, got {}", self.max_snapshots),
            });
        }
        if !(self.position_lock_secs.is_finite() && self.position_lock_secs >= 0.0) {
            return Err(RewindError::InvalidConfig {
                field: "position_lock_secs",
                reason: format!("must be zero or positive, got {}", self.position_lock_secs),
            });
        }
        if let Some(timeout) = self.stall_timeout_secs {
            if !(timeout.is_finite() && timeout > 0.0) {
                return Err(RewindError::InvalidConfig {
                    field: "stall_timeout_secs",
                    reason: format!("must be positive or null, got {timeout}"),
                });
            }
        }
        if self.rewind_key.trim().is_empty() {
            return Err(RewindError::InvalidConfig {
                field: "rewind_key",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn restore_timing(&self) -> RestoreTiming {
        RestoreTiming {
            lock_secs:          self.position_lock_secs,
            stall_timeout_secs: self.stall_timeout_secs,
        }
    }
}
