use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewindError {
    #[error("No snapshot available to rewind to")]
    EmptyHistory,

    #[error("Capture unavailable: {missing} not present")]
    CaptureUnavailable { missing: &'static str },

    #[error("Subject not present, snapshot not applied")]
    SubjectUnavailable,

    #[error("Restore stalled in {phase} after {waited_secs:.1}s")]
    StalledTransition { phase: &'static str, waited_secs: f64 },

    #[error("Invalid config value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RewindResult<T> = Result<T, RewindError>;
