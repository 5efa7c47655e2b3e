//! Rewind core: periodic snapshots of a live subject and multi-tick
//! restoration across asynchronous location loads.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod gate;
pub mod history;
pub mod host;
pub mod restore;
pub mod rng;
pub mod sandbox;
pub mod snapshot;
pub mod state;
pub mod types;

pub use config::RewindConfig;
pub use engine::{FrameInput, RewindEngine};
pub use error::{RewindError, RewindResult};
pub use event::RewindEvent;
pub use history::History;
pub use snapshot::{Snapshot, Vitals};
