//! Replay frames, episode metadata and recorder sinks.

pub mod frame;
pub mod recorder;

pub use frame::{AgentFrame, EpisodeMetadata, Frame, FlagFrame, ReplayRecord};
pub use recorder::{MemoryRecorder, Recorder};
