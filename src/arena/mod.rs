//! The arena engine: rule resolution, observations and the episode
//! lifecycle.

pub mod engine;
pub mod observation;
pub mod rules;

pub use engine::{ArenaEngine, ResetOptions, StepInfo, StepResult, DEFAULT_SEED};
pub use observation::{build_observation, index, Observation, OBS_DIM};
pub use rules::{DropResult, Outcome, Rules};
