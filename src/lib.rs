//! # rust-ctf
//!
//! A deterministic 2v2 capture-the-flag arena for multi-agent RL training.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: the only randomness is spawn placement, drawn from
//!    a seeded ChaCha8 stream. Same seed and same actions give the same
//!    observations, rewards and frames.
//!
//! 2. **Explicit ordering**: agents act and interact with flags in the
//!    fixed order `blue_0, blue_1, red_0, red_1`. Same-tick outcomes (a
//!    tackle landing before the victim moves) depend on it.
//!
//! 3. **Configuration Over Convention**: the layout, timings and reward
//!    profile live in `ArenaConfig` and `RewardProfile`, resolved once when
//!    an engine is built.
//!
//! ## Architecture
//!
//! - **Owned world state**: each `ArenaEngine` owns one `WorldState`;
//!   all mutation goes through `reset` and `step`.
//!
//! - **Persistent Data Structures**: frame history lives in an `im`
//!   vector, so handing off a finished episode's replay is O(1).
//!
//! ## Modules
//!
//! - `core`: geometry, teams and agents, actions, configuration, RNG, world state
//! - `rewards`: reward profiles and distance shaping
//! - `arena`: the engine, rule resolution and observations
//! - `replay`: frames, episode metadata and recorder sinks
//! - `policy`: random, constant and scripted action sources
//! - `training`: episode rollouts and batched engines
//! - `python` (feature `python`): PyO3 bindings

pub mod arena;
pub mod core;
pub mod error;
pub mod policy;
pub mod replay;
pub mod rewards;
pub mod training;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionMap, AgentId, AgentMap, ArenaConfig, GameRng, Rect, Team, TeamMap, Vec2,
    WorldState,
};

pub use crate::error::{ArenaError, Result};

pub use crate::rewards::{RewardKey, RewardProfile};

pub use crate::arena::{
    ArenaEngine, Observation, Outcome, ResetOptions, StepInfo, StepResult, OBS_DIM,
};

pub use crate::replay::{EpisodeMetadata, Frame, MemoryRecorder, Recorder, ReplayRecord};

pub use crate::policy::{ConstantPolicy, HeuristicPolicy, Policy, RandomPolicy};

pub use crate::training::{run_episode, ArenaPool, EpisodeSummary, RolloutConfig};
