//! Core types: geometry, teams, actions, configuration, RNG and world state.
//!
//! These are the fixed-shape records the arena engine mutates every tick.

pub mod action;
pub mod config;
pub mod geometry;
pub mod rng;
pub mod state;
pub mod team;

pub use action::{decode_actions, Action, ActionMap, ACTION_COUNT};
pub use config::{default_walls, ArenaConfig, ConfigOverrides, MIN_GRID_SIZE};
pub use geometry::{segment_samples, Rect, Vec2, SEGMENT_SAMPLES};
pub use rng::GameRng;
pub use state::{Agent, EpisodeStats, Flag, WorldState};
pub use team::{AgentId, AgentMap, Team, TeamMap, AGENTS_PER_TEAM, AGENT_COUNT};
