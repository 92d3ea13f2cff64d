//! Replay records: per-tick frames plus end-of-episode metadata.

use serde::{Deserialize, Serialize};

use crate::core::{AgentId, AgentMap, ArenaConfig, EpisodeStats, Rect, Team, TeamMap, Vec2, WorldState};
use crate::error::Result;

/// One agent inside a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentFrame {
    pub position: Vec2,
    pub team: Team,
    pub has_flag: bool,
    pub is_stunned: bool,
    pub tackle_cooldown: u32,
}

/// One flag inside a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagFrame {
    pub position: Vec2,
    pub carried_by: Option<AgentId>,
    pub at_base: bool,
}

/// Full snapshot of the arena after a tick (or after reset, for step 0).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub step: u32,
    pub agents: AgentMap<AgentFrame>,
    pub flags: TeamMap<FlagFrame>,
    pub scores: TeamMap<u32>,
}

impl Frame {
    #[must_use]
    pub fn capture(world: &WorldState) -> Self {
        Self {
            step: world.current_step,
            agents: world.agents.map(|_, a| AgentFrame {
                position: a.position,
                team: a.team(),
                has_flag: a.has_flag,
                is_stunned: a.is_stunned,
                tackle_cooldown: a.tackle_cooldown,
            }),
            flags: TeamMap::new(|team| {
                let flag = &world.flags[team];
                FlagFrame {
                    position: flag.position,
                    carried_by: flag.carried_by,
                    at_base: flag.at_base,
                }
            }),
            scores: world.scores,
        }
    }
}

/// Episode-level data handed to recorders once an episode ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub grid_size: u32,
    pub max_steps: u32,
    pub win_score: u32,
    pub tackle_cooldown: u32,
    pub final_scores: TeamMap<u32>,
    pub episode_stats: EpisodeStats,
    pub walls: Vec<Rect>,
    pub reward_profile: String,
    /// Seed of the reset that started the episode, if one was given.
    pub seed: Option<u64>,
}

impl EpisodeMetadata {
    #[must_use]
    pub fn new(config: &ArenaConfig, world: &WorldState, reward_profile: &str, seed: Option<u64>) -> Self {
        Self {
            grid_size: config.grid_size,
            max_steps: config.max_steps,
            win_score: config.win_score,
            tackle_cooldown: config.tackle_cooldown,
            final_scores: world.scores,
            episode_stats: world.stats.clone(),
            walls: config.walls.clone(),
            reward_profile: reward_profile.to_string(),
            seed,
        }
    }

    /// The team with the higher final score, or `None` on a tie.
    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        let TeamMap { blue, red } = self.final_scores;
        match blue.cmp(&red) {
            std::cmp::Ordering::Greater => Some(Team::Blue),
            std::cmp::Ordering::Less => Some(Team::Red),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A complete episode: metadata plus every frame from step 0.
///
/// Frames are held in a persistent vector, so cloning a record (or the
/// engine's live history) shares structure instead of copying frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub metadata: EpisodeMetadata,
    pub frames: im::Vector<Frame>,
}

impl ReplayRecord {
    #[must_use]
    pub fn new(metadata: EpisodeMetadata, frames: im::Vector<Frame>) -> Self {
        Self { metadata, frames }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.back()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
