//! The arena engine: episode lifecycle and the per-tick step function.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --reset--> Running --step*--> Finished
//!        ^                    |  ^                |
//!        |                    +--+---- reset -----+
//! ```
//!
//! `step` before the first `reset` fails with `ArenaError::NotReset`;
//! `step` after the episode ended fails with `ArenaError::EpisodeOver`.
//!
//! ## Tick order
//!
//! 1. advance the step counter
//! 2. snapshot every agent's shaping target
//! 3. advance stun timers and tackle cooldowns
//! 4. execute actions in `AgentId::ALL` order
//! 5. resolve pickup, capture and return in the same order
//! 6. pay distance shaping, then the step penalty
//! 7. check termination and pay `WIN` / `LOSE`
//! 8. record the frame and build observations

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{
    decode_actions, ActionMap, AgentId, AgentMap, ArenaConfig, GameRng, Team, TeamMap, Vec2,
    WorldState,
};
use crate::error::{ArenaError, Result};
use crate::replay::{EpisodeMetadata, Frame, Recorder, ReplayRecord};
use crate::rewards::{select_target, shaping_reward, RewardProfile, Target, TargetSnapshot};

use super::observation::{build_observation, Observation};
use super::rules::{Outcome, Rules};

/// Seed used when the first `reset` does not provide one.
pub const DEFAULT_SEED: u64 = 0;

/// Optional overrides for `ArenaEngine::reset`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetOptions {
    /// Fixed start positions; agents left as `None` spawn randomly.
    pub positions: AgentMap<Option<Vec2>>,
}

impl ResetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `agent` to `position`.
    #[must_use]
    pub fn with_position(mut self, agent: AgentId, position: Vec2) -> Self {
        self.positions[agent] = Some(position);
        self
    }

    fn validate(&self, config: &ArenaConfig) -> Result<()> {
        for (agent, position) in self.positions.iter() {
            let Some(p) = *position else { continue };
            if p.clamp_to(config.limit()) != p || !p.x.is_finite() || !p.y.is_finite() {
                return Err(ArenaError::InvalidResetOption(format!(
                    "{agent} position {p:?} is outside the arena"
                )));
            }
            if config.is_in_wall(p) {
                return Err(ArenaError::InvalidResetOption(format!(
                    "{agent} position {p:?} is inside a wall"
                )));
            }
        }
        Ok(())
    }
}

/// Per-agent auxiliary data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Current scores; `None` in the infos returned by `reset`.
    pub scores: Option<TeamMap<u32>>,
}

/// Everything one tick returns.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    pub observations: AgentMap<Observation>,
    pub rewards: AgentMap<f64>,
    /// Identical for every agent: the episode ended this tick.
    pub terminations: AgentMap<bool>,
    /// Always false; the step limit is reported as a termination.
    pub truncations: AgentMap<bool>,
    pub infos: AgentMap<StepInfo>,
    pub outcome: Option<Outcome>,
}

impl StepResult {
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    /// Sum of the rewards paid to `team` this tick.
    #[must_use]
    pub fn team_reward(&self, team: Team) -> f64 {
        team.agents().map(|a| self.rewards[a]).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Running,
    Finished(Outcome),
}

/// A single capture-the-flag arena.
///
/// Owns its world exclusively; run one instance per concurrent game.
pub struct ArenaEngine {
    config: ArenaConfig,
    profile: RewardProfile,
    rng: GameRng,
    world: WorldState,
    phase: Phase,
    episode_seed: Option<u64>,
    frames: im::Vector<Frame>,
    last_replay: Option<ReplayRecord>,
    recorder: Option<Box<dyn Recorder>>,
}

impl std::fmt::Debug for ArenaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaEngine")
            .field("profile", &self.profile.name)
            .field("phase", &self.phase)
            .field("step", &self.world.current_step)
            .field("scores", &self.world.scores)
            .field("recorder", &self.recorder.is_some())
            .finish_non_exhaustive()
    }
}

impl ArenaEngine {
    /// Build an engine, resolving the reward profile named in `config`.
    pub fn new(config: ArenaConfig) -> Result<Self> {
        let profile = RewardProfile::by_name(&config.reward_profile)?;
        Self::with_profile(config, profile)
    }

    /// Build an engine with an explicit (possibly custom) reward profile.
    pub fn with_profile(config: ArenaConfig, profile: RewardProfile) -> Result<Self> {
        config.validate()?;
        let positions = AgentMap::new(|a| config.fallback_spawn(a.team));
        let world = WorldState::new(&positions, &config.flag_spawns);
        Ok(Self {
            config,
            profile,
            rng: GameRng::new(DEFAULT_SEED),
            world,
            phase: Phase::Uninitialized,
            episode_seed: None,
            frames: im::Vector::new(),
            last_replay: None,
            recorder: None,
        })
    }

    /// Attach a recorder. It receives frame 0 of the next reset onwards.
    pub fn attach_recorder(&mut self, recorder: Box<dyn Recorder>) {
        self.recorder = Some(recorder);
    }

    pub fn detach_recorder(&mut self) -> Option<Box<dyn Recorder>> {
        self.recorder.take()
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn profile(&self) -> &RewardProfile {
        &self.profile
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    /// How the last episode ended, once it has.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// The shaping target `agent` is currently heading for.
    pub fn target_for(&self, agent: AgentId) -> Target {
        select_target(&self.world, &self.config, agent)
    }

    pub fn observe(&self, agent: AgentId) -> Observation {
        build_observation(&self.world, &self.config, agent)
    }

    pub fn observations(&self) -> AgentMap<Observation> {
        AgentMap::new(|a| self.observe(a))
    }

    /// The episode replaced by the most recent `reset`, finished or not.
    pub fn last_replay(&self) -> Option<&ReplayRecord> {
        self.last_replay.as_ref()
    }

    /// The episode in progress (or just finished), from frame 0.
    pub fn current_replay(&self) -> Option<ReplayRecord> {
        if self.frames.is_empty() {
            return None;
        }
        Some(ReplayRecord::new(self.metadata(), self.frames.clone()))
    }

    fn metadata(&self) -> EpisodeMetadata {
        EpisodeMetadata::new(&self.config, &self.world, &self.profile.name, self.episode_seed)
    }

    /// Start a new episode.
    ///
    /// `Some(seed)` reseeds the spawn stream; `None` continues the current
    /// one. Options are validated before any state changes.
    pub fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<ResetOptions>,
    ) -> Result<(AgentMap<Observation>, AgentMap<StepInfo>)> {
        let options = options.unwrap_or_default();
        options.validate(&self.config)?;

        if !self.frames.is_empty() {
            let frames = std::mem::take(&mut self.frames);
            self.last_replay = Some(ReplayRecord::new(self.metadata(), frames));
        }

        if let Some(seed) = seed {
            self.rng = GameRng::new(seed);
        }
        self.episode_seed = seed;

        let mut positions = AgentMap::with_value(Vec2::ZERO);
        for agent in AgentId::all() {
            positions[agent] = match options.positions[agent] {
                Some(p) => p,
                None => self.spawn_position(agent),
            };
        }

        self.world = WorldState::new(&positions, &self.config.flag_spawns);
        self.phase = Phase::Running;
        self.record_frame();

        info!(seed = ?seed, profile = %self.profile.name, "episode reset");
        Ok((self.observations(), AgentMap::with_default()))
    }

    fn spawn_position(&mut self, agent: AgentId) -> Vec2 {
        let (x_low, x_high) = self.config.spawn_band(agent.team);
        let y_high = self.config.limit();

        for _ in 0..self.config.spawn_retries {
            let candidate = Vec2::new(
                self.rng.gen_range_f64(x_low, x_high),
                self.rng.gen_range_f64(1.0, y_high),
            );
            if !self.config.is_in_wall(candidate) {
                return candidate;
            }
        }

        let fallback = self.config.fallback_spawn(agent.team);
        warn!(%agent, ?fallback, "spawn retries exhausted");
        fallback
    }

    /// Advance one tick. Agents missing from `actions` do nothing.
    pub fn step(&mut self, actions: &ActionMap) -> Result<StepResult> {
        match self.phase {
            Phase::Uninitialized => return Err(ArenaError::NotReset),
            Phase::Finished(_) => return Err(ArenaError::EpisodeOver),
            Phase::Running => {}
        }

        self.world.current_step += 1;
        let mut rewards = AgentMap::with_value(0.0);
        let snapshots = AgentMap::new(|a| TargetSnapshot::capture(&self.world, &self.config, a));

        let rules = Rules::new(&self.config, &self.profile);
        rules.advance_timers(&mut self.world);

        for agent in AgentId::all() {
            if let Some(&action) = actions.get(&agent) {
                rewards[agent] += rules.execute_action(&mut self.world, agent, action);
            }
        }

        rules.resolve_flags(&mut self.world, &mut rewards);

        for agent in AgentId::all() {
            rewards[agent] += shaping_reward(&self.world, &self.config, &self.profile, agent, &snapshots[agent]);
            rewards[agent] += self.profile.step_penalty;
        }
        self.world.stats.total_steps = self.world.current_step;

        let outcome = rules.check_termination(&self.world);
        if let Some(outcome) = outcome {
            rules.apply_terminal_rewards(outcome, &mut rewards);
        }

        self.record_frame();
        if let Some(outcome) = outcome {
            self.finish_episode(outcome);
        }

        let done = outcome.is_some();
        let scores = self.world.scores;
        Ok(StepResult {
            observations: self.observations(),
            rewards,
            terminations: AgentMap::with_value(done),
            truncations: AgentMap::with_value(false),
            infos: AgentMap::with_value(StepInfo { scores: Some(scores) }),
            outcome,
        })
    }

    /// Decode raw integer actions, then `step`.
    pub fn step_raw(&mut self, actions: &FxHashMap<AgentId, i64>) -> Result<StepResult> {
        let actions = decode_actions(actions)?;
        self.step(&actions)
    }

    fn record_frame(&mut self) {
        let frame = Frame::capture(&self.world);
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record_frame(&frame);
        }
        self.frames.push_back(frame);
    }

    fn finish_episode(&mut self, outcome: Outcome) {
        self.phase = Phase::Finished(outcome);
        let metadata = self.metadata();
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.finish_episode(&metadata);
        }
        info!(
            step = self.world.current_step,
            blue = self.world.scores.blue,
            red = self.world.scores.red,
            winner = ?outcome.winner(),
            "episode finished"
        );
        debug!(stats = ?self.world.stats, "episode stats");
    }
}
