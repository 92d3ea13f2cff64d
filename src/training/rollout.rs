//! Episode rollouts: drive an engine with a set of policies and collect
//! per-agent transitions for a learner.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::{ArenaEngine, Observation, ResetOptions};
use crate::core::{Action, AgentId, AgentMap, EpisodeStats, GameRng, Team, TeamMap};
use crate::error::Result;
use crate::policy::{select_actions, PolicyMap};

/// Configuration for rollouts.
#[derive(Clone, Debug)]
pub struct RolloutConfig {
    /// Keep every (observation, action, reward) tuple, not just totals.
    pub record_transitions: bool,

    /// Seed offset for episodes (combined with the episode index).
    pub seed_offset: u64,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            record_transitions: true,
            seed_offset: 0,
        }
    }
}

impl RolloutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transitions(mut self, record: bool) -> Self {
        self.record_transitions = record;
        self
    }

    pub fn with_seed_offset(mut self, offset: u64) -> Self {
        self.seed_offset = offset;
        self
    }
}

/// One agent's experience for one tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transition {
    /// Tick the action was taken on (1-based, like `current_step`).
    pub step: u32,
    pub agent: AgentId,
    /// Observation the action was chosen from.
    pub observation: Observation,
    pub action: Action,
    pub reward: f64,
    pub done: bool,
}

/// Result of one finished episode.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub seed: u64,
    pub steps: u32,
    pub scores: TeamMap<u32>,
    /// `None` when the episode timed out.
    pub winner: Option<Team>,
    /// Undiscounted reward sum per agent.
    pub returns: AgentMap<f64>,
    pub stats: EpisodeStats,
    pub transitions: Vec<Transition>,
}

impl EpisodeSummary {
    pub fn timed_out(&self) -> bool {
        self.winner.is_none()
    }

    pub fn team_return(&self, team: Team) -> f64 {
        team.agents().map(|a| self.returns[a]).sum()
    }

    pub fn agent_transitions(&self, agent: AgentId) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.agent == agent)
    }
}

/// Play one episode from `reset(seed)` to termination.
///
/// Policies draw from their own stream forked off `seed`, so the spawn
/// stream and the action stream never interfere.
pub fn run_episode(
    engine: &mut ArenaEngine,
    policies: &PolicyMap,
    seed: u64,
    options: Option<ResetOptions>,
    config: &RolloutConfig,
) -> Result<EpisodeSummary> {
    let mut policy_rng = GameRng::new(seed).fork();
    let (mut observations, _) = engine.reset(Some(seed), options)?;

    let mut returns = AgentMap::with_value(0.0);
    let mut transitions = Vec::new();

    let outcome = loop {
        let actions = select_actions(policies, &observations, &mut policy_rng);
        let result = engine.step(&actions)?;

        let step = engine.world().current_step;
        for agent in AgentId::all() {
            returns[agent] += result.rewards[agent];
            if config.record_transitions {
                transitions.push(Transition {
                    step,
                    agent,
                    observation: observations[agent],
                    action: actions[&agent],
                    reward: result.rewards[agent],
                    done: result.terminations[agent],
                });
            }
        }

        observations = result.observations;
        if let Some(outcome) = result.outcome {
            break outcome;
        }
    };

    let world = engine.world();
    debug!(seed, steps = world.current_step, ?outcome, "rollout finished");
    Ok(EpisodeSummary {
        seed,
        steps: world.current_step,
        scores: world.scores,
        winner: outcome.winner(),
        returns,
        stats: world.stats.clone(),
        transitions,
    })
}

/// Runs a series of episodes on one engine with fixed policies.
pub struct RolloutWorker {
    engine: ArenaEngine,
    policies: PolicyMap,
    config: RolloutConfig,
}

impl RolloutWorker {
    pub fn new(engine: ArenaEngine, policies: PolicyMap, config: RolloutConfig) -> Self {
        Self {
            engine,
            policies,
            config,
        }
    }

    pub fn engine(&self) -> &ArenaEngine {
        &self.engine
    }

    /// Play episode `index`, seeded `seed_offset + index`.
    pub fn play_episode(&mut self, index: u64) -> Result<EpisodeSummary> {
        let seed = self.config.seed_offset.wrapping_add(index);
        run_episode(&mut self.engine, &self.policies, seed, None, &self.config)
    }

    pub fn play_episodes(&mut self, count: usize) -> Result<Vec<EpisodeSummary>> {
        (0..count as u64).map(|i| self.play_episode(i)).collect()
    }
}

/// Win counts over a batch of episodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub wins: TeamMap<u32>,
    pub timeouts: u32,
}

impl MatchRecord {
    pub fn tally(summaries: &[EpisodeSummary]) -> Self {
        let mut record = Self::default();
        for summary in summaries {
            match summary.winner {
                Some(team) => record.wins[team] += 1,
                None => record.timeouts += 1,
            }
        }
        record
    }

    pub fn games(&self) -> u32 {
        self.wins.blue + self.wins.red + self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArenaConfig;
    use crate::policy::{shared_policy, ConstantPolicy, RandomPolicy};

    fn short_engine() -> ArenaEngine {
        ArenaEngine::new(ArenaConfig::default().with_max_steps(30)).unwrap()
    }

    #[test]
    fn test_idle_episode_times_out() {
        let mut engine = short_engine();
        let policies = shared_policy(ConstantPolicy::default());

        let summary = run_episode(&mut engine, &policies, 1, None, &RolloutConfig::default()).unwrap();
        assert_eq!(summary.steps, 30);
        assert!(summary.timed_out());
        assert_eq!(summary.transitions.len(), 30 * 4);
        assert!(summary.transitions.last().unwrap().done);
        assert_eq!(summary.agent_transitions(AgentId::RED_1).count(), 30);
    }

    #[test]
    fn test_returns_match_transitions() {
        let mut engine = ArenaEngine::new(
            ArenaConfig::default()
                .with_max_steps(50)
                .with_reward_profile("micromanager"),
        )
        .unwrap();
        let policies = shared_policy(RandomPolicy);

        let summary = run_episode(&mut engine, &policies, 9, None, &RolloutConfig::default()).unwrap();
        for agent in AgentId::all() {
            let sum: f64 = summary.agent_transitions(agent).map(|t| t.reward).sum();
            assert!((sum - summary.returns[agent]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_worker_seeds_are_sequential() {
        let policies = shared_policy(RandomPolicy);
        let config = RolloutConfig::new().with_transitions(false).with_seed_offset(100);
        let mut worker = RolloutWorker::new(short_engine(), policies, config);

        let summaries = worker.play_episodes(3).unwrap();
        let seeds: Vec<_> = summaries.iter().map(|s| s.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102]);
        assert!(summaries.iter().all(|s| s.transitions.is_empty()));

        let record = MatchRecord::tally(&summaries);
        assert_eq!(record.games(), 3);
    }
}
