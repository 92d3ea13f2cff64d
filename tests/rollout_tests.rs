//! Rollouts, batched pools and configuration loading.

use rust_ctf::core::{Action, ActionMap, AgentId, ArenaConfig, Team};
use rust_ctf::policy::{shared_policy, ConstantPolicy, HeuristicPolicy, Policy, PolicyMap, RandomPolicy};
use rust_ctf::training::{run_episode, ArenaPool, MatchRecord, RolloutConfig, RolloutWorker};
use rust_ctf::{ArenaEngine, ArenaError, AgentMap};

fn heuristic_vs_random(config: &ArenaConfig) -> PolicyMap {
    let heuristic = HeuristicPolicy::new(config);
    AgentMap::new(|agent| match agent.team {
        Team::Blue => Box::new(heuristic.clone()) as Box<dyn Policy>,
        Team::Red => Box::new(RandomPolicy) as Box<dyn Policy>,
    })
}

// =============================================================================
// Rollouts
// =============================================================================

#[test]
fn test_rollout_bookkeeping() {
    let config = ArenaConfig::default().with_max_steps(150);
    let policies = heuristic_vs_random(&config);
    let mut engine = ArenaEngine::new(config).unwrap();

    let summary = run_episode(&mut engine, &policies, 3, None, &RolloutConfig::new()).unwrap();

    assert!(summary.steps >= 1 && summary.steps <= 150);
    assert_eq!(summary.transitions.len(), summary.steps as usize * 4);
    assert_eq!(summary.stats.total_steps, summary.steps);
    assert_eq!(summary.scores, engine.world().scores);

    for agent in AgentId::all() {
        let transitions: Vec<_> = summary.agent_transitions(agent).collect();
        assert_eq!(transitions.len(), summary.steps as usize);

        let total: f64 = transitions.iter().map(|t| t.reward).sum();
        assert!((total - summary.returns[agent]).abs() < 1e-9);

        let (last, rest) = transitions.split_last().unwrap();
        assert!(last.done);
        assert!(rest.iter().all(|t| !t.done));
        assert_eq!(transitions[0].step, 1);
    }

    if summary.timed_out() {
        assert_eq!(summary.steps, 150);
    } else {
        assert_eq!(summary.scores[summary.winner.unwrap()], engine.config().win_score);
    }
}

#[test]
fn test_rollouts_are_reproducible() {
    let config = ArenaConfig::default().with_max_steps(120);
    let run = |seed| {
        let mut engine = ArenaEngine::new(config.clone()).unwrap();
        let policies = heuristic_vs_random(&config);
        run_episode(&mut engine, &policies, seed, None, &RolloutConfig::new()).unwrap()
    };

    let (a, b) = (run(21), run(21));
    assert_eq!(a.steps, b.steps);
    assert_eq!(a.returns, b.returns);
    let actions = |s: &rust_ctf::EpisodeSummary| s.transitions.iter().map(|t| t.action).collect::<Vec<_>>();
    assert_eq!(actions(&a), actions(&b));
}

#[test]
fn test_transitions_can_be_skipped() {
    let config = ArenaConfig::default().with_max_steps(30);
    let mut engine = ArenaEngine::new(config).unwrap();
    let policies = shared_policy(RandomPolicy);
    let rollout = RolloutConfig::new().with_transitions(false);

    let summary = run_episode(&mut engine, &policies, 0, None, &rollout).unwrap();
    assert!(summary.transitions.is_empty());
    assert_eq!(summary.steps, 30);
}

#[test]
fn test_idle_match_times_out() {
    let config = ArenaConfig::default().with_max_steps(40).with_reward_profile("sparse");
    let engine = ArenaEngine::new(config).unwrap();
    let mut worker = RolloutWorker::new(
        engine,
        shared_policy(ConstantPolicy(Action::Stay)),
        RolloutConfig::new().with_seed_offset(100),
    );

    let summaries = worker.play_episodes(3).unwrap();
    let seeds: Vec<_> = summaries.iter().map(|s| s.seed).collect();
    assert_eq!(seeds, vec![100, 101, 102]);
    assert!(summaries.iter().all(|s| s.timed_out() && s.steps == 40));
    assert!(summaries.iter().all(|s| s.team_return(Team::Blue) == 0.0));

    let record = MatchRecord::tally(&summaries);
    assert_eq!(record.timeouts, 3);
    assert_eq!(record.games(), 3);
    assert_eq!(worker.engine().last_replay().unwrap().metadata.seed, Some(101));
}

// =============================================================================
// Pool
// =============================================================================

#[test]
fn test_pool_steps_and_resets_finished() {
    let config = ArenaConfig::default().with_max_steps(3);
    let mut pool = ArenaPool::new(&config, 4, 50).unwrap();
    assert_eq!(pool.len(), 4);
    assert_eq!(pool.seed_for(2), 52);

    pool.reset_all().unwrap();
    let actions = vec![ActionMap::default(); 4];
    for _ in 0..3 {
        pool.step_all(&actions).unwrap();
    }
    assert!(pool.engines().all(ArenaEngine::is_finished));

    let reset = pool.reset_finished().unwrap();
    let indices: Vec<_> = reset.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert!(pool.engines().all(ArenaEngine::is_running));
    assert!(pool.engine(0).unwrap().last_replay().is_some());
}

#[test]
fn test_pool_rejects_wrong_batch() {
    let mut pool = ArenaPool::new(&ArenaConfig::default(), 2, 0).unwrap();
    pool.reset_all().unwrap();
    let err = pool.step_all(&[ActionMap::default()]).unwrap_err();
    assert!(matches!(err, ArenaError::BatchSizeMismatch { expected: 2, got: 1 }));
    assert_eq!(pool.engine(0).unwrap().world().current_step, 0);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_from_json_overrides_defaults() {
    let config = ArenaConfig::from_json(r#"{"max_steps": 50, "reward_profile": "sparse"}"#).unwrap();
    assert_eq!(config.max_steps, 50);
    assert_eq!(config.grid_size, ArenaConfig::default().grid_size);

    let engine = ArenaEngine::new(config.clone()).unwrap();
    assert_eq!(engine.profile().name, "sparse");

    let back = ArenaConfig::from_json(&config.to_json().unwrap()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_config_json_rejects_invalid() {
    assert!(ArenaConfig::from_json(r#"{"grid_size": 3}"#).is_err());
    assert!(ArenaConfig::from_json("not json").is_err());

    let config = ArenaConfig::from_json(r#"{"reward_profile": "aggressive"}"#).unwrap();
    assert!(matches!(
        ArenaEngine::new(config),
        Err(ArenaError::UnknownRewardProfile { .. })
    ));
}
