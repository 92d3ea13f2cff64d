//! Data collection for learners.
//!
//! ## Overview
//!
//! - **run_episode**: plays one episode with a set of policies and returns
//!   per-agent transitions and returns
//! - **RolloutWorker**: repeated episodes on one engine
//! - **ArenaPool**: a batch of independent engines stepped in lock-step
//!
//! ## Usage
//!
//! ```rust
//! use rust_ctf::core::ArenaConfig;
//! use rust_ctf::arena::ArenaEngine;
//! use rust_ctf::policy::{shared_policy, HeuristicPolicy};
//! use rust_ctf::training::{run_episode, RolloutConfig};
//!
//! let config = ArenaConfig::default().with_max_steps(100);
//! let policies = shared_policy(HeuristicPolicy::new(&config));
//! let mut engine = ArenaEngine::new(config).unwrap();
//!
//! let summary = run_episode(&mut engine, &policies, 7, None, &RolloutConfig::default()).unwrap();
//! assert!(summary.steps <= 100);
//! ```

pub mod pool;
pub mod rollout;

pub use pool::ArenaPool;
pub use rollout::{run_episode, EpisodeSummary, MatchRecord, RolloutConfig, RolloutWorker, Transition};
