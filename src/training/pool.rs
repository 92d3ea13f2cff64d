//! A batch of independent arenas for vectorised data collection.
//!
//! Instances share nothing: each owns its engine, world and spawn stream.
//! Instance `i` is seeded `base_seed + i` on `reset_all`.

use crate::arena::{ArenaEngine, Observation, StepResult};
use crate::core::{ActionMap, AgentMap, ArenaConfig};
use crate::error::{ArenaError, Result};
use crate::rewards::RewardProfile;

pub struct ArenaPool {
    engines: Vec<ArenaEngine>,
    base_seed: u64,
}

impl ArenaPool {
    /// `size` engines built from `config`.
    pub fn new(config: &ArenaConfig, size: usize, base_seed: u64) -> Result<Self> {
        let profile = RewardProfile::by_name(&config.reward_profile)?;
        Self::with_profile(config, &profile, size, base_seed)
    }

    pub fn with_profile(
        config: &ArenaConfig,
        profile: &RewardProfile,
        size: usize,
        base_seed: u64,
    ) -> Result<Self> {
        if size == 0 {
            return Err(ArenaError::InvalidConfig("pool size must be positive".into()));
        }
        let engines = (0..size)
            .map(|_| ArenaEngine::with_profile(config.clone(), profile.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { engines, base_seed })
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn engine(&self, index: usize) -> Option<&ArenaEngine> {
        self.engines.get(index)
    }

    pub fn engines(&self) -> impl Iterator<Item = &ArenaEngine> {
        self.engines.iter()
    }

    /// Seed of instance `index`.
    pub fn seed_for(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }

    /// Reset every instance with its own seed.
    pub fn reset_all(&mut self) -> Result<Vec<AgentMap<Observation>>> {
        let seeds: Vec<u64> = (0..self.engines.len()).map(|i| self.seed_for(i)).collect();
        self.engines
            .iter_mut()
            .zip(seeds)
            .map(|(engine, seed)| engine.reset(Some(seed), None).map(|(obs, _)| obs))
            .collect()
    }

    /// Step every instance with its own action map.
    pub fn step_all(&mut self, actions: &[ActionMap]) -> Result<Vec<StepResult>> {
        if actions.len() != self.engines.len() {
            return Err(ArenaError::BatchSizeMismatch {
                expected: self.engines.len(),
                got: actions.len(),
            });
        }
        self.engines
            .iter_mut()
            .zip(actions)
            .map(|(engine, actions)| engine.step(actions))
            .collect()
    }

    /// Start a new episode on every finished instance, continuing its
    /// spawn stream. Returns the reset indices and their observations.
    pub fn reset_finished(&mut self) -> Result<Vec<(usize, AgentMap<Observation>)>> {
        let mut reset = Vec::new();
        for (i, engine) in self.engines.iter_mut().enumerate() {
            if engine.is_finished() {
                let (obs, _) = engine.reset(None, None)?;
                reset.push((i, obs));
            }
        }
        Ok(reset)
    }
}
