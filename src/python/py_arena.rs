//! Arena bindings for Python, shaped like a PettingZoo parallel env.

use std::collections::HashMap;

use numpy::PyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rustc_hash::FxHashMap;

use crate::arena::{ArenaEngine, Observation, StepInfo, OBS_DIM};
use crate::core::{AgentId, AgentMap, ArenaConfig, ConfigOverrides, ACTION_COUNT};

/// Python wrapper for the arena engine.
#[pyclass(name = "CaptureTheFlag")]
pub struct PyCaptureTheFlag {
    engine: ArenaEngine,
}

fn observations_dict<'py>(
    py: Python<'py>,
    observations: &AgentMap<Observation>,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for (agent, obs) in observations.iter() {
        dict.set_item(agent.to_string(), PyArray1::from_slice_bound(py, obs.as_slice()))?;
    }
    Ok(dict)
}

fn infos_dict<'py>(py: Python<'py>, infos: &AgentMap<StepInfo>) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for (agent, info) in infos.iter() {
        let entry = PyDict::new_bound(py);
        if let Some(scores) = info.scores {
            let by_team = PyDict::new_bound(py);
            for (team, score) in scores.iter() {
                by_team.set_item(team.name(), *score)?;
            }
            entry.set_item("scores", by_team)?;
        }
        dict.set_item(agent.to_string(), entry)?;
    }
    Ok(dict)
}

fn per_agent_dict<'py, T: ToPyObject>(py: Python<'py>, values: &AgentMap<T>) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for (agent, value) in values.iter() {
        dict.set_item(agent.to_string(), value)?;
    }
    Ok(dict)
}

#[pymethods]
impl PyCaptureTheFlag {
    /// Create an arena.
    ///
    /// # Arguments
    /// - reward_profile: "sparse", "micromanager" or "balanced"
    /// - grid_size, max_steps, win_score: override the base configuration
    /// - config_json: optional JSON document used as the base configuration;
    ///   keyword arguments that are given take precedence over it
    #[new]
    #[pyo3(signature = (
        reward_profile = None,
        grid_size = None,
        max_steps = None,
        win_score = None,
        config_json = None
    ))]
    fn new(
        reward_profile: Option<String>,
        grid_size: Option<u32>,
        max_steps: Option<u32>,
        win_score: Option<u32>,
        config_json: Option<&str>,
    ) -> PyResult<Self> {
        let base = match config_json {
            Some(json) => ArenaConfig::from_json(json)?,
            None => ArenaConfig::default(),
        };
        let config = base.with_overrides(&ConfigOverrides {
            grid_size,
            max_steps,
            win_score,
            reward_profile,
        });
        Ok(Self {
            engine: ArenaEngine::new(config)?,
        })
    }

    /// Agent names in processing order.
    #[getter]
    fn possible_agents(&self) -> Vec<String> {
        AgentId::all().map(|a| a.to_string()).collect()
    }

    #[getter]
    fn agents(&self) -> Vec<String> {
        if self.engine.is_running() {
            self.possible_agents()
        } else {
            Vec::new()
        }
    }

    #[getter]
    fn observation_size(&self) -> usize {
        OBS_DIM
    }

    #[getter]
    fn action_size(&self) -> usize {
        ACTION_COUNT
    }

    #[getter]
    fn current_step(&self) -> u32 {
        self.engine.world().current_step
    }

    /// (blue, red) scores.
    #[getter]
    fn scores(&self) -> (u32, u32) {
        let scores = self.engine.world().scores;
        (scores.blue, scores.red)
    }

    /// Start a new episode. Returns (observations, infos).
    #[pyo3(signature = (seed = None))]
    fn reset<'py>(
        &mut self,
        py: Python<'py>,
        seed: Option<u64>,
    ) -> PyResult<(Bound<'py, PyDict>, Bound<'py, PyDict>)> {
        let (observations, infos) = self.engine.reset(seed, None)?;
        Ok((observations_dict(py, &observations)?, infos_dict(py, &infos)?))
    }

    /// Advance one tick.
    ///
    /// Returns (observations, rewards, terminations, truncations, infos).
    #[allow(clippy::type_complexity)]
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        actions: HashMap<String, i64>,
    ) -> PyResult<(
        Bound<'py, PyDict>,
        Bound<'py, PyDict>,
        Bound<'py, PyDict>,
        Bound<'py, PyDict>,
        Bound<'py, PyDict>,
    )> {
        let mut raw = FxHashMap::default();
        for (name, value) in actions {
            let agent = AgentId::parse(&name)
                .ok_or_else(|| PyValueError::new_err(format!("unknown agent `{name}`")))?;
            raw.insert(agent, value);
        }

        let result = self.engine.step_raw(&raw)?;
        Ok((
            observations_dict(py, &result.observations)?,
            per_agent_dict(py, &result.rewards)?,
            per_agent_dict(py, &result.terminations)?,
            per_agent_dict(py, &result.truncations)?,
            infos_dict(py, &result.infos)?,
        ))
    }

    /// The previous episode's replay as JSON, if any.
    fn last_replay_json(&self) -> PyResult<Option<String>> {
        Ok(self.engine.last_replay().map(|r| r.to_json()).transpose()?)
    }

    /// The current episode's replay as JSON, if any.
    fn current_replay_json(&self) -> PyResult<Option<String>> {
        Ok(self.engine.current_replay().map(|r| r.to_json()).transpose()?)
    }

    fn __repr__(&self) -> String {
        let world = self.engine.world();
        format!(
            "CaptureTheFlag(profile={}, step={}, blue={}, red={})",
            self.engine.profile().name,
            world.current_step,
            world.scores.blue,
            world.scores.red
        )
    }
}
