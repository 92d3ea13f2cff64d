//! Python bindings for the capture-the-flag arena.
//!
//! # Quick Start
//!
//! ```python
//! import rust_ctf
//!
//! env = rust_ctf.CaptureTheFlag(reward_profile="micromanager")
//! obs, infos = env.reset(seed=42)
//!
//! while True:
//!     actions = {agent: 4 for agent in env.agents}
//!     obs, rewards, terms, truncs, infos = env.step(actions)
//!     if all(terms.values()):
//!         break
//!
//! replay = env.current_replay_json()
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::ArenaError;

mod py_arena;

pub use py_arena::*;

impl From<ArenaError> for PyErr {
    fn from(err: ArenaError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// rust-ctf: a 2v2 capture-the-flag arena for multi-agent RL.
#[pymodule]
fn rust_ctf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCaptureTheFlag>()?;
    Ok(())
}
