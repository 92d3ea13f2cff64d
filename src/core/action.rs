//! The six discrete agent actions.
//!
//! Actions arrive from a policy as raw integers; `Action::decode`
//! rejects anything outside `0..=5` instead of clamping, so a bug in the
//! driving policy surfaces immediately.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::geometry::Vec2;
use super::team::AgentId;
use crate::error::{ArenaError, Result};

/// Size of the discrete action space.
pub const ACTION_COUNT: usize = 6;

/// A discrete action for one agent for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// Move toward `+y`.
    Up = 0,
    /// Move toward `-y`.
    Down = 1,
    /// Move toward `-x`.
    Left = 2,
    /// Move toward `+x`.
    Right = 3,
    Stay = 4,
    /// Stun the first opponent in range and line of sight.
    Tackle = 5,
}

impl Action {
    /// All actions in index order.
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Stay,
        Action::Tackle,
    ];

    /// Raw action index.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit direction of a movement action, `None` for stay/tackle.
    #[must_use]
    pub const fn direction(self) -> Option<Vec2> {
        match self {
            Action::Up => Some(Vec2::new(0.0, 1.0)),
            Action::Down => Some(Vec2::new(0.0, -1.0)),
            Action::Left => Some(Vec2::new(-1.0, 0.0)),
            Action::Right => Some(Vec2::new(1.0, 0.0)),
            Action::Stay | Action::Tackle => None,
        }
    }

    /// Decode a raw action submitted for `agent`.
    pub fn decode(agent: AgentId, value: i64) -> Result<Action> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Action::ALL.get(i).copied())
            .ok_or(ArenaError::InvalidAction { agent, value })
    }
}

/// Actions submitted for one tick. Agents without an entry do nothing.
pub type ActionMap = FxHashMap<AgentId, Action>;

/// Decode a map of raw integer actions.
pub fn decode_actions(raw: &FxHashMap<AgentId, i64>) -> Result<ActionMap> {
    raw.iter()
        .map(|(&agent, &value)| Action::decode(agent, value).map(|a| (agent, a)))
        .collect()
}
