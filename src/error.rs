//! Error type shared by the whole crate.

use crate::core::AgentId;

/// Errors raised by the arena and its collaborators.
///
/// Geometric edge cases inside a tick are never errors: they resolve
/// through the flag spawn-reset fallback. Everything here is either a
/// configuration problem or a caller contract violation.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("unknown reward profile `{name}` (available: {available})")]
    UnknownRewardProfile { name: String, available: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid action {value} for {agent}: expected 0..=5")]
    InvalidAction { agent: AgentId, value: i64 },

    #[error("step called before reset")]
    NotReset,

    #[error("step called after the episode ended; call reset first")]
    EpisodeOver,

    #[error("invalid reset option: {0}")]
    InvalidResetOption(String),

    #[error("batch size mismatch: expected {expected} action maps, got {got}")]
    BatchSizeMismatch { expected: usize, got: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
