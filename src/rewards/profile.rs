//! Reward profiles: named, immutable tables of reward magnitudes.
//!
//! Three built-in profiles select a shaping philosophy:
//!
//! | profile        | philosophy                       |
//! |----------------|----------------------------------|
//! | `sparse`       | reward only final outcomes       |
//! | `micromanager` | reward almost every action       |
//! | `balanced`     | reward only critical milestones  |
//!
//! The profile is resolved once when an engine is built. The per-tick
//! path reads named fields, never string keys.

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};

/// Names accepted by `RewardProfile::by_name`.
pub const PROFILE_NAMES: [&str; 3] = ["sparse", "micromanager", "balanced"];

/// A reward-event key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardKey {
    Capture,
    Win,
    Lose,
    FlagPickup,
    FlagReturn,
    TackleAny,
    TackleFlagCarrier,
    DistanceToFlag,
    CarrierDistance,
    DistanceToCarrier,
    StepPenalty,
}

impl RewardKey {
    pub const ALL: [RewardKey; 11] = [
        RewardKey::Capture,
        RewardKey::Win,
        RewardKey::Lose,
        RewardKey::FlagPickup,
        RewardKey::FlagReturn,
        RewardKey::TackleAny,
        RewardKey::TackleFlagCarrier,
        RewardKey::DistanceToFlag,
        RewardKey::CarrierDistance,
        RewardKey::DistanceToCarrier,
        RewardKey::StepPenalty,
    ];
}

/// Reward magnitudes for every event.
///
/// `lose` is expected to be negative; `step_penalty` is added to every
/// agent every tick (negative for anti-idle profiles).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardProfile {
    pub name: String,
    pub capture: f64,
    pub win: f64,
    pub lose: f64,
    pub flag_pickup: f64,
    pub flag_return: f64,
    pub tackle_any: f64,
    pub tackle_flag_carrier: f64,
    pub distance_to_flag: f64,
    pub carrier_distance: f64,
    pub distance_to_carrier: f64,
    pub step_penalty: f64,
}

impl RewardProfile {
    /// Only captures and the final result count.
    pub fn sparse() -> Self {
        Self {
            name: "sparse".to_string(),
            capture: 100.0,
            win: 50.0,
            lose: -50.0,
            flag_pickup: 0.0,
            flag_return: 0.0,
            tackle_any: 0.0,
            tackle_flag_carrier: 0.0,
            distance_to_flag: 0.0,
            carrier_distance: 0.0,
            distance_to_carrier: 0.0,
            step_penalty: 0.0,
        }
    }

    /// Dense feedback for nearly everything, with an idle penalty.
    pub fn micromanager() -> Self {
        Self {
            name: "micromanager".to_string(),
            capture: 50.0,
            win: 20.0,
            lose: -20.0,
            flag_pickup: 10.0,
            flag_return: 5.0,
            tackle_any: 3.0,
            tackle_flag_carrier: 8.0,
            distance_to_flag: 0.2,
            carrier_distance: 0.3,
            distance_to_carrier: 0.15,
            step_penalty: -0.01,
        }
    }

    /// Selective rewards for the milestones that decide games.
    pub fn balanced() -> Self {
        Self {
            name: "balanced".to_string(),
            capture: 100.0,
            win: 30.0,
            lose: -30.0,
            flag_pickup: 0.0,
            flag_return: 5.0,
            tackle_any: 0.0,
            tackle_flag_carrier: 8.0,
            distance_to_flag: 0.0,
            carrier_distance: 0.1,
            distance_to_carrier: 0.0,
            step_penalty: 0.0,
        }
    }

    /// Resolve a built-in profile by name.
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "sparse" => Ok(Self::sparse()),
            "micromanager" => Ok(Self::micromanager()),
            "balanced" => Ok(Self::balanced()),
            _ => Err(ArenaError::UnknownRewardProfile {
                name: name.to_string(),
                available: PROFILE_NAMES.join(", "),
            }),
        }
    }

    /// Magnitude for `key`.
    #[must_use]
    pub fn get(&self, key: RewardKey) -> f64 {
        match key {
            RewardKey::Capture => self.capture,
            RewardKey::Win => self.win,
            RewardKey::Lose => self.lose,
            RewardKey::FlagPickup => self.flag_pickup,
            RewardKey::FlagReturn => self.flag_return,
            RewardKey::TackleAny => self.tackle_any,
            RewardKey::TackleFlagCarrier => self.tackle_flag_carrier,
            RewardKey::DistanceToFlag => self.distance_to_flag,
            RewardKey::CarrierDistance => self.carrier_distance,
            RewardKey::DistanceToCarrier => self.distance_to_carrier,
            RewardKey::StepPenalty => self.step_penalty,
        }
    }

    /// Copy of this profile with one magnitude replaced.
    #[must_use]
    pub fn with(mut self, key: RewardKey, value: f64) -> Self {
        let slot = match key {
            RewardKey::Capture => &mut self.capture,
            RewardKey::Win => &mut self.win,
            RewardKey::Lose => &mut self.lose,
            RewardKey::FlagPickup => &mut self.flag_pickup,
            RewardKey::FlagReturn => &mut self.flag_return,
            RewardKey::TackleAny => &mut self.tackle_any,
            RewardKey::TackleFlagCarrier => &mut self.tackle_flag_carrier,
            RewardKey::DistanceToFlag => &mut self.distance_to_flag,
            RewardKey::CarrierDistance => &mut self.carrier_distance,
            RewardKey::DistanceToCarrier => &mut self.distance_to_carrier,
            RewardKey::StepPenalty => &mut self.step_penalty,
        };
        *slot = value;
        self
    }

    /// Rename (for custom profiles derived from a built-in one).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for RewardProfile {
    fn default() -> Self {
        Self::balanced()
    }
}
