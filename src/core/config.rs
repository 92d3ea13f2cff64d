//! Arena configuration.
//!
//! `ArenaConfig::default()` is the standard 24x24 layout with eight walls,
//! a base on each side and flags at the base centres. Every field can be
//! overridden with a `with_*` builder or by loading a (partial) JSON
//! document; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Vec2};
use super::team::{Team, TeamMap};
use crate::error::{ArenaError, Result};

/// Smallest grid that leaves room for both spawn bands.
pub const MIN_GRID_SIZE: u32 = 10;

/// Complete arena configuration, immutable once an engine is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Side length of the square arena. Positions live in `[0, grid_size - 1]`.
    pub grid_size: u32,

    /// Tick at which the episode times out.
    pub max_steps: u32,

    /// Score that ends the episode.
    pub win_score: u32,

    /// Ticks a tackled agent stays stunned.
    pub stun_duration: u32,

    /// Ticks before an agent may tackle again.
    pub tackle_cooldown: u32,

    /// Maximum Euclidean tackle distance (inclusive).
    pub tackle_range: f64,

    /// Fractional speed reduction while carrying a flag.
    pub carrier_speed_penalty: f64,

    /// Distance moved per movement action.
    pub base_speed: f64,

    /// Flag pickup distance (exclusive).
    pub pickup_radius: f64,

    /// Own-flag return distance (exclusive).
    pub return_radius: f64,

    /// How far a dropped flag bounces away from its former carrier.
    pub bounce_distance: f64,

    /// Spawn attempts before falling back to the safe coordinate.
    pub spawn_retries: u32,

    /// Static obstacles.
    pub walls: Vec<Rect>,

    /// Scoring zone of each team.
    pub bases: TeamMap<Rect>,

    /// Resting position of each team's own flag.
    pub flag_spawns: TeamMap<Vec2>,

    /// Name of the reward profile resolved at engine construction.
    pub reward_profile: String,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            grid_size: 24,
            max_steps: 500,
            win_score: 3,
            stun_duration: 20,
            tackle_cooldown: 65,
            tackle_range: 2.0,
            carrier_speed_penalty: 0.3,
            base_speed: 0.4,
            pickup_radius: 2.0,
            return_radius: 2.0,
            bounce_distance: 2.0,
            spawn_retries: 100,
            walls: default_walls(),
            bases: TeamMap::from_pair(
                Rect::new(0.0, 4.0, 8.0, 16.0),
                Rect::new(20.0, 24.0, 8.0, 16.0),
            ),
            flag_spawns: TeamMap::from_pair(Vec2::new(2.0, 12.0), Vec2::new(22.0, 12.0)),
            reward_profile: "balanced".to_string(),
        }
    }
}

/// The standard wall layout: four centre pillars for cover and two
/// defensive walls in front of each base.
pub fn default_walls() -> Vec<Rect> {
    vec![
        Rect::new(10.0, 11.0, 10.0, 11.0),
        Rect::new(13.0, 14.0, 10.0, 11.0),
        Rect::new(10.0, 11.0, 13.0, 14.0),
        Rect::new(13.0, 14.0, 13.0, 14.0),
        Rect::new(5.0, 7.0, 4.0, 5.0),
        Rect::new(5.0, 7.0, 19.0, 20.0),
        Rect::new(17.0, 19.0, 4.0, 5.0),
        Rect::new(17.0, 19.0, 19.0, 20.0),
    ]
}

/// Field-level overrides layered onto a base configuration, e.g. keyword
/// arguments on top of a JSON document. `None` keeps the base value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub grid_size: Option<u32>,
    pub max_steps: Option<u32>,
    pub win_score: Option<u32>,
    pub reward_profile: Option<String>,
}

impl ArenaConfig {
    /// The standard configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ArenaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn with_win_score(mut self, win_score: u32) -> Self {
        self.win_score = win_score;
        self
    }

    #[must_use]
    pub fn with_stun_duration(mut self, ticks: u32) -> Self {
        self.stun_duration = ticks;
        self
    }

    #[must_use]
    pub fn with_tackle_cooldown(mut self, ticks: u32) -> Self {
        self.tackle_cooldown = ticks;
        self
    }

    #[must_use]
    pub fn with_tackle_range(mut self, range: f64) -> Self {
        self.tackle_range = range;
        self
    }

    #[must_use]
    pub fn with_carrier_speed_penalty(mut self, penalty: f64) -> Self {
        self.carrier_speed_penalty = penalty;
        self
    }

    #[must_use]
    pub fn with_walls(mut self, walls: Vec<Rect>) -> Self {
        self.walls = walls;
        self
    }

    #[must_use]
    pub fn with_reward_profile(mut self, name: impl Into<String>) -> Self {
        self.reward_profile = name.into();
        self
    }

    /// Apply every override that is set.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(grid_size) = overrides.grid_size {
            self = self.with_grid_size(grid_size);
        }
        if let Some(max_steps) = overrides.max_steps {
            self = self.with_max_steps(max_steps);
        }
        if let Some(win_score) = overrides.win_score {
            self = self.with_win_score(win_score);
        }
        if let Some(name) = &overrides.reward_profile {
            self = self.with_reward_profile(name.clone());
        }
        self
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ArenaError::InvalidConfig(msg));

        if self.grid_size < MIN_GRID_SIZE {
            return invalid(format!(
                "grid_size must be at least {MIN_GRID_SIZE}, got {}",
                self.grid_size
            ));
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be positive".into());
        }
        if self.win_score == 0 {
            return invalid("win_score must be positive".into());
        }
        if !(0.0..1.0).contains(&self.carrier_speed_penalty) {
            return invalid(format!(
                "carrier_speed_penalty must be in [0, 1), got {}",
                self.carrier_speed_penalty
            ));
        }
        for (name, value) in [
            ("tackle_range", self.tackle_range),
            ("base_speed", self.base_speed),
            ("pickup_radius", self.pickup_radius),
            ("return_radius", self.return_radius),
            ("bounce_distance", self.bounce_distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if let Some(wall) = self.walls.iter().find(|w| !w.is_valid()) {
            return invalid(format!("malformed wall {wall:?}"));
        }
        for (team, base) in self.bases.iter() {
            if !base.is_valid() {
                return invalid(format!("malformed {team} base {base:?}"));
            }
        }
        for (team, &spawn) in self.flag_spawns.iter() {
            if spawn.clamp_to(self.limit()) != spawn || self.is_in_wall(spawn) {
                return invalid(format!("{team} flag spawn {spawn:?} is out of bounds or in a wall"));
            }
            let fallback = self.fallback_spawn(team);
            if fallback.clamp_to(self.limit()) != fallback || self.is_in_wall(fallback) {
                return invalid(format!(
                    "{team} fallback spawn {fallback:?} is out of bounds or in a wall"
                ));
            }
        }
        Ok(())
    }

    /// Largest legal coordinate on either axis.
    #[must_use]
    pub fn limit(&self) -> f64 {
        f64::from(self.grid_size) - 1.0
    }

    #[must_use]
    pub fn is_in_wall(&self, p: Vec2) -> bool {
        self.walls.iter().any(|w| w.contains(p))
    }

    #[must_use]
    pub fn is_in_base(&self, p: Vec2, team: Team) -> bool {
        self.bases[team].contains(p)
    }

    /// Where a team delivers captured flags (its flag spawn).
    #[must_use]
    pub fn base_center(&self, team: Team) -> Vec2 {
        self.flag_spawns[team]
    }

    /// Half-open `x` interval a team's agents spawn in.
    #[must_use]
    pub fn spawn_band(&self, team: Team) -> (f64, f64) {
        let g = f64::from(self.grid_size);
        let half = g / 2.0;
        match team {
            Team::Blue => (1.0, half - 3.0),
            Team::Red => (half + 3.0, g - 1.0),
        }
    }

    /// Spawn used when random placement keeps hitting walls: the flag
    /// spawn shifted one unit toward the arena centre.
    #[must_use]
    pub fn fallback_spawn(&self, team: Team) -> Vec2 {
        let spawn = self.flag_spawns[team];
        let step = match team {
            Team::Blue => 1.0,
            Team::Red => -1.0,
        };
        Vec2::new(spawn.x + step, spawn.y)
    }
}
