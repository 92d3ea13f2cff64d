//! Role-dependent targets and distance shaping.
//!
//! Each agent has one target per tick, chosen in priority order:
//!
//! 1. carrying a flag: its own base
//! 2. own flag carried by an opponent: that carrier
//! 3. own flag on the ground: the flag
//! 4. otherwise: the opponent flag
//!
//! Shaping pays `(previous_distance - current_distance) * rate`, clamped
//! to `[-1, 1]`, and pays nothing on a tick where the target or the
//! carrying status changed.

use serde::{Deserialize, Serialize};

use crate::core::{AgentId, ArenaConfig, Vec2, WorldState};

use super::profile::RewardProfile;

/// Bound on the shaping reward of a single tick.
pub const SHAPING_CLAMP: f64 = 1.0;

/// A target whose anchor moved further than this (on either axis) within
/// one tick counts as a different target.
pub const TARGET_JUMP_TOLERANCE: f64 = 0.5;

/// What an agent is currently heading for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Deliver the carried flag home.
    OwnBase,
    /// Chase the opponent carrying our flag.
    Carrier(AgentId),
    /// Recover our flag from the ground.
    OwnFlag,
    /// Go on offense.
    EnemyFlag,
}

/// A target kind together with its current position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub point: Vec2,
}

impl Target {
    /// Same kind and an anchor that has not jumped.
    #[must_use]
    pub fn same_as(&self, other: &Target) -> bool {
        self.kind == other.kind && self.point.approx_eq(other.point, TARGET_JUMP_TOLERANCE)
    }
}

/// Apply the target-selection rule for `agent`.
#[must_use]
pub fn select_target(world: &WorldState, config: &ArenaConfig, agent: AgentId) -> Target {
    let state = world.agent(agent);
    let team = agent.team;
    let own_flag = &world.flags[team];

    if state.has_flag {
        return Target {
            kind: TargetKind::OwnBase,
            point: config.base_center(team),
        };
    }
    if let Some(carrier) = own_flag.carried_by {
        return Target {
            kind: TargetKind::Carrier(carrier),
            point: world.agent(carrier).position,
        };
    }
    if !own_flag.at_base {
        return Target {
            kind: TargetKind::OwnFlag,
            point: own_flag.position,
        };
    }
    Target {
        kind: TargetKind::EnemyFlag,
        point: world.enemy_flag(team).position,
    }
}

/// Pre-tick record used to score progress at the end of the tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    pub target: Target,
    pub distance: f64,
    pub had_flag: bool,
}

impl TargetSnapshot {
    #[must_use]
    pub fn capture(world: &WorldState, config: &ArenaConfig, agent: AgentId) -> Self {
        let target = select_target(world, config, agent);
        let state = world.agent(agent);
        Self {
            target,
            distance: state.position.distance(target.point),
            had_flag: state.has_flag,
        }
    }
}

/// Shaping reward for `agent` after all of this tick's resolution.
#[must_use]
pub fn shaping_reward(
    world: &WorldState,
    config: &ArenaConfig,
    profile: &RewardProfile,
    agent: AgentId,
    snapshot: &TargetSnapshot,
) -> f64 {
    let state = world.agent(agent);
    let current = select_target(world, config, agent);

    if !snapshot.target.same_as(&current) || snapshot.had_flag != state.has_flag {
        return 0.0;
    }

    let rate = if state.has_flag {
        profile.carrier_distance
    } else if world.own_flag_carrier(agent.team).is_some() {
        profile.distance_to_carrier
    } else {
        profile.distance_to_flag
    };

    let delta = snapshot.distance - state.position.distance(current.point);
    (delta * rate).clamp(-SHAPING_CLAMP, SHAPING_CLAMP)
}
