//! World state: agents, flags, scores and episode statistics.
//!
//! ## Flag invariant
//!
//! A flag is either resting at its spawn (`at_base`, uncarried) or away
//! from base (`!at_base`), on the ground or carried by exactly one agent.
//! All flag transitions go through `Flag::pick_up`, `Flag::drop_at` and
//! `Flag::reset`, each of which leaves the flag in a valid combination.

use serde::{Deserialize, Serialize};

use super::geometry::Vec2;
use super::team::{AgentId, AgentMap, Team, TeamMap};

/// Mutable per-agent state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec2,
    pub has_flag: bool,
    pub is_stunned: bool,
    /// Ticks of stun remaining.
    pub stun_timer: u32,
    /// Ticks until the agent may tackle again.
    pub tackle_cooldown: u32,
}

impl Agent {
    /// A fresh agent at `position`.
    #[must_use]
    pub fn new(id: AgentId, position: Vec2) -> Self {
        Self {
            id,
            position,
            has_flag: false,
            is_stunned: false,
            stun_timer: 0,
            tackle_cooldown: 0,
        }
    }

    #[must_use]
    pub fn team(&self) -> Team {
        self.id.team
    }

    /// Stun for `duration` ticks.
    pub fn stun(&mut self, duration: u32) {
        self.is_stunned = true;
        self.stun_timer = duration;
    }

    /// Advance the stun timer and tackle cooldown by one tick.
    ///
    /// The stun clears once the timer reads zero, including a zero-length
    /// stun applied on the previous tick.
    pub fn tick_timers(&mut self) {
        self.stun_timer = self.stun_timer.saturating_sub(1);
        if self.stun_timer == 0 {
            self.is_stunned = false;
        }
        self.tackle_cooldown = self.tackle_cooldown.saturating_sub(1);
    }
}

/// A team's own flag, which the opponents try to capture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub position: Vec2,
    pub carried_by: Option<AgentId>,
    pub at_base: bool,
}

impl Flag {
    /// A flag resting at `spawn`.
    #[must_use]
    pub fn at_spawn(spawn: Vec2) -> Self {
        Self {
            position: spawn,
            carried_by: None,
            at_base: true,
        }
    }

    /// Uncarried and away from base.
    #[must_use]
    pub fn is_on_ground(&self) -> bool {
        !self.at_base && self.carried_by.is_none()
    }

    /// True if `(carried_by, at_base)` is a legal combination.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !(self.at_base && self.carried_by.is_some())
    }

    pub fn pick_up(&mut self, carrier: AgentId) {
        self.carried_by = Some(carrier);
        self.at_base = false;
    }

    /// Leave the flag on the ground at `position`.
    pub fn drop_at(&mut self, position: Vec2) {
        self.position = position;
        self.carried_by = None;
        self.at_base = false;
    }

    /// Return the flag to its spawn point.
    pub fn reset(&mut self, spawn: Vec2) {
        *self = Flag::at_spawn(spawn);
    }
}

/// Cumulative per-episode counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub captures: TeamMap<u32>,
    /// Tackles that knocked a flag loose.
    pub stuns: TeamMap<u32>,
    pub flag_pickups: TeamMap<u32>,
    /// Carrier reached its base while its own flag was away.
    pub failed_captures: TeamMap<u32>,
    pub total_steps: u32,
}

/// The aggregate world owned by one engine instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub agents: AgentMap<Agent>,
    /// Indexed by the team that owns (defends) the flag.
    pub flags: TeamMap<Flag>,
    pub scores: TeamMap<u32>,
    pub current_step: u32,
    pub stats: EpisodeStats,
}

impl WorldState {
    /// A fresh world with agents at `positions` and flags at `spawns`.
    #[must_use]
    pub fn new(positions: &AgentMap<Vec2>, spawns: &TeamMap<Vec2>) -> Self {
        Self {
            agents: positions.map(|id, &pos| Agent::new(id, pos)),
            flags: TeamMap::new(|team| Flag::at_spawn(spawns[team])),
            scores: TeamMap::default(),
            current_step: 0,
            stats: EpisodeStats::default(),
        }
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id]
    }

    /// The flag `team` is trying to capture.
    #[must_use]
    pub fn enemy_flag(&self, team: Team) -> &Flag {
        &self.flags[team.opponent()]
    }

    /// The opponent currently carrying `team`'s own flag, if any.
    #[must_use]
    pub fn own_flag_carrier(&self, team: Team) -> Option<AgentId> {
        self.flags[team].carried_by
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers() {
        let mut agent = Agent::new(AgentId::BLUE_0, Vec2::new(1.0, 1.0));
        agent.stun(2);
        agent.tackle_cooldown = 1;

        agent.tick_timers();
        assert!(agent.is_stunned);
        assert_eq!(agent.stun_timer, 1);
        assert_eq!(agent.tackle_cooldown, 0);

        agent.tick_timers();
        assert!(!agent.is_stunned);
        assert_eq!(agent.stun_timer, 0);
        assert_eq!(agent.tackle_cooldown, 0);
    }

    #[test]
    fn test_zero_length_stun_clears_next_tick() {
        let mut agent = Agent::new(AgentId::RED_0, Vec2::new(1.0, 1.0));
        agent.stun(0);
        assert!(agent.is_stunned);

        agent.tick_timers();
        assert!(!agent.is_stunned);
        assert_eq!(agent.stun_timer, 0);
    }

    #[test]
    fn test_flag_transitions_stay_consistent() {
        let spawn = Vec2::new(22.0, 12.0);
        let mut flag = Flag::at_spawn(spawn);
        assert!(flag.is_consistent() && flag.at_base);

        flag.pick_up(AgentId::BLUE_1);
        assert!(flag.is_consistent());
        assert!(!flag.at_base);
        assert!(!flag.is_on_ground());

        flag.drop_at(Vec2::new(18.0, 12.0));
        assert!(flag.is_consistent());
        assert!(flag.is_on_ground());

        flag.reset(spawn);
        assert_eq!(flag, Flag::at_spawn(spawn));
    }

    #[test]
    fn test_world_new() {
        let positions = AgentMap::new(|a| Vec2::new(a.index() as f64, 1.0));
        let spawns = TeamMap::from_pair(Vec2::new(2.0, 12.0), Vec2::new(22.0, 12.0));
        let world = WorldState::new(&positions, &spawns);

        assert_eq!(world.agent(AgentId::RED_0).position, Vec2::new(2.0, 1.0));
        assert_eq!(world.enemy_flag(Team::Blue).position, Vec2::new(22.0, 12.0));
        assert_eq!(world.own_flag_carrier(Team::Red), None);
        assert_eq!(world.scores, TeamMap::default());
    }
}
