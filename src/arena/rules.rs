//! Rule resolution for one tick: timers, movement, tackles, flag
//! lifecycle and termination.
//!
//! `Rules` borrows the immutable configuration and reward profile and
//! mutates a `WorldState`. It never touches randomness, so every
//! transition here is a pure function of the world and the actions.

use tracing::debug;

use crate::core::{segment_samples, Action, AgentId, AgentMap, ArenaConfig, Team, Vec2, WorldState};
use crate::rewards::RewardProfile;

/// How an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A team reached the win score.
    Win(Team),
    /// The step limit was reached first.
    Timeout,
}

impl Outcome {
    #[must_use]
    pub fn winner(self) -> Option<Team> {
        match self {
            Outcome::Win(team) => Some(team),
            Outcome::Timeout => None,
        }
    }
}

/// Where a forcibly released flag ended up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DropResult {
    /// Landed at the bounce point.
    Bounced(Vec2),
    /// Bounce point was walled; landed at the tackler/victim midpoint.
    Midpoint(Vec2),
    /// No safe ground position; the flag went back to its spawn.
    ResetToSpawn,
}

/// Rule resolver bound to one configuration and reward profile.
#[derive(Clone, Copy, Debug)]
pub struct Rules<'a> {
    pub config: &'a ArenaConfig,
    pub profile: &'a RewardProfile,
}

impl<'a> Rules<'a> {
    #[must_use]
    pub fn new(config: &'a ArenaConfig, profile: &'a RewardProfile) -> Self {
        Self { config, profile }
    }

    /// True if no wall lies on the open segment between `from` and `to`.
    #[must_use]
    pub fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        segment_samples(from, to).all(|p| !self.config.is_in_wall(p))
    }

    /// Decrement stun timers and tackle cooldowns for every agent.
    pub fn advance_timers(&self, world: &mut WorldState) {
        for (_, agent) in world.agents.iter_mut() {
            agent.tick_timers();
        }
    }

    /// Execute one agent's action and return the reward it earned.
    ///
    /// Stunned agents do nothing.
    pub fn execute_action(&self, world: &mut WorldState, agent: AgentId, action: Action) -> f64 {
        if world.agents[agent].is_stunned {
            return 0.0;
        }
        if action == Action::Tackle {
            return self.execute_tackle(world, agent);
        }

        if let Some(direction) = action.direction() {
            self.execute_move(world, agent, direction);
        }

        let state = &world.agents[agent];
        if state.has_flag {
            let position = state.position;
            world.flags[agent.team.opponent()].position = position;
        }
        0.0
    }

    /// Move one step along `direction`, or not at all if the step would
    /// end in or pass through a wall.
    fn execute_move(&self, world: &mut WorldState, agent: AgentId, direction: Vec2) {
        let state = &mut world.agents[agent];
        let mut speed = self.config.base_speed;
        if state.has_flag {
            speed *= 1.0 - self.config.carrier_speed_penalty;
        }

        let from = state.position;
        let to = (from + direction.scale(speed)).clamp_to(self.config.limit());

        if !self.config.is_in_wall(to) && self.has_line_of_sight(from, to) {
            state.position = to;
        }
    }

    /// Tackle the first opponent in range with a clear line of sight.
    ///
    /// The cooldown is spent whether or not anything is hit.
    fn execute_tackle(&self, world: &mut WorldState, agent: AgentId) -> f64 {
        if world.agents[agent].tackle_cooldown > 0 {
            return 0.0;
        }
        world.agents[agent].tackle_cooldown = self.config.tackle_cooldown;

        let tackler_pos = world.agents[agent].position;
        let victim = agent.team.opponent().agents().find(|&enemy| {
            let enemy_pos = world.agents[enemy].position;
            tackler_pos.distance(enemy_pos) <= self.config.tackle_range
                && self.has_line_of_sight(tackler_pos, enemy_pos)
        });
        let Some(victim) = victim else {
            return 0.0;
        };

        let victim_state = &mut world.agents[victim];
        victim_state.stun(self.config.stun_duration);

        if !victim_state.has_flag {
            debug!(%agent, %victim, "tackle");
            return self.profile.tackle_any;
        }

        victim_state.has_flag = false;
        let victim_pos = victim_state.position;
        let result = self.drop_flag(world, agent.team, tackler_pos, victim_pos);
        world.stats.stuns[agent.team] += 1;
        debug!(%agent, %victim, ?result, "tackled flag carrier");
        self.profile.tackle_flag_carrier
    }

    /// Release `flag_team`'s flag after its carrier was tackled.
    ///
    /// The flag bounces `bounce_distance` away from the tackler. A bounce
    /// into the capturing team's base resets the flag; a walled bounce
    /// falls back to the tackler/victim midpoint, then to the spawn.
    pub fn drop_flag(
        &self,
        world: &mut WorldState,
        flag_team: Team,
        tackler_pos: Vec2,
        victim_pos: Vec2,
    ) -> DropResult {
        let spawn = self.config.flag_spawns[flag_team];
        let capturing_team = flag_team.opponent();
        let flag = &mut world.flags[flag_team];

        let Some(direction) = (victim_pos - tackler_pos).normalized() else {
            flag.reset(spawn);
            return DropResult::ResetToSpawn;
        };

        let bounce = (victim_pos + direction.scale(self.config.bounce_distance))
            .clamp_to(self.config.limit());
        if self.config.is_in_base(bounce, capturing_team) {
            flag.reset(spawn);
            return DropResult::ResetToSpawn;
        }
        if !self.config.is_in_wall(bounce) {
            flag.drop_at(bounce);
            return DropResult::Bounced(bounce);
        }

        let midpoint = tackler_pos.lerp(victim_pos, 0.5);
        if !self.config.is_in_wall(midpoint) && !self.config.is_in_base(midpoint, capturing_team) {
            flag.drop_at(midpoint);
            return DropResult::Midpoint(midpoint);
        }

        flag.reset(spawn);
        DropResult::ResetToSpawn
    }

    /// Pickup, capture and return for every non-stunned agent, in
    /// enumeration order. Rewards are added into `rewards`.
    pub fn resolve_flags(&self, world: &mut WorldState, rewards: &mut AgentMap<f64>) {
        for agent in AgentId::all() {
            if world.agents[agent].is_stunned {
                continue;
            }
            rewards[agent] += self.try_pickup(world, agent);
            rewards[agent] += self.try_capture(world, agent);
            rewards[agent] += self.try_return(world, agent);
        }
    }

    fn try_pickup(&self, world: &mut WorldState, agent: AgentId) -> f64 {
        let team = agent.team;
        let position = world.agents[agent].position;
        let enemy_flag = &mut world.flags[team.opponent()];

        if world.agents[agent].has_flag
            || enemy_flag.carried_by.is_some()
            || position.distance(enemy_flag.position) >= self.config.pickup_radius
        {
            return 0.0;
        }

        enemy_flag.pick_up(agent);
        world.agents[agent].has_flag = true;
        world.stats.flag_pickups[team] += 1;
        debug!(%agent, "flag pickup");
        self.profile.flag_pickup
    }

    fn try_capture(&self, world: &mut WorldState, agent: AgentId) -> f64 {
        let team = agent.team;
        let state = &world.agents[agent];
        if !state.has_flag || !self.config.is_in_base(state.position, team) {
            return 0.0;
        }

        if !world.flags[team].at_base {
            world.stats.failed_captures[team] += 1;
            debug!(%agent, "capture refused: own flag away");
            return 0.0;
        }

        world.scores[team] += 1;
        world.stats.captures[team] += 1;
        world.agents[agent].has_flag = false;
        let enemy = team.opponent();
        world.flags[enemy].reset(self.config.flag_spawns[enemy]);
        debug!(%agent, score = world.scores[team], "capture");
        self.profile.capture
    }

    fn try_return(&self, world: &mut WorldState, agent: AgentId) -> f64 {
        let team = agent.team;
        let position = world.agents[agent].position;
        let own_flag = &mut world.flags[team];

        if !own_flag.is_on_ground() || position.distance(own_flag.position) >= self.config.return_radius {
            return 0.0;
        }

        own_flag.reset(self.config.flag_spawns[team]);
        debug!(%agent, "flag returned");
        self.profile.flag_return
    }

    /// Check win and timeout; a win takes precedence.
    #[must_use]
    pub fn check_termination(&self, world: &WorldState) -> Option<Outcome> {
        if let Some(team) = Team::ALL
            .into_iter()
            .find(|&team| world.scores[team] >= self.config.win_score)
        {
            return Some(Outcome::Win(team));
        }
        (world.current_step >= self.config.max_steps).then_some(Outcome::Timeout)
    }

    /// Add `WIN` / `LOSE` for a decided episode. A timeout pays nothing.
    pub fn apply_terminal_rewards(&self, outcome: Outcome, rewards: &mut AgentMap<f64>) {
        let Some(winner) = outcome.winner() else {
            return;
        };
        for agent in AgentId::all() {
            rewards[agent] += if agent.team == winner {
                self.profile.win
            } else {
                self.profile.lose
            };
        }
    }
}
