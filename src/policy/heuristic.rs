//! Scripted agent that follows the shaping target.
//!
//! Reads the target back out of the observation with the same priority
//! the engine uses (carry home, chase the thief, recover, attack), steps
//! along the dominant axis and tackles anything in reach. A small jitter
//! occasionally takes the secondary axis so agents slide around walls.

use smallvec::SmallVec;

use crate::arena::{index, Observation};
use crate::core::{Action, AgentId, ArenaConfig, GameRng, Vec2};

use super::Policy;

/// Relative offsets below this (in grid units) count as "arrived".
const ARRIVAL_EPSILON: f64 = 1e-3;

#[derive(Clone, Debug)]
pub struct HeuristicPolicy {
    grid_size: f64,
    tackle_range: f64,
    jitter: f64,
}

impl HeuristicPolicy {
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            grid_size: f64::from(config.grid_size),
            tackle_range: config.tackle_range,
            jitter: 0.1,
        }
    }

    /// Probability of moving along the secondary axis.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Offset to the current target in arena units.
    #[must_use]
    pub fn target_offset(&self, obs: &Observation) -> Vec2 {
        let normalized = if obs.flag_at(index::HAS_FLAG) {
            obs.vec_at(index::TO_OWN_BASE)
        } else if let Some(thief) = [index::NEAREST_ENEMY, index::FARTHEST_ENEMY]
            .into_iter()
            .find(|&block| obs.flag_at(block + 2))
        {
            obs.vec_at(thief)
        } else if !obs.flag_at(index::OWN_FLAG_AT_BASE) {
            obs.vec_at(index::TO_OWN_FLAG)
        } else {
            obs.vec_at(index::TO_ENEMY_FLAG)
        };
        normalized.scale(self.grid_size)
    }

    fn should_tackle(&self, obs: &Observation) -> bool {
        let ready = obs[index::COOLDOWN] <= 0.0;
        let enemy = index::NEAREST_ENEMY;
        let in_reach = obs.vec_at(enemy).scale(self.grid_size).length() <= self.tackle_range;
        ready && in_reach && !obs.flag_at(enemy + 3)
    }

    /// Movement actions toward `offset`, dominant axis first.
    fn moves_toward(offset: Vec2) -> SmallVec<[Action; 2]> {
        let horizontal = if offset.x > 0.0 { Action::Right } else { Action::Left };
        let vertical = if offset.y > 0.0 { Action::Up } else { Action::Down };
        let dx = offset.x.abs();
        let dy = offset.y.abs();

        let mut moves = SmallVec::new();
        match (dx > ARRIVAL_EPSILON, dy > ARRIVAL_EPSILON) {
            (false, false) => moves.push(Action::Stay),
            (true, false) => moves.push(horizontal),
            (false, true) => moves.push(vertical),
            (true, true) if dx >= dy => moves.extend([horizontal, vertical]),
            (true, true) => moves.extend([vertical, horizontal]),
        }
        moves
    }
}

impl Policy for HeuristicPolicy {
    fn act(&self, _agent: AgentId, obs: &Observation, rng: &mut GameRng) -> Action {
        if obs.flag_at(index::STUNNED) {
            return Action::Stay;
        }
        if self.should_tackle(obs) {
            return Action::Tackle;
        }

        let moves = Self::moves_toward(self.target_offset(obs));
        if moves.len() > 1 && rng.gen_bool(self.jitter) {
            moves[1]
        } else {
            moves[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::build_observation;
    use crate::core::{AgentMap, Team, WorldState};
    use crate::rewards::select_target;

    fn world(config: &ArenaConfig) -> WorldState {
        let positions = AgentMap::new(|a| match a {
            AgentId::BLUE_0 => Vec2::new(6.0, 15.0),
            AgentId::BLUE_1 => Vec2::new(3.0, 3.0),
            AgentId::RED_0 => Vec2::new(16.0, 8.0),
            _ => Vec2::new(20.0, 20.0),
        });
        WorldState::new(&positions, &config.flag_spawns)
    }

    fn assert_matches_engine_target(world: &WorldState, config: &ArenaConfig, agent: AgentId) {
        let policy = HeuristicPolicy::new(config);
        let obs = build_observation(world, config, agent);
        let expected = select_target(world, config, agent).point - world.agent(agent).position;
        assert!(
            policy.target_offset(&obs).approx_eq(expected, 1e-4),
            "{agent}: {:?} vs {expected:?}",
            policy.target_offset(&obs)
        );
    }

    #[test]
    fn test_target_matches_engine_rule() {
        let config = ArenaConfig::default();
        let mut world = world(&config);

        for agent in AgentId::all() {
            assert_matches_engine_target(&world, &config, agent);
        }

        // Red carries the blue flag.
        world.agents[AgentId::RED_0].has_flag = true;
        world.flags[Team::Blue].pick_up(AgentId::RED_0);
        for agent in AgentId::all() {
            assert_matches_engine_target(&world, &config, agent);
        }

        // Dropped in the field.
        world.agents[AgentId::RED_0].has_flag = false;
        world.flags[Team::Blue].drop_at(Vec2::new(9.0, 9.0));
        for agent in AgentId::all() {
            assert_matches_engine_target(&world, &config, agent);
        }
    }

    #[test]
    fn test_moves_along_dominant_axis() {
        let config = ArenaConfig::default();
        let world = world(&config);
        let policy = HeuristicPolicy::new(&config).with_jitter(0.0);
        let mut rng = GameRng::new(0);

        // blue_0 at (6, 15) heads for the red flag at (22, 12).
        let obs = build_observation(&world, &config, AgentId::BLUE_0);
        assert_eq!(policy.act(AgentId::BLUE_0, &obs, &mut rng), Action::Right);

        // Full jitter always takes the secondary axis.
        let policy = policy.with_jitter(1.0);
        assert_eq!(policy.act(AgentId::BLUE_0, &obs, &mut rng), Action::Down);
    }

    #[test]
    fn test_tackles_adjacent_enemy() {
        let config = ArenaConfig::default();
        let mut world = world(&config);
        world.agents[AgentId::RED_0].position = Vec2::new(7.0, 15.0);
        let policy = HeuristicPolicy::new(&config);
        let mut rng = GameRng::new(0);

        let obs = build_observation(&world, &config, AgentId::BLUE_0);
        assert_eq!(policy.act(AgentId::BLUE_0, &obs, &mut rng), Action::Tackle);

        // Not while on cooldown.
        world.agents[AgentId::BLUE_0].tackle_cooldown = 5;
        let obs = build_observation(&world, &config, AgentId::BLUE_0);
        assert_ne!(policy.act(AgentId::BLUE_0, &obs, &mut rng), Action::Tackle);
    }

    #[test]
    fn test_arrived_stays() {
        assert_eq!(
            HeuristicPolicy::moves_toward(Vec2::ZERO).as_slice(),
            &[Action::Stay]
        );
    }
}
