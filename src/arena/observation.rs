//! Per-agent observation encoding.
//!
//! Every agent sees a flat vector of `OBS_DIM` floats from its own
//! perspective. Positions are divided by the grid size; relative vectors
//! are `(target - self) / grid_size`.
//!
//! | offset | len | feature                                        |
//! |--------|-----|------------------------------------------------|
//! | 0      | 2   | own position                                   |
//! | 2      | 1   | has flag                                       |
//! | 3      | 1   | stunned                                        |
//! | 4      | 1   | tackle cooldown remaining / tackle cooldown    |
//! | 5      | 2   | to own base                                    |
//! | 7      | 2   | to enemy flag                                  |
//! | 9      | 2   | to own flag                                    |
//! | 11     | 4   | teammate: vector, has flag, stunned            |
//! | 15     | 8   | both enemies, nearest first, same 4 features   |
//! | 23     | 1   | enemy flag at base                             |
//! | 24     | 1   | own flag at base                               |
//! | 25     | 4   | distance to bottom, top, left, right edge      |
//! | 29     | 2   | own score, enemy score (over win score)        |

use serde::{Deserialize, Serialize};

use crate::core::{AgentId, ArenaConfig, Vec2, WorldState};

/// Length of every observation vector.
pub const OBS_DIM: usize = 31;

/// Feature offsets into an `Observation`.
pub mod index {
    pub const POSITION: usize = 0;
    pub const HAS_FLAG: usize = 2;
    pub const STUNNED: usize = 3;
    pub const COOLDOWN: usize = 4;
    pub const TO_OWN_BASE: usize = 5;
    pub const TO_ENEMY_FLAG: usize = 7;
    pub const TO_OWN_FLAG: usize = 9;
    pub const TEAMMATE: usize = 11;
    pub const NEAREST_ENEMY: usize = 15;
    pub const FARTHEST_ENEMY: usize = 19;
    pub const ENEMY_FLAG_AT_BASE: usize = 23;
    pub const OWN_FLAG_AT_BASE: usize = 24;
    pub const EDGE_DISTANCES: usize = 25;
    pub const SCORES: usize = 29;

    /// Features per observed agent (vector, has flag, stunned).
    pub const AGENT_BLOCK: usize = 4;
}

/// One agent's observation vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation(pub [f32; OBS_DIM]);

impl Observation {
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f32> {
        self.0.to_vec()
    }

    /// Two consecutive features as a vector, starting at `offset`.
    #[must_use]
    pub fn vec_at(&self, offset: usize) -> Vec2 {
        Vec2::new(f64::from(self.0[offset]), f64::from(self.0[offset + 1]))
    }

    /// A 0/1 feature read back as a boolean.
    #[must_use]
    pub fn flag_at(&self, offset: usize) -> bool {
        self.0[offset] > 0.5
    }
}

impl Default for Observation {
    fn default() -> Self {
        Observation([0.0; OBS_DIM])
    }
}

impl std::ops::Index<usize> for Observation {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.0[i]
    }
}

/// Sequential writer over a fixed observation buffer.
struct FeatureWriter {
    data: [f32; OBS_DIM],
    len: usize,
}

impl FeatureWriter {
    fn new() -> Self {
        Self {
            data: [0.0; OBS_DIM],
            len: 0,
        }
    }

    fn push(&mut self, value: f64) {
        self.data[self.len] = value as f32;
        self.len += 1;
    }

    fn push_bool(&mut self, value: bool) {
        self.push(if value { 1.0 } else { 0.0 });
    }

    fn push_vec(&mut self, v: Vec2) {
        self.push(v.x);
        self.push(v.y);
    }

    fn finish(self) -> Observation {
        debug_assert_eq!(self.len, OBS_DIM);
        Observation(self.data)
    }
}

/// Build the observation for `agent`.
#[must_use]
pub fn build_observation(world: &WorldState, config: &ArenaConfig, agent: AgentId) -> Observation {
    let g = f64::from(config.grid_size);
    let team = agent.team;
    let enemy = team.opponent();
    let me = world.agent(agent);
    let pos = me.position;
    let relative = |target: Vec2| (target - pos).scale(1.0 / g);

    let mut w = FeatureWriter::new();

    w.push_vec(pos.scale(1.0 / g));
    w.push_bool(me.has_flag);
    w.push_bool(me.is_stunned);
    w.push(if config.tackle_cooldown == 0 {
        0.0
    } else {
        f64::from(me.tackle_cooldown) / f64::from(config.tackle_cooldown)
    });

    w.push_vec(relative(config.base_center(team)));
    w.push_vec(relative(world.flags[enemy].position));
    w.push_vec(relative(world.flags[team].position));

    let mate = world.agent(agent.teammate());
    w.push_vec(relative(mate.position));
    w.push_bool(mate.has_flag);
    w.push_bool(mate.is_stunned);

    // Stable sort: equidistant enemies keep slot order.
    let mut enemies: Vec<_> = enemy.agents().map(|id| world.agent(id)).collect();
    enemies.sort_by(|a, b| pos.distance(a.position).total_cmp(&pos.distance(b.position)));
    for e in enemies {
        w.push_vec(relative(e.position));
        w.push_bool(e.has_flag);
        w.push_bool(e.is_stunned);
    }

    w.push_bool(world.flags[enemy].at_base);
    w.push_bool(world.flags[team].at_base);

    w.push(pos.y / g);
    w.push((g - pos.y) / g);
    w.push(pos.x / g);
    w.push((g - pos.x) / g);

    let win = f64::from(config.win_score);
    w.push(f64::from(world.scores[team]) / win);
    w.push(f64::from(world.scores[enemy]) / win);

    w.finish()
}
