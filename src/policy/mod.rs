//! Policy sources: anything that turns an observation into an action.
//!
//! The engine has no opinion on where actions come from. Policies here
//! cover the scripted and random cases; a trained model plugs in through
//! the same trait (or drives the engine directly from Python).

pub mod heuristic;

pub use heuristic::HeuristicPolicy;

use crate::arena::Observation;
use crate::core::{Action, ActionMap, AgentId, AgentMap, GameRng, ACTION_COUNT};

/// Chooses one action for one agent per tick.
pub trait Policy: Send + Sync {
    fn act(&self, agent: AgentId, observation: &Observation, rng: &mut GameRng) -> Action;
}

/// Uniform over all six actions.
#[derive(Clone, Debug, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn act(&self, _agent: AgentId, _observation: &Observation, rng: &mut GameRng) -> Action {
        Action::ALL[rng.gen_range_usize(0..ACTION_COUNT)]
    }
}

/// Always the same action.
#[derive(Clone, Copy, Debug)]
pub struct ConstantPolicy(pub Action);

impl Default for ConstantPolicy {
    fn default() -> Self {
        ConstantPolicy(Action::Stay)
    }
}

impl Policy for ConstantPolicy {
    fn act(&self, _agent: AgentId, _observation: &Observation, _rng: &mut GameRng) -> Action {
        self.0
    }
}

/// One policy per agent.
pub type PolicyMap = AgentMap<Box<dyn Policy>>;

/// Every agent under the same policy.
pub fn shared_policy<P: Policy + Clone + 'static>(policy: P) -> PolicyMap {
    AgentMap::new(|_| Box::new(policy.clone()) as Box<dyn Policy>)
}

/// Ask every agent's policy for an action.
pub fn select_actions(
    policies: &PolicyMap,
    observations: &AgentMap<Observation>,
    rng: &mut GameRng,
) -> ActionMap {
    let mut actions = ActionMap::default();
    for agent in AgentId::all() {
        actions.insert(agent, policies[agent].act(agent, &observations[agent], rng));
    }
    actions
}
