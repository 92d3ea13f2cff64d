//! Team and agent identification, plus per-agent / per-team storage.
//!
//! ## AgentId
//!
//! Four agents, two per team. The fixed enumeration order
//! `blue_0, blue_1, red_0, red_1` is load-bearing: every per-tick phase
//! processes agents in this order, so same-tick outcomes (a tackle landing
//! before the victim acts) are reproducible.
//!
//! ## AgentMap / TeamMap
//!
//! Fixed-size storage indexed by `AgentId` or `Team` with O(1) access.
//! Agent ids serialise as their names (`"red_1"`) and an `AgentMap` as an
//! object keyed by those names, so replays stay readable outside Rust.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Number of agents on each team.
pub const AGENTS_PER_TEAM: usize = 2;

/// Total number of agents in the arena.
pub const AGENT_COUNT: usize = 2 * AGENTS_PER_TEAM;

/// One of the two teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    /// Both teams in enumeration order.
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }

    /// Index into per-team storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Team::Blue => 0,
            Team::Red => 1,
        }
    }

    /// Lowercase team name, as used in agent names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Red => "red",
        }
    }

    /// The agents of this team in slot order.
    pub fn agents(self) -> impl Iterator<Item = AgentId> {
        (0..AGENTS_PER_TEAM as u8).map(move |slot| AgentId::new(self, slot))
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Agent identifier: team membership plus slot within the team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AgentId {
    pub team: Team,
    pub slot: u8,
}

impl AgentId {
    pub const BLUE_0: AgentId = AgentId::new(Team::Blue, 0);
    pub const BLUE_1: AgentId = AgentId::new(Team::Blue, 1);
    pub const RED_0: AgentId = AgentId::new(Team::Red, 0);
    pub const RED_1: AgentId = AgentId::new(Team::Red, 1);

    /// All agents in processing order.
    pub const ALL: [AgentId; AGENT_COUNT] = [Self::BLUE_0, Self::BLUE_1, Self::RED_0, Self::RED_1];

    /// Create an agent ID.
    #[must_use]
    pub const fn new(team: Team, slot: u8) -> Self {
        Self { team, slot }
    }

    /// Position in the enumeration order (0..4).
    #[must_use]
    pub const fn index(self) -> usize {
        self.team.index() * AGENTS_PER_TEAM + self.slot as usize
    }

    /// The other agent on the same team.
    #[must_use]
    pub const fn teammate(self) -> AgentId {
        AgentId::new(self.team, 1 - self.slot)
    }

    /// Iterate over all agents in processing order.
    pub fn all() -> impl Iterator<Item = AgentId> {
        Self::ALL.into_iter()
    }

    /// Parse a name like `"red_1"`.
    #[must_use]
    pub fn parse(name: &str) -> Option<AgentId> {
        let (team, slot) = name.split_once('_')?;
        let team = match team {
            "blue" => Team::Blue,
            "red" => Team::Red,
            _ => return None,
        };
        let slot: u8 = slot.parse().ok()?;
        ((slot as usize) < AGENTS_PER_TEAM).then(|| AgentId::new(team, slot))
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.team, self.slot)
    }
}

impl From<AgentId> for String {
    fn from(agent: AgentId) -> Self {
        agent.to_string()
    }
}

impl TryFrom<String> for AgentId {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        AgentId::parse(&name).ok_or_else(|| format!("unknown agent `{name}`"))
    }
}

/// Per-agent storage with O(1) access, ordered like `AgentId::ALL`.
///
/// ```
/// use rust_ctf::core::{AgentId, AgentMap};
///
/// let mut returns: AgentMap<f64> = AgentMap::with_value(0.0);
/// returns[AgentId::RED_1] += 2.5;
/// assert_eq!(returns[AgentId::RED_1], 2.5);
/// assert_eq!(returns[AgentId::BLUE_0], 0.0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AgentMap<T> {
    data: [T; AGENT_COUNT],
}

impl<T> AgentMap<T> {
    /// Create with values from a factory function.
    pub fn new(factory: impl Fn(AgentId) -> T) -> Self {
        Self {
            data: AgentId::ALL.map(factory),
        }
    }

    /// Create with all entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Create with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Iterate over (AgentId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &T)> {
        AgentId::ALL.into_iter().zip(self.data.iter())
    }

    /// Iterate over (AgentId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AgentId, &mut T)> {
        AgentId::ALL.into_iter().zip(self.data.iter_mut())
    }

    /// Iterate over the values in agent order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Map every entry into a new `AgentMap`.
    pub fn map<U>(&self, f: impl Fn(AgentId, &T) -> U) -> AgentMap<U> {
        AgentMap::new(|id| f(id, &self.data[id.index()]))
    }
}

impl<T: Default> Default for AgentMap<T> {
    fn default() -> Self {
        Self::with_default()
    }
}

impl<T> Index<AgentId> for AgentMap<T> {
    type Output = T;

    fn index(&self, agent: AgentId) -> &Self::Output {
        &self.data[agent.index()]
    }
}

impl<T> IndexMut<AgentId> for AgentMap<T> {
    fn index_mut(&mut self, agent: AgentId) -> &mut Self::Output {
        &mut self.data[agent.index()]
    }
}

impl<T: Serialize> Serialize for AgentMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(AGENT_COUNT))?;
        for (agent, value) in self.iter() {
            map.serialize_entry(&agent, value)?;
        }
        map.end()
    }
}

struct AgentMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for AgentMapVisitor<T> {
    type Value = AgentMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with one entry per agent")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut slots: [Option<T>; AGENT_COUNT] = std::array::from_fn(|_| None);
        while let Some((agent, value)) = access.next_entry::<AgentId, T>()? {
            if slots[agent.index()].replace(value).is_some() {
                return Err(de::Error::custom(format_args!("duplicate agent `{agent}`")));
            }
        }

        let values = slots
            .into_iter()
            .zip(AgentId::ALL)
            .map(|(slot, agent)| {
                slot.ok_or_else(|| de::Error::custom(format_args!("missing agent `{agent}`")))
            })
            .collect::<Result<Vec<T>, A::Error>>()?;
        let data = values
            .try_into()
            .map_err(|_| <A::Error as de::Error>::invalid_length(AGENT_COUNT, &self))?;
        Ok(AgentMap { data })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for AgentMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AgentMapVisitor(PhantomData))
    }
}

/// Per-team storage, blue first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamMap<T> {
    pub blue: T,
    pub red: T,
}

impl<T> TeamMap<T> {
    /// Create from explicit blue/red values.
    pub const fn from_pair(blue: T, red: T) -> Self {
        Self { blue, red }
    }

    /// Create with values from a factory function.
    pub fn new(factory: impl Fn(Team) -> T) -> Self {
        Self {
            blue: factory(Team::Blue),
            red: factory(Team::Red),
        }
    }

    /// Iterate over (Team, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Team, &T)> {
        [(Team::Blue, &self.blue), (Team::Red, &self.red)].into_iter()
    }
}

impl<T> Index<Team> for TeamMap<T> {
    type Output = T;

    fn index(&self, team: Team) -> &Self::Output {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }
}

impl<T> IndexMut<Team> for TeamMap<T> {
    fn index_mut(&mut self, team: Team) -> &mut Self::Output {
        match team {
            Team::Blue => &mut self.blue,
            Team::Red => &mut self.red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_order() {
        let names: Vec<String> = AgentId::all().map(|a| a.to_string()).collect();
        assert_eq!(names, vec!["blue_0", "blue_1", "red_0", "red_1"]);

        for (i, agent) in AgentId::all().enumerate() {
            assert_eq!(agent.index(), i);
        }
    }

    #[test]
    fn test_team_helpers() {
        assert_eq!(Team::Blue.opponent(), Team::Red);
        assert_eq!(Team::Red.opponent(), Team::Blue);

        let red: Vec<_> = Team::Red.agents().collect();
        assert_eq!(red, vec![AgentId::RED_0, AgentId::RED_1]);
    }

    #[test]
    fn test_teammate() {
        assert_eq!(AgentId::BLUE_0.teammate(), AgentId::BLUE_1);
        assert_eq!(AgentId::RED_1.teammate(), AgentId::RED_0);
    }

    #[test]
    fn test_parse() {
        assert_eq!(AgentId::parse("blue_1"), Some(AgentId::BLUE_1));
        assert_eq!(AgentId::parse("red_0"), Some(AgentId::RED_0));
        assert_eq!(AgentId::parse("red_2"), None);
        assert_eq!(AgentId::parse("green_0"), None);
        assert_eq!(AgentId::parse("blue"), None);
    }

    #[test]
    fn test_agent_map_new() {
        let map: AgentMap<usize> = AgentMap::new(|a| a.index() * 10);

        assert_eq!(map[AgentId::BLUE_0], 0);
        assert_eq!(map[AgentId::BLUE_1], 10);
        assert_eq!(map[AgentId::RED_0], 20);
        assert_eq!(map[AgentId::RED_1], 30);
    }

    #[test]
    fn test_agent_map_mutation_and_iter() {
        let mut map: AgentMap<i32> = AgentMap::with_default();
        map[AgentId::RED_0] = 7;

        let pairs: Vec<_> = map.iter().map(|(a, v)| (a, *v)).collect();
        assert_eq!(pairs[2], (AgentId::RED_0, 7));
        assert_eq!(pairs.len(), AGENT_COUNT);
    }

    #[test]
    fn test_team_map() {
        let mut scores: TeamMap<u32> = TeamMap::default();
        scores[Team::Red] += 2;
        assert_eq!(scores.red, 2);
        assert_eq!(scores[Team::Blue], 0);

        let names = TeamMap::new(|t| t.name());
        assert_eq!(names.blue, "blue");
    }

    #[test]
    fn test_serialization() {
        let map: AgentMap<u8> = AgentMap::new(|a| a.slot);
        let json = serde_json::to_string(&map).unwrap();
        let back: AgentMap<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);

        let team_json = serde_json::to_string(&Team::Blue).unwrap();
        assert_eq!(team_json, "\"blue\"");
    }

    #[test]
    fn test_agent_map_serializes_by_name() {
        let map: AgentMap<u8> = AgentMap::new(|a| a.index() as u8);
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(value["blue_0"], 0);
        assert_eq!(value["red_1"], 3);
        assert_eq!(value.as_object().unwrap().len(), AGENT_COUNT);

        let agent = serde_json::to_string(&AgentId::RED_0).unwrap();
        assert_eq!(agent, "\"red_0\"");
        assert_eq!(serde_json::from_str::<AgentId>(&agent).unwrap(), AgentId::RED_0);
        assert!(serde_json::from_str::<AgentId>("\"green_0\"").is_err());
    }

    #[test]
    fn test_agent_map_rejects_missing_or_unknown_agents() {
        let missing = r#"{"blue_0": 1, "blue_1": 2, "red_0": 3}"#;
        assert!(serde_json::from_str::<AgentMap<u8>>(missing).is_err());

        let unknown = r#"{"blue_0": 1, "blue_1": 2, "red_0": 3, "red_7": 4}"#;
        assert!(serde_json::from_str::<AgentMap<u8>>(unknown).is_err());

        let shuffled = r#"{"red_1": 4, "blue_0": 1, "red_0": 3, "blue_1": 2}"#;
        let map: AgentMap<u8> = serde_json::from_str(shuffled).unwrap();
        assert_eq!(map[AgentId::RED_1], 4);
        assert_eq!(map[AgentId::BLUE_0], 1);
    }
}
