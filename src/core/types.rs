//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a live combatant within one battle.
///
/// Templates may share ids across rosters ("goblin" on both sides), so
/// instance ids are minted when a roster is copied into a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Instance id for the `index`-th member of `team`'s roster
    pub fn for_slot(team: Team, index: usize) -> Self {
        Self(format!("{}-{}", team.prefix(), index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Battle turn counter
pub type Turn = u32;

/// Side of the battle a character fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    #[default]
    Player,
    Enemy,
}

impl Team {
    pub fn opponent(self) -> Self {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Team::Player => "p",
            Team::Enemy => "e",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Player => f.write_str("player"),
            Team::Enemy => f.write_str("enemy"),
        }
    }
}

/// Base stats a character carries and status effects may modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    Speed,
    Strength,
    Intellect,
    Spirit,
}

impl Stat {
    pub fn label(self) -> &'static str {
        match self {
            Stat::Hp => "Health",
            Stat::Attack => "Attack",
            Stat::Defense => "Defense",
            Stat::Speed => "Speed",
            Stat::Strength => "Strength",
            Stat::Intellect => "Intellect",
            Stat::Spirit => "Spirit",
        }
    }
}

/// How an ability deals (or restores) its amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    #[default]
    Physical,
    Spell,
    Healing,
    Utility,
}

impl DamageType {
    /// Stat an ability of this type scales from when it names none
    pub fn default_scaling_stat(self) -> Option<Stat> {
        match self {
            DamageType::Physical => Some(Stat::Strength),
            DamageType::Spell => Some(Stat::Intellect),
            DamageType::Healing => Some(Stat::Spirit),
            DamageType::Utility => None,
        }
    }
}

/// Elemental affinity used by the type chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Nature,
    Light,
    Shadow,
    Arcane,
}
