//! Behavior identifiers
//!
//! Roster files name behaviors by string ("lowestHpEnemy", "regenerate").
//! Known names map to enum variants; anything else becomes `Custom` so that
//! game code can register its own behaviors under new names.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetingRule {
    #[default]
    RandomEnemy,
    LowestHpEnemy,
    HighestAttackEnemy,
    LowestHpAlly,
    RandomAlly,
    SelfOnly,
    AllEnemies,
    AllAllies,
    Custom(String),
}

impl TargetingRule {
    pub fn name(&self) -> &str {
        match self {
            TargetingRule::RandomEnemy => "randomEnemy",
            TargetingRule::LowestHpEnemy => "lowestHpEnemy",
            TargetingRule::HighestAttackEnemy => "highestAttackEnemy",
            TargetingRule::LowestHpAlly => "lowestHpAlly",
            TargetingRule::RandomAlly => "randomAlly",
            TargetingRule::SelfOnly => "self",
            TargetingRule::AllEnemies => "allEnemies",
            TargetingRule::AllAllies => "allAllies",
            TargetingRule::Custom(name) => name,
        }
    }
}

impl From<String> for TargetingRule {
    fn from(name: String) -> Self {
        match name.as_str() {
            "randomEnemy" => TargetingRule::RandomEnemy,
            "lowestHpEnemy" => TargetingRule::LowestHpEnemy,
            "highestAttackEnemy" => TargetingRule::HighestAttackEnemy,
            "lowestHpAlly" => TargetingRule::LowestHpAlly,
            "randomAlly" => TargetingRule::RandomAlly,
            "self" => TargetingRule::SelfOnly,
            "allEnemies" => TargetingRule::AllEnemies,
            "allAllies" => TargetingRule::AllAllies,
            _ => TargetingRule::Custom(name),
        }
    }
}

impl From<TargetingRule> for String {
    fn from(rule: TargetingRule) -> Self {
        rule.name().to_string()
    }
}

impl fmt::Display for TargetingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DecisionRule {
    #[default]
    Default,
    Aggressive,
    Support,
    Custom(String),
}

impl DecisionRule {
    pub fn name(&self) -> &str {
        match self {
            DecisionRule::Default => "default",
            DecisionRule::Aggressive => "aggressive",
            DecisionRule::Support => "support",
            DecisionRule::Custom(name) => name,
        }
    }
}

impl From<String> for DecisionRule {
    fn from(name: String) -> Self {
        match name.as_str() {
            "default" => DecisionRule::Default,
            "aggressive" => DecisionRule::Aggressive,
            "support" => DecisionRule::Support,
            _ => DecisionRule::Custom(name),
        }
    }
}

impl From<DecisionRule> for String {
    fn from(rule: DecisionRule) -> Self {
        rule.name().to_string()
    }
}

impl fmt::Display for DecisionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PassiveRule {
    Regenerate,
    ApplyStatus,
    Thorns,
    SecondWind,
    Custom(String),
}

impl PassiveRule {
    pub fn name(&self) -> &str {
        match self {
            PassiveRule::Regenerate => "regenerate",
            PassiveRule::ApplyStatus => "applyStatus",
            PassiveRule::Thorns => "thorns",
            PassiveRule::SecondWind => "secondWind",
            PassiveRule::Custom(name) => name,
        }
    }
}

impl From<String> for PassiveRule {
    fn from(name: String) -> Self {
        match name.as_str() {
            "regenerate" => PassiveRule::Regenerate,
            "applyStatus" => PassiveRule::ApplyStatus,
            "thorns" => PassiveRule::Thorns,
            "secondWind" => PassiveRule::SecondWind,
            _ => PassiveRule::Custom(name),
        }
    }
}

impl From<PassiveRule> for String {
    fn from(rule: PassiveRule) -> Self {
        rule.name().to_string()
    }
}

impl fmt::Display for PassiveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
