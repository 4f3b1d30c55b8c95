//! Active and passive abilities as they appear on roster templates

use serde::{Deserialize, Serialize};

use crate::battle::triggers::Trigger;
use crate::behavior::{PassiveRule, TargetingRule};
use crate::core::types::{DamageType, Element, Stat};

/// Coarse target hint an ability can declare instead of a full targeting rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    #[serde(rename = "Self")]
    SelfTarget,
    Ally,
    Enemy,
    AllEnemies,
    AllAllies,
}

impl TargetType {
    /// Named targeting behavior this hint maps to
    pub fn rule(self) -> TargetingRule {
        match self {
            TargetType::SelfTarget => TargetingRule::SelfOnly,
            TargetType::Ally => TargetingRule::LowestHpAlly,
            TargetType::Enemy => TargetingRule::RandomEnemy,
            TargetType::AllEnemies => TargetingRule::AllEnemies,
            TargetType::AllAllies => TargetingRule::AllAllies,
        }
    }
}

/// A status effect an ability leaves on its targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusApplication {
    pub status_id: String,
    /// Turns; falls back to the catalog default when absent
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default = "always")]
    pub chance: f64,
}

fn always() -> f64 {
    1.0
}

/// An ability a character can choose as its action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    /// Base amount; 0 for pure utility
    #[serde(default)]
    pub damage: u32,
    #[serde(default)]
    pub damage_type: DamageType,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub scaling_stat: Option<Stat>,
    #[serde(default)]
    pub scale_factor: Option<f64>,
    /// Cooldown set on use; `None` uses the configured default
    #[serde(default)]
    pub cooldown: Option<u32>,
    #[serde(default)]
    pub current_cooldown: u32,
    #[serde(default)]
    pub target_type: Option<TargetType>,
    #[serde(default)]
    pub targeting_logic: Option<TargetingRule>,
    #[serde(default)]
    pub is_healing: bool,
    #[serde(default)]
    pub is_aoe: bool,
    #[serde(default)]
    pub is_passive: bool,
    #[serde(default)]
    pub applies_status: Option<StatusApplication>,
}

impl Ability {
    pub fn new(name: impl Into<String>, damage: u32, damage_type: DamageType) -> Self {
        Self {
            name: name.into(),
            damage,
            damage_type,
            element: None,
            scaling_stat: None,
            scale_factor: None,
            cooldown: None,
            current_cooldown: 0,
            target_type: None,
            targeting_logic: None,
            is_healing: damage_type == DamageType::Healing,
            is_aoe: false,
            is_passive: false,
            applies_status: None,
        }
    }

    pub fn heals(&self) -> bool {
        self.is_healing || self.damage_type == DamageType::Healing
    }

    pub fn is_utility(&self) -> bool {
        self.damage_type == DamageType::Utility
    }

    /// Eligible for selection this turn
    pub fn is_ready(&self) -> bool {
        !self.is_passive && self.current_cooldown == 0
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub fn with_status(mut self, status_id: impl Into<String>, duration: Option<i32>) -> Self {
        self.applies_status = Some(StatusApplication {
            status_id: status_id.into(),
            duration,
            chance: 1.0,
        });
        self
    }

    pub fn with_target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = Some(target_type);
        self
    }

    pub fn aoe(mut self) -> Self {
        self.is_aoe = true;
        self
    }
}

/// Who a passive effect lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassiveTarget {
    #[default]
    #[serde(rename = "self")]
    SelfTarget,
    Allies,
    Enemies,
    Source,
}

/// Free-form tuning data for passive behaviors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PassiveData {
    pub max_triggers: Option<u32>,
    pub status_id: Option<String>,
    pub duration: Option<i32>,
    pub amount: Option<u32>,
    pub percent: Option<f64>,
    pub threshold: Option<f64>,
    pub target: Option<PassiveTarget>,
}

/// An ability that fires on a trigger instead of being chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveAbility {
    pub name: String,
    pub trigger: Trigger,
    pub behavior: PassiveRule,
    #[serde(default)]
    pub passive_data: PassiveData,
}

impl PassiveAbility {
    pub fn new(name: impl Into<String>, trigger: Trigger, behavior: PassiveRule) -> Self {
        Self {
            name: name.into(),
            trigger,
            behavior,
            passive_data: PassiveData::default(),
        }
    }

    pub fn with_data(mut self, data: PassiveData) -> Self {
        self.passive_data = data;
        self
    }

    /// Key the trigger tracker uses for this passive
    pub fn passive_id(&self) -> &str {
        &self.name
    }
}
