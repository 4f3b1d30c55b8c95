//! Roster templates and the live combatants copied from them

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::behavior::DecisionRule;
use crate::character::ability::{Ability, PassiveAbility};
use crate::character::stats::Stats;
use crate::core::error::{EntityError, Result};
use crate::core::types::{CharacterId, Element, Stat, Team};
use crate::effects::{EffectType, StatusEffectInstance};

/// A character as authored in a roster file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub element: Option<Element>,
    pub stats: Stats,
    /// Starting health; full health when absent
    #[serde(default)]
    pub current_hp: Option<u32>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub passive_abilities: Vec<PassiveAbility>,
    #[serde(default)]
    pub decision_rule: Option<DecisionRule>,
}

impl CharacterTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, stats: Stats) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            element: None,
            stats,
            current_hp: None,
            abilities: Vec::new(),
            passive_abilities: Vec::new(),
            decision_rule: None,
        }
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn with_passive(mut self, passive: PassiveAbility) -> Self {
        self.passive_abilities.push(passive);
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn validate(&self) -> std::result::Result<(), EntityError> {
        if self.name.trim().is_empty() {
            return Err(EntityError::MissingName);
        }
        if self.stats.hp == 0 {
            return Err(EntityError::ZeroMaxHp);
        }
        if let Some(current) = self.current_hp {
            if current > self.stats.hp {
                return Err(EntityError::HpAboveMax {
                    current,
                    max: self.stats.hp,
                });
            }
        }
        Ok(())
    }
}

/// Load a roster (JSON array of templates)
pub fn load_roster(path: &Path) -> Result<Vec<CharacterTemplate>> {
    let content = fs::read_to_string(path)?;
    let roster: Vec<CharacterTemplate> = serde_json::from_str(&content)?;
    Ok(roster)
}

/// A live combatant. Owned by the battle, never aliased with its template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub template_id: String,
    pub name: String,
    pub team: Team,
    pub element: Option<Element>,
    pub stats: Stats,
    pub current_hp: u32,
    pub is_dead: bool,
    pub abilities: Vec<Ability>,
    pub passive_abilities: Vec<PassiveAbility>,
    pub status_effects: Vec<StatusEffectInstance>,
    /// Pre-modification values of stats currently altered by stat modifiers
    pub base_stat_overrides: AHashMap<Stat, u32>,
    pub decision_rule: Option<DecisionRule>,
}

impl Character {
    /// Typed value copy of a template into a battle slot
    pub fn from_template(template: &CharacterTemplate, team: Team, slot: usize) -> Self {
        let current_hp = template
            .current_hp
            .unwrap_or(template.stats.hp)
            .min(template.stats.hp);

        Self {
            id: CharacterId::for_slot(team, slot),
            template_id: template.id.clone(),
            name: template.name.clone(),
            team,
            element: template.element,
            stats: template.stats,
            current_hp,
            is_dead: current_hp == 0,
            abilities: template
                .abilities
                .iter()
                .map(|a| Ability {
                    current_cooldown: 0,
                    ..a.clone()
                })
                .collect(),
            passive_abilities: template.passive_abilities.clone(),
            status_effects: Vec::new(),
            base_stat_overrides: AHashMap::new(),
            decision_rule: template.decision_rule.clone(),
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead && self.current_hp > 0
    }

    pub fn max_hp(&self) -> u32 {
        self.stats.hp
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.stats.hp == 0 {
            return 0.0;
        }
        self.current_hp as f64 / self.stats.hp as f64
    }

    /// Entity-shape check applied before a character is used
    pub fn validate(&self) -> std::result::Result<(), EntityError> {
        if self.name.trim().is_empty() {
            return Err(EntityError::MissingName);
        }
        if self.stats.hp == 0 {
            return Err(EntityError::ZeroMaxHp);
        }
        if self.current_hp > self.stats.hp {
            return Err(EntityError::HpAboveMax {
                current: self.current_hp,
                max: self.stats.hp,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn has_effect(&self, effect_id: &str) -> bool {
        self.status_effects.iter().any(|e| e.effect_id == effect_id)
    }

    /// Any control effect prevents acting
    pub fn is_stunned(&self) -> bool {
        self.status_effects
            .iter()
            .any(|e| e.effect_type == EffectType::Control)
    }

    pub fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            team: self.team,
            current_hp: self.current_hp,
            max_hp: self.stats.hp,
            is_dead: self.is_dead,
            effects: self
                .status_effects
                .iter()
                .map(|e| e.effect_id.clone())
                .collect(),
        }
    }
}

/// Lightweight view of a character carried on events and reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub team: Team,
    pub current_hp: u32,
    pub max_hp: u32,
    pub is_dead: bool,
    pub effects: Vec<String>,
}
