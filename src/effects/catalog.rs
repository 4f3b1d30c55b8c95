//! Static catalog of status effect definitions
//!
//! The built-in catalog covers the common effect families. A TOML file of
//! `[[effect]]` tables can extend it or override entries by id.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::Result;
use crate::core::types::Stat;

/// What an effect does while active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectType {
    /// Periodic damage, `value` per stack per turn
    Damage,
    /// Periodic healing, `value` per stack per turn
    Healing,
    /// Flat change to `stat`, `value` per stack, reverted on removal
    StatModifier,
    /// Absorbs up to `value` per stack of incoming damage
    Shield,
    /// Prevents the bearer from acting
    Control,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect_type: EffectType,
    #[serde(default)]
    pub stackable: bool,
    #[serde(default = "one")]
    pub max_stacks: u32,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub stat: Option<Stat>,
    /// Duration used when the applier names none; -1 is permanent
    #[serde(default = "three")]
    pub default_duration: i32,
    /// Healing effects flagged here keep ticking on a defeated bearer
    #[serde(default)]
    pub revives: bool,
}

fn one() -> u32 {
    1
}

fn three() -> i32 {
    3
}

impl StatusEffectDefinition {
    fn new(id: &str, name: &str, effect_type: EffectType, value: f64, duration: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            effect_type,
            stackable: false,
            max_stacks: 1,
            value,
            stat: None,
            default_duration: duration,
            revives: false,
        }
    }

    fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    fn stacking(mut self, max_stacks: u32) -> Self {
        self.stackable = true;
        self.max_stacks = max_stacks;
        self
    }

    fn on_stat(mut self, stat: Stat) -> Self {
        self.stat = Some(stat);
        self
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    effect: Vec<StatusEffectDefinition>,
}

/// Registry of effect definitions keyed by id
#[derive(Debug, Clone, Default)]
pub struct StatusCatalog {
    definitions: AHashMap<String, StatusEffectDefinition>,
}

impl StatusCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in definitions
    pub fn builtin() -> Self {
        use EffectType::*;

        let mut catalog = Self::new();
        for def in [
            StatusEffectDefinition::new("poison", "Poison", Damage, 4.0, 3)
                .describe("Takes damage each turn; stacks")
                .stacking(5),
            StatusEffectDefinition::new("burn", "Burn", Damage, 8.0, 2)
                .describe("Takes fire damage each turn"),
            StatusEffectDefinition::new("bleed", "Bleed", Damage, 3.0, 4)
                .describe("Loses health each turn; stacks")
                .stacking(3),
            StatusEffectDefinition::new("regeneration", "Regeneration", Healing, 6.0, 3)
                .describe("Restores health each turn"),
            StatusEffectDefinition {
                revives: true,
                ..StatusEffectDefinition::new("rebirth", "Rebirth", Healing, 25.0, 2)
                    .describe("Restores health each turn, even from defeat")
            },
            StatusEffectDefinition::new("stun", "Stunned", Control, 0.0, 1)
                .describe("Cannot act"),
            StatusEffectDefinition::new("freeze", "Frozen", Control, 0.0, 2)
                .describe("Cannot act"),
            StatusEffectDefinition::new("barrier", "Barrier", Shield, 30.0, 3)
                .describe("Absorbs incoming damage"),
            StatusEffectDefinition::new("might", "Might", StatModifier, 6.0, 3)
                .describe("Increased strength; stacks")
                .on_stat(Stat::Strength)
                .stacking(3),
            StatusEffectDefinition::new("fortify", "Fortify", StatModifier, 15.0, 3)
                .describe("Increased defense")
                .on_stat(Stat::Defense),
            StatusEffectDefinition::new("sunder", "Sunder", StatModifier, -10.0, 3)
                .describe("Reduced defense; stacks")
                .on_stat(Stat::Defense)
                .stacking(3),
            StatusEffectDefinition::new("haste", "Haste", StatModifier, 5.0, 3)
                .describe("Increased speed")
                .on_stat(Stat::Speed),
            StatusEffectDefinition::new("slow", "Slow", StatModifier, -5.0, 2)
                .describe("Reduced speed")
                .on_stat(Stat::Speed),
            StatusEffectDefinition::new("focus", "Focus", StatModifier, 8.0, 3)
                .describe("Increased intellect")
                .on_stat(Stat::Intellect),
        ] {
            catalog.insert(def);
        }
        catalog
    }

    /// Built-in catalog extended with the definitions in a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut catalog = Self::builtin();
        catalog.extend_from_toml(&content)?;
        Ok(catalog)
    }

    /// Add or override definitions from TOML text
    pub fn extend_from_toml(&mut self, content: &str) -> Result<usize> {
        let file: CatalogFile = toml::from_str(content)?;
        let count = file.effect.len();
        for def in file.effect {
            self.insert(def);
        }
        Ok(count)
    }

    pub fn insert(&mut self, definition: StatusEffectDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> Option<&StatusEffectDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
