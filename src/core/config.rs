//! Battle configuration with documented constants
//!
//! All tunable numbers are collected here with an explanation of what they
//! affect. Every field has a default so a TOML file only needs to list the
//! values it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{BattleError, Result};
use crate::core::types::Element;

/// Configuration for a battle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === PACING ===
    /// Delay before each turn begins (milliseconds, before speed scaling)
    pub turn_start_delay_ms: u64,

    /// Delay between consecutive actions within a turn
    pub action_delay_ms: u64,

    /// Delay between the last action of a turn and turn-end handling
    pub turn_end_delay_ms: u64,

    /// Divides every delay. 2.0 plays the battle twice as fast.
    ///
    /// Only affects pacing, never resolution.
    pub speed_multiplier: f64,

    // === RULES ===
    /// Cooldown applied to an ability that does not configure its own
    pub default_cooldown: u32,

    /// Turn limit. A battle still undecided after this many turns ends in a
    /// draw (timeout). 0 disables the limit.
    pub max_turns: u32,

    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,

    // === DAMAGE ===
    pub damage: DamageConfig,

    /// Additional or overriding type chart entries
    pub type_chart: Vec<TypeChartEntry>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            turn_start_delay_ms: 800,
            action_delay_ms: 600,
            turn_end_delay_ms: 400,
            speed_multiplier: 1.0,

            default_cooldown: 3,
            max_turns: 50,
            seed: None,

            damage: DamageConfig::default(),
            type_chart: Vec::new(),
        }
    }
}

/// Numbers driving the damage and healing formulas
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Chance (0.0 - 1.0) that a hit or heal is critical
    pub crit_chance: f64,

    /// Multiplier applied on a critical
    pub crit_multiplier: f64,

    /// Lower bound of the uniform variance roll
    pub variance_min: f64,

    /// Upper bound of the uniform variance roll
    ///
    /// Setting min == max pins the roll (tests use 1.0 / 1.0).
    pub variance_max: f64,

    /// Defense reduction is `1 - defense / (defense + defense_constant)`.
    ///
    /// At the default 100, a defense of 100 halves incoming damage and the
    /// reduction never reaches zero.
    pub defense_constant: f64,

    /// Scale factor used when an ability names no explicit one
    pub default_scale_factor: f64,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            crit_chance: 0.10,
            crit_multiplier: 1.5,
            variance_min: 0.8,
            variance_max: 1.2,
            defense_constant: 100.0,
            default_scale_factor: 0.5,
        }
    }
}

impl DamageConfig {
    /// Deterministic settings: no variance, no criticals
    pub fn deterministic() -> Self {
        Self {
            crit_chance: 0.0,
            variance_min: 1.0,
            variance_max: 1.0,
            ..Self::default()
        }
    }
}

/// One attacker/defender element pairing in the type chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeChartEntry {
    pub attacker: Element,
    pub defender: Element,
    pub multiplier: f64,
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: BattleConfig = toml::from_str(&content)?;
        config.validate().map_err(BattleError::Config)?;
        Ok(config)
    }

    /// Scale a base delay by the speed multiplier
    pub fn scaled_delay(&self, base_ms: u64) -> u64 {
        (base_ms as f64 / self.speed_multiplier).round() as u64
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.speed_multiplier > 0.0) {
            return Err(format!(
                "speed_multiplier ({}) must be positive",
                self.speed_multiplier
            ));
        }

        let d = &self.damage;
        if !(0.0..=1.0).contains(&d.crit_chance) {
            return Err(format!("crit_chance ({}) must be within 0..=1", d.crit_chance));
        }

        if d.variance_min <= 0.0 || d.variance_min > d.variance_max {
            return Err(format!(
                "variance range ({}..={}) must be positive and ordered",
                d.variance_min, d.variance_max
            ));
        }

        if d.defense_constant <= 0.0 {
            return Err("defense_constant must be positive".into());
        }

        if let Some(entry) = self.type_chart.iter().find(|e| e.multiplier < 0.0) {
            return Err(format!(
                "type chart multiplier for {:?} -> {:?} is negative",
                entry.attacker, entry.defender
            ));
        }

        Ok(())
    }
}
