//! Damage computation and application
//!
//! `total = (base + scaling) * type * defense_reduction * variance * crit`
//!
//! Defense has diminishing returns and never reduces damage to zero. Only a
//! type multiplier of exactly 0 (immunity) yields a zero result.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::character::{Ability, Character};
use crate::core::config::DamageConfig;
use crate::core::types::{DamageType, Stat};
use crate::resolution::type_chart::TypeChart;

/// Computed (not yet applied) damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageOutcome {
    pub amount: u32,
    pub is_critical: bool,
    pub damage_type: DamageType,
    pub scaling_stat: Option<Stat>,
    pub scaling_text: String,
    pub type_multiplier: f64,
}

impl DamageOutcome {
    pub fn zero(damage_type: DamageType) -> Self {
        Self {
            amount: 0,
            is_critical: false,
            damage_type,
            scaling_stat: None,
            scaling_text: String::new(),
            type_multiplier: 1.0,
        }
    }
}

/// Result of applying damage to a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageApplication {
    pub actual_damage: u32,
    /// True only on the transition from alive to defeated
    pub killed: bool,
}

/// Uniform variance roll in the configured range; pinned when min == max
pub(crate) fn roll_variance(config: &DamageConfig, rng: &mut dyn RngCore) -> f64 {
    if config.variance_min >= config.variance_max {
        return config.variance_min;
    }
    rng.gen_range(config.variance_min..=config.variance_max)
}

pub(crate) fn roll_critical(config: &DamageConfig, rng: &mut dyn RngCore) -> bool {
    config.crit_chance > 0.0 && rng.gen::<f64>() < config.crit_chance
}

/// "(+6 from Strength)", or empty when the bonus rounds to nothing
pub(crate) fn scaling_text(bonus: f64, stat: Option<Stat>) -> String {
    match stat {
        Some(stat) if bonus.round() >= 1.0 => {
            format!("(+{} from {})", bonus.round() as u32, stat.label())
        }
        _ => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct DamageResolver {
    config: DamageConfig,
    chart: TypeChart,
}

impl DamageResolver {
    pub fn new(config: DamageConfig, chart: TypeChart) -> Self {
        Self { config, chart }
    }

    pub fn config(&self) -> &DamageConfig {
        &self.config
    }

    /// Compute the damage `attacker` would deal to `target`.
    ///
    /// `ability == None` is a basic attack: base is the raw attack stat with
    /// no stat scaling. Invalid entities yield a zero result.
    pub fn compute_damage(
        &self,
        attacker: &Character,
        target: &Character,
        ability: Option<&Ability>,
        rng: &mut dyn RngCore,
    ) -> DamageOutcome {
        let damage_type = ability.map(|a| a.damage_type).unwrap_or(DamageType::Physical);

        if let Err(e) = attacker.validate() {
            tracing::warn!("compute_damage: invalid attacker {}: {}", attacker.id, e);
            return DamageOutcome::zero(damage_type);
        }
        if let Err(e) = target.validate() {
            tracing::warn!("compute_damage: invalid target {}: {}", target.id, e);
            return DamageOutcome::zero(damage_type);
        }

        let (base, scaling_stat, bonus) = match ability {
            Some(ability) => {
                let stat = ability
                    .scaling_stat
                    .or_else(|| damage_type.default_scaling_stat());
                let factor = ability
                    .scale_factor
                    .unwrap_or(self.config.default_scale_factor);
                let bonus = stat
                    .map(|s| attacker.stats.get(s) as f64 * factor)
                    .unwrap_or(0.0);
                (ability.damage as f64, stat, bonus)
            }
            None => (attacker.stats.attack as f64, None, 0.0),
        };

        let element = ability.and_then(|a| a.element).or(attacker.element);
        let type_multiplier = self.chart.multiplier(element, target.element);

        let defense = target.stats.defense as f64;
        let defense_reduction = 1.0 - defense / (defense + self.config.defense_constant);

        let variance = roll_variance(&self.config, rng);
        let is_critical = roll_critical(&self.config, rng);
        let crit = if is_critical {
            self.config.crit_multiplier
        } else {
            1.0
        };

        let total = (base + bonus) * type_multiplier * defense_reduction * variance * crit;
        let amount = if type_multiplier == 0.0 {
            0
        } else {
            (total.round() as u32).max(1)
        };

        DamageOutcome {
            amount,
            is_critical,
            damage_type,
            scaling_stat,
            scaling_text: scaling_text(bonus, scaling_stat),
            type_multiplier,
        }
    }

    /// Subtract `amount` from the target's health, clamped at zero
    pub fn apply_damage(&self, target: &mut Character, amount: u32) -> DamageApplication {
        if target.is_dead || target.current_hp == 0 {
            return DamageApplication::default();
        }

        let actual_damage = amount.min(target.current_hp);
        target.current_hp -= actual_damage;

        let killed = target.current_hp == 0;
        if killed {
            target.is_dead = true;
        }

        DamageApplication {
            actual_damage,
            killed,
        }
    }
}

impl Default for DamageResolver {
    fn default() -> Self {
        Self::new(DamageConfig::default(), TypeChart::builtin())
    }
}
