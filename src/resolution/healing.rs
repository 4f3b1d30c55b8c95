//! Healing computation, application and revival

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::character::{Ability, Character};
use crate::core::config::DamageConfig;
use crate::core::types::{DamageType, Stat};
use crate::resolution::damage::{roll_critical, roll_variance, scaling_text};

/// Computed (not yet applied) healing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealingOutcome {
    pub amount: u32,
    pub is_critical: bool,
    pub scaling_stat: Option<Stat>,
    pub scaling_text: String,
}

/// Result of applying healing to a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealingApplication {
    pub actual_healing: u32,
    /// The target was defeated and now has health again
    pub revived: bool,
}

/// Outcome of reconciling `is_dead` with current health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathStatusChange {
    Unchanged,
    Revived,
    Died,
}

#[derive(Debug, Clone, Default)]
pub struct HealingResolver {
    config: DamageConfig,
}

impl HealingResolver {
    pub fn new(config: DamageConfig) -> Self {
        Self { config }
    }

    /// Healing `healer` would restore with `ability`.
    ///
    /// Scales from spirit unless the ability says otherwise; shares the
    /// damage variance and critical roll, with no defense reduction.
    pub fn compute_healing(
        &self,
        healer: &Character,
        ability: &Ability,
        rng: &mut dyn RngCore,
    ) -> HealingOutcome {
        if let Err(e) = healer.validate() {
            tracing::warn!("compute_healing: invalid healer {}: {}", healer.id, e);
            return HealingOutcome {
                amount: 0,
                is_critical: false,
                scaling_stat: None,
                scaling_text: String::new(),
            };
        }

        let stat = ability
            .scaling_stat
            .or_else(|| DamageType::Healing.default_scaling_stat());
        let factor = ability
            .scale_factor
            .unwrap_or(self.config.default_scale_factor);
        let bonus = stat
            .map(|s| healer.stats.get(s) as f64 * factor)
            .unwrap_or(0.0);

        let variance = roll_variance(&self.config, rng);
        let is_critical = roll_critical(&self.config, rng);
        let crit = if is_critical {
            self.config.crit_multiplier
        } else {
            1.0
        };

        let total = (ability.damage as f64 + bonus) * variance * crit;

        HealingOutcome {
            amount: total.round().max(0.0) as u32,
            is_critical,
            scaling_stat: stat,
            scaling_text: scaling_text(bonus, stat),
        }
    }

    /// Restore up to `amount` health, capped at max hp.
    ///
    /// Does not touch `is_dead`; see [`check_and_reset_death_status`].
    pub fn apply_healing(&self, target: &mut Character, amount: u32) -> HealingApplication {
        let was_defeated = target.is_dead || target.current_hp == 0;
        let before = target.current_hp;
        let after = before.saturating_add(amount).min(target.stats.hp);
        target.current_hp = after;

        HealingApplication {
            actual_healing: after - before,
            revived: was_defeated && after > 0,
        }
    }
}

/// Bring `is_dead` in line with current health
pub fn check_and_reset_death_status(character: &mut Character) -> DeathStatusChange {
    if character.is_dead && character.current_hp > 0 {
        character.is_dead = false;
        DeathStatusChange::Revived
    } else if !character.is_dead && character.current_hp == 0 {
        character.is_dead = true;
        DeathStatusChange::Died
    } else {
        DeathStatusChange::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterTemplate, Stats};
    use crate::core::types::Team;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn patient(current: u32, max: u32) -> Character {
        let mut template = CharacterTemplate::new(
            "patient",
            "Patient",
            Stats {
                hp: max,
                spirit: 10,
                ..Stats::default()
            },
        );
        template.current_hp = Some(current);
        Character::from_template(&template, Team::Player, 0)
    }

    #[test]
    fn test_heal_within_cap() {
        let resolver = HealingResolver::default();
        let mut target = patient(5, 30);

        let result = resolver.apply_healing(&mut target, 20);
        assert_eq!(result, HealingApplication { actual_healing: 20, revived: false });
        assert_eq!(target.current_hp, 25);
    }

    #[test]
    fn test_heal_capped_at_max() {
        let resolver = HealingResolver::default();
        let mut target = patient(5, 10);

        let result = resolver.apply_healing(&mut target, 20);
        assert_eq!(result.actual_healing, 5);
        assert_eq!(target.current_hp, 10);
    }

    #[test]
    fn test_revival_needs_explicit_reset() {
        let resolver = HealingResolver::default();
        let mut target = patient(0, 30);
        assert!(target.is_dead);

        let result = resolver.apply_healing(&mut target, 12);
        assert!(result.revived);
        assert_eq!(target.current_hp, 12);
        assert!(target.is_dead, "heal alone must not clear the defeated flag");

        assert_eq!(check_and_reset_death_status(&mut target), DeathStatusChange::Revived);
        assert!(target.is_alive());
        assert_eq!(check_and_reset_death_status(&mut target), DeathStatusChange::Unchanged);
    }

    #[test]
    fn test_death_status_marks_zero_hp() {
        let mut target = patient(10, 30);
        target.current_hp = 0;
        assert_eq!(check_and_reset_death_status(&mut target), DeathStatusChange::Died);
        assert!(target.is_dead);
    }

    #[test]
    fn test_compute_healing_scales_from_spirit() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let resolver = HealingResolver::new(DamageConfig::deterministic());
        let healer = patient(30, 30);
        let mend = Ability::new("Mend", 20, DamageType::Healing);

        let outcome = resolver.compute_healing(&healer, &mend, &mut rng);
        assert_eq!(outcome.amount, 25);
        assert_eq!(outcome.scaling_stat, Some(Stat::Spirit));
        assert_eq!(outcome.scaling_text, "(+5 from Spirit)");
    }
}
