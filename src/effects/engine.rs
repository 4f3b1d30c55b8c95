//! Status effect lifecycle: apply, stack, tick, expire, remove
//!
//! Per character per effect: Active -> (duration-- each turn) -> Active | Expired.
//!
//! Stat modifiers never adjust a stat arithmetically in place. The first
//! modifier on a stat records the stat's original value in
//! `base_stat_overrides`; the live value is always recomputed as
//! `original + sum(active modifier deltas)`, and removing the last modifier
//! restores the recorded original exactly.

use crate::character::Character;
use crate::core::types::Stat;
use crate::effects::catalog::{EffectType, StatusCatalog};
use crate::effects::instance::StatusEffectInstance;
use crate::resolution::{DamageResolver, HealingResolver};

/// What `add_effect` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Applied,
    Stacked { stacks: u32 },
    Refreshed,
}

/// One periodic damage/heal application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTick {
    pub effect_id: String,
    pub effect_name: String,
    pub effect_type: EffectType,
    pub amount: u32,
    /// Health right after this tick
    pub new_health: u32,
    pub killed: bool,
    pub revived: bool,
}

/// Everything one call to `process_status_effects` did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTickReport {
    pub ticks: Vec<StatusTick>,
    pub expired: Vec<String>,
}

impl StatusTickReport {
    /// The effect list changed shape
    pub fn changed(&self) -> bool {
        !self.expired.is_empty()
    }

    pub fn killed(&self) -> bool {
        self.ticks.iter().any(|t| t.killed)
    }

    pub fn revived(&self) -> bool {
        self.ticks.iter().any(|t| t.revived)
    }
}

/// Result of routing incoming damage through shields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShieldAbsorb {
    pub remaining: u32,
    pub absorbed: u32,
    pub depleted: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StatusEffectEngine {
    catalog: StatusCatalog,
}

impl StatusEffectEngine {
    pub fn new(catalog: StatusCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &StatusCatalog {
        &self.catalog
    }

    /// Apply `effect_id` to a living character.
    ///
    /// Returns `None` when the effect is unknown, the duration is zero or the
    /// character is defeated.
    pub fn add_effect(
        &self,
        character: &mut Character,
        effect_id: &str,
        duration: Option<i32>,
        source: &str,
    ) -> Option<AddOutcome> {
        let Some(def) = self.catalog.get(effect_id) else {
            tracing::warn!("add_effect: unknown status effect '{}'", effect_id);
            return None;
        };

        if !character.is_alive() {
            tracing::debug!(
                "add_effect: {} is defeated, '{}' not applied",
                character.name,
                effect_id
            );
            return None;
        }

        let duration = duration.unwrap_or(def.default_duration);
        if duration == 0 || duration < -1 {
            return None;
        }

        let outcome = match character
            .status_effects
            .iter_mut()
            .find(|e| e.effect_id == effect_id)
        {
            Some(existing) if def.stackable => {
                existing.stacks = (existing.stacks + 1).min(def.max_stacks.max(1));
                if existing.is_longer(duration) {
                    existing.remaining_duration = duration;
                }
                existing.reset_shield();
                AddOutcome::Stacked {
                    stacks: existing.stacks,
                }
            }
            Some(existing) => {
                existing.remaining_duration = duration;
                existing.reset_shield();
                AddOutcome::Refreshed
            }
            None => {
                character
                    .status_effects
                    .push(StatusEffectInstance::from_definition(def, duration, source));
                AddOutcome::Applied
            }
        };

        if def.effect_type == EffectType::StatModifier {
            if let Some(stat) = def.stat {
                refresh_stat(character, stat);
            }
        }

        tracing::debug!("{} gains {} ({:?})", character.name, def.name, outcome);
        Some(outcome)
    }

    /// Remove every instance of `effect_id`, reverting stat changes
    pub fn remove_effect(&self, character: &mut Character, effect_id: &str) -> bool {
        let removed: Vec<StatusEffectInstance> = extract(character, |e| e.effect_id == effect_id);
        revert_modifiers(character, &removed);
        !removed.is_empty()
    }

    /// Run one turn of periodic effects and count durations down.
    ///
    /// A character already defeated when processing starts only processes
    /// revival-class effects; everything else on it stays frozen. Control
    /// effects are counted down by `tick_control_effects` instead, once the
    /// bearer has had its chance to act.
    pub fn process_status_effects(
        &self,
        character: &mut Character,
        damage: &DamageResolver,
        healing: &HealingResolver,
    ) -> StatusTickReport {
        let mut report = StatusTickReport::default();
        let started_defeated = !character.is_alive();
        let mut expired = Vec::new();

        for i in 0..character.status_effects.len() {
            let effect = character.status_effects[i].clone();

            if started_defeated && !effect.revives {
                continue;
            }

            let can_dispatch = character.is_alive() || effect.revives;
            let amount = effect.total_value().round().max(0.0) as u32;

            if can_dispatch && amount > 0 {
                match effect.effect_type {
                    EffectType::Damage => {
                        let applied = damage.apply_damage(character, amount);
                        if applied.actual_damage > 0 || applied.killed {
                            report.ticks.push(StatusTick {
                                effect_id: effect.effect_id.clone(),
                                effect_name: effect.name.clone(),
                                effect_type: effect.effect_type,
                                amount: applied.actual_damage,
                                new_health: character.current_hp,
                                killed: applied.killed,
                                revived: false,
                            });
                        }
                    }
                    EffectType::Healing => {
                        let applied = healing.apply_healing(character, amount);
                        if applied.actual_healing > 0 || applied.revived {
                            report.ticks.push(StatusTick {
                                effect_id: effect.effect_id.clone(),
                                effect_name: effect.name.clone(),
                                effect_type: effect.effect_type,
                                amount: applied.actual_healing,
                                new_health: character.current_hp,
                                killed: false,
                                revived: applied.revived,
                            });
                        }
                    }
                    // Consulted elsewhere: action legality, damage application
                    EffectType::StatModifier | EffectType::Shield | EffectType::Control => {}
                }
            }

            if effect.effect_type != EffectType::Control
                && character.status_effects[i].tick_duration()
            {
                expired.push(i);
            }
        }

        for i in expired.into_iter().rev() {
            let removed = character.status_effects.remove(i);
            report.expired.push(removed.effect_id.clone());
            revert_modifiers(character, std::slice::from_ref(&removed));
        }
        report.expired.reverse();

        report
    }

    /// Count control effects down by one turn, returning the ids that expired
    pub fn tick_control_effects(&self, character: &mut Character) -> Vec<String> {
        let mut expired = Vec::new();
        character.status_effects.retain_mut(|e| {
            if e.effect_type != EffectType::Control || !e.tick_duration() {
                return true;
            }
            expired.push(e.effect_id.clone());
            false
        });
        expired
    }

    /// Route `amount` through shields, oldest first
    pub fn absorb_damage(&self, character: &mut Character, amount: u32) -> ShieldAbsorb {
        let mut result = ShieldAbsorb {
            remaining: amount,
            ..ShieldAbsorb::default()
        };

        for shield in character
            .status_effects
            .iter_mut()
            .filter(|e| e.effect_type == EffectType::Shield)
        {
            if result.remaining == 0 {
                break;
            }
            let taken = result.remaining.min(shield.shield_remaining);
            shield.shield_remaining -= taken;
            result.remaining -= taken;
            result.absorbed += taken;
            if shield.shield_remaining == 0 {
                result.depleted.push(shield.effect_id.clone());
            }
        }

        if !result.depleted.is_empty() {
            character
                .status_effects
                .retain(|e| !(e.effect_type == EffectType::Shield && e.shield_remaining == 0));
        }

        result
    }

    /// Drop non-permanent effects from a character that just died.
    ///
    /// Revival-class effects survive so they can bring the character back.
    pub fn clear_on_death(&self, character: &mut Character) -> Vec<String> {
        let removed = extract(character, |e| !e.is_permanent() && !e.revives);
        revert_modifiers(character, &removed);
        removed.into_iter().map(|e| e.effect_id).collect()
    }
}

impl Default for StatusEffectEngine {
    fn default() -> Self {
        Self::new(StatusCatalog::builtin())
    }
}

fn extract<F>(character: &mut Character, pred: F) -> Vec<StatusEffectInstance>
where
    F: Fn(&StatusEffectInstance) -> bool,
{
    let (removed, kept): (Vec<_>, Vec<_>) = character
        .status_effects
        .drain(..)
        .partition(|e| pred(e));
    character.status_effects = kept;
    removed
}

fn revert_modifiers(character: &mut Character, removed: &[StatusEffectInstance]) {
    for effect in removed {
        if effect.effect_type == EffectType::StatModifier {
            if let Some(stat) = effect.stat {
                refresh_stat(character, stat);
            }
        }
    }
}

/// Recompute `stat` from its recorded original plus active modifiers
fn refresh_stat(character: &mut Character, stat: Stat) {
    let modifiers: Vec<i64> = character
        .status_effects
        .iter()
        .filter(|e| e.effect_type == EffectType::StatModifier && e.stat == Some(stat))
        .map(|e| e.total_value().round() as i64)
        .collect();

    if modifiers.is_empty() {
        if let Some(original) = character.base_stat_overrides.remove(&stat) {
            character.stats.set(stat, original);
        }
    } else {
        let current = character.stats.get(stat);
        let original = *character.base_stat_overrides.entry(stat).or_insert(current);
        let delta: i64 = modifiers.iter().sum();
        let floor = if stat == Stat::Hp { 1 } else { 0 };
        let value = (original as i64 + delta).max(floor) as u32;
        character.stats.set(stat, value);
    }

    if stat == Stat::Hp {
        character.current_hp = character.current_hp.min(character.stats.hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterTemplate, Stats};
    use crate::core::types::Team;
    use crate::effects::instance::PERMANENT;

    fn subject() -> Character {
        let template = CharacterTemplate::new(
            "subject",
            "Subject",
            Stats {
                hp: 50,
                attack: 10,
                defense: 20,
                speed: 10,
                strength: 10,
                intellect: 10,
                spirit: 10,
            },
        );
        Character::from_template(&template, Team::Player, 0)
    }

    fn process(engine: &StatusEffectEngine, c: &mut Character) -> StatusTickReport {
        engine.process_status_effects(c, &DamageResolver::default(), &HealingResolver::default())
    }

    #[test]
    fn test_stackable_effect_stacks_to_cap() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();

        assert_eq!(engine.add_effect(&mut c, "bleed", None, "x"), Some(AddOutcome::Applied));
        for expected in [2, 3, 3] {
            assert_eq!(
                engine.add_effect(&mut c, "bleed", None, "x"),
                Some(AddOutcome::Stacked { stacks: expected })
            );
        }
        assert_eq!(c.status_effects.len(), 1);
        assert_eq!(c.status_effects[0].stacks, 3);
    }

    #[test]
    fn test_stacking_refreshes_only_longer_duration() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();

        engine.add_effect(&mut c, "poison", Some(4), "x");
        engine.add_effect(&mut c, "poison", Some(2), "x");
        assert_eq!(c.status_effects[0].remaining_duration, 4);

        engine.add_effect(&mut c, "poison", Some(6), "x");
        assert_eq!(c.status_effects[0].remaining_duration, 6);
    }

    #[test]
    fn test_non_stackable_refreshes_duration() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();

        engine.add_effect(&mut c, "burn", Some(5), "x");
        assert_eq!(engine.add_effect(&mut c, "burn", Some(2), "x"), Some(AddOutcome::Refreshed));
        assert_eq!(c.status_effects[0].remaining_duration, 2);
        assert_eq!(c.status_effects[0].stacks, 1);
    }

    #[test]
    fn test_unknown_or_zero_duration_ignored() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        assert_eq!(engine.add_effect(&mut c, "nope", None, "x"), None);
        assert_eq!(engine.add_effect(&mut c, "burn", Some(0), "x"), None);
        assert!(c.status_effects.is_empty());
    }

    #[test]
    fn test_stat_modifier_round_trip_is_exact() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();

        engine.add_effect(&mut c, "sunder", None, "x");
        engine.add_effect(&mut c, "sunder", None, "x");
        assert_eq!(c.stats.defense, 0);
        assert_eq!(c.base_stat_overrides.get(&Stat::Defense), Some(&20));

        engine.add_effect(&mut c, "fortify", None, "x");
        assert_eq!(c.stats.defense, 15);

        assert!(engine.remove_effect(&mut c, "sunder"));
        assert_eq!(c.stats.defense, 35);
        assert!(engine.remove_effect(&mut c, "fortify"));
        assert_eq!(c.stats.defense, 20);
        assert!(c.base_stat_overrides.is_empty());
    }

    #[test]
    fn test_negative_modifier_clamped_then_restored() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        c.stats.speed = 3;

        engine.add_effect(&mut c, "slow", None, "x");
        assert_eq!(c.stats.speed, 0);
        engine.remove_effect(&mut c, "slow");
        assert_eq!(c.stats.speed, 3);
    }

    #[test]
    fn test_duration_decrements_and_expires() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "burn", Some(2), "x");

        let first = process(&engine, &mut c);
        assert_eq!(first.ticks.len(), 1);
        assert_eq!(first.ticks[0].amount, 8);
        assert!(!first.changed());
        assert_eq!(c.status_effects[0].remaining_duration, 1);

        let second = process(&engine, &mut c);
        assert_eq!(second.ticks.len(), 1);
        assert_eq!(second.expired, vec!["burn".to_string()]);
        assert!(c.status_effects.is_empty());
        assert_eq!(c.current_hp, 50 - 16);
    }

    #[test]
    fn test_stacks_multiply_periodic_value() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "poison", None, "x");
        engine.add_effect(&mut c, "poison", None, "x");

        let report = process(&engine, &mut c);
        assert_eq!(report.ticks[0].amount, 8);
    }

    #[test]
    fn test_permanent_effect_never_expires() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "haste", Some(PERMANENT), "x");

        for _ in 0..5 {
            process(&engine, &mut c);
        }
        assert_eq!(c.status_effects.len(), 1);
        assert_eq!(c.stats.speed, 15);
    }

    #[test]
    fn test_expiry_reverts_stat_modifier() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "might", Some(1), "x");
        assert_eq!(c.stats.strength, 16);

        let report = process(&engine, &mut c);
        assert_eq!(report.expired, vec!["might".to_string()]);
        assert_eq!(c.stats.strength, 10);
    }

    #[test]
    fn test_heal_tick_at_full_health_is_silent() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "regeneration", Some(2), "x");

        let report = process(&engine, &mut c);
        assert!(report.ticks.is_empty());
        assert_eq!(c.status_effects[0].remaining_duration, 1);
    }

    #[test]
    fn test_each_tick_records_health_after_it() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "burn", None, "x");
        engine.add_effect(&mut c, "poison", None, "x");

        let report = process(&engine, &mut c);
        let health: Vec<u32> = report.ticks.iter().map(|t| t.new_health).collect();
        assert_eq!(health, vec![42, 38]);
    }

    #[test]
    fn test_dot_can_kill() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        c.current_hp = 5;
        engine.add_effect(&mut c, "burn", None, "x");

        let report = process(&engine, &mut c);
        assert!(report.killed());
        assert!(c.is_dead);
        assert_eq!(c.current_hp, 0);
    }

    #[test]
    fn test_defeated_character_only_processes_revival() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "poison", Some(3), "x");
        engine.add_effect(&mut c, "rebirth", Some(2), "x");
        c.current_hp = 0;
        c.is_dead = true;

        let report = process(&engine, &mut c);
        assert_eq!(report.ticks.len(), 1);
        assert!(report.revived());
        assert_eq!(c.current_hp, 25);
        let poison = c.status_effects.iter().find(|e| e.effect_id == "poison").unwrap();
        assert_eq!(poison.remaining_duration, 3, "frozen while defeated");
    }

    #[test]
    fn test_shield_absorbs_then_breaks() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "barrier", None, "x");

        let first = engine.absorb_damage(&mut c, 12);
        assert_eq!(first.absorbed, 12);
        assert_eq!(first.remaining, 0);
        assert!(first.depleted.is_empty());

        let second = engine.absorb_damage(&mut c, 25);
        assert_eq!(second.absorbed, 18);
        assert_eq!(second.remaining, 7);
        assert_eq!(second.depleted, vec!["barrier".to_string()]);
        assert!(!c.has_effect("barrier"));
    }

    #[test]
    fn test_clear_on_death_keeps_permanent_and_revival() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "might", None, "x");
        engine.add_effect(&mut c, "haste", Some(PERMANENT), "x");
        engine.add_effect(&mut c, "rebirth", None, "x");

        let removed = engine.clear_on_death(&mut c);
        assert_eq!(removed, vec!["might".to_string()]);
        assert_eq!(c.stats.strength, 10);
        assert!(c.has_effect("haste"));
        assert!(c.has_effect("rebirth"));
    }

    #[test]
    fn test_stun_marks_character_stunned() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        assert!(!c.is_stunned());
        engine.add_effect(&mut c, "stun", Some(1), "x");
        assert!(c.is_stunned());
        process(&engine, &mut c);
        assert!(c.is_stunned());
        assert_eq!(engine.tick_control_effects(&mut c), vec!["stun".to_string()]);
        assert!(!c.is_stunned());
    }

    #[test]
    fn test_control_countdown_leaves_other_effects_alone() {
        let engine = StatusEffectEngine::default();
        let mut c = subject();
        engine.add_effect(&mut c, "freeze", Some(2), "x");
        engine.add_effect(&mut c, "haste", Some(1), "x");

        assert!(engine.tick_control_effects(&mut c).is_empty());
        assert!(c.has_effect("haste"));
        assert!(c.is_stunned());
        assert_eq!(engine.tick_control_effects(&mut c), vec!["freeze".to_string()]);
        assert!(c.has_effect("haste"));
    }
}
