//! Property tests for health, duration, stat and trigger bookkeeping

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use skirmish_engine::battle::{
    BattleOrchestrator, Battlefield, TargetResolver, Trigger, TriggerTracker,
};
use skirmish_engine::behavior::{BehaviorRegistry, PassiveRule};
use skirmish_engine::character::{CharacterTemplate, PassiveAbility, PassiveData, Stats};
use skirmish_engine::core::{BattleConfig, CharacterId, DamageConfig, Stat, Team};
use skirmish_engine::effects::StatusEffectEngine;
use skirmish_engine::resolution::{DamageResolver, HealingResolver};
use skirmish_engine::Character;

fn character(hp: u32, current: u32) -> Character {
    let template = CharacterTemplate {
        current_hp: Some(current.min(hp)),
        ..CharacterTemplate::new(
            "c",
            "Subject",
            Stats {
                hp,
                attack: 10,
                defense: 20,
                strength: 15,
                speed: 8,
                ..Stats::default()
            },
        )
    };
    Character::from_template(&template, Team::Player, 0)
}

fn stats(hp: u32, attack: u32) -> Stats {
    Stats {
        hp,
        attack,
        ..Stats::default()
    }
}

proptest! {
    #[test]
    fn prop_damage_keeps_hp_in_bounds(
        hp in 1u32..500,
        current in 0u32..500,
        hits in prop::collection::vec(0u32..200, 1..20),
    ) {
        let resolver = DamageResolver::default();
        let mut target = character(hp, current);
        let mut kills = 0;

        for amount in hits {
            let applied = resolver.apply_damage(&mut target, amount);
            prop_assert!(target.current_hp <= target.stats.hp);
            prop_assert!(applied.actual_damage <= amount);
            if applied.killed {
                kills += 1;
            }
        }

        let started_alive = current.min(hp) > 0;
        prop_assert!(kills <= 1);
        if !started_alive {
            prop_assert_eq!(kills, 0);
        }
        prop_assert_eq!(target.is_dead, target.current_hp == 0);
    }

    #[test]
    fn prop_healing_never_exceeds_max(
        hp in 1u32..500,
        current in 1u32..500,
        heals in prop::collection::vec(0u32..300, 1..10),
    ) {
        let healing = HealingResolver::default();
        let mut target = character(hp, current);

        for amount in heals {
            let before = target.current_hp;
            let applied = healing.apply_healing(&mut target, amount);
            prop_assert!(target.current_hp <= target.stats.hp);
            prop_assert_eq!(target.current_hp, before + applied.actual_healing);
        }
    }

    #[test]
    fn prop_duration_counts_down_once_per_turn(duration in 1i32..8) {
        let engine = StatusEffectEngine::default();
        let damage = DamageResolver::default();
        let healing = HealingResolver::default();
        let mut bearer = character(1000, 1000);
        engine.add_effect(&mut bearer, "haste", Some(duration), "test");

        for turn in 1..=duration {
            engine.process_status_effects(&mut bearer, &damage, &healing);
            let remaining = bearer
                .status_effects
                .iter()
                .find(|e| e.effect_id == "haste")
                .map(|e| e.remaining_duration);
            if turn < duration {
                prop_assert_eq!(remaining, Some(duration - turn));
            } else {
                prop_assert_eq!(remaining, None);
            }
        }
        prop_assert_eq!(bearer.stats.speed, 8);
    }

    #[test]
    fn prop_stat_modifiers_round_trip(
        applications in prop::collection::vec(
            prop::sample::select(vec!["might", "sunder", "fortify", "haste", "slow"]),
            1..12,
        ),
    ) {
        let engine = StatusEffectEngine::default();
        let mut subject = character(200, 200);
        let original = subject.stats;

        for id in &applications {
            engine.add_effect(&mut subject, id, Some(3), "test");
        }
        for id in &applications {
            engine.remove_effect(&mut subject, id);
        }

        prop_assert_eq!(subject.stats, original);
        prop_assert_eq!(subject.stats.get(Stat::Defense), 20);
        prop_assert!(subject.base_stat_overrides.is_empty());
    }

    #[test]
    fn prop_trigger_cap_holds_for_any_battle_length(max in 1u32..5, turns in 1u32..15) {
        let troll = CharacterTemplate {
            current_hp: Some(100),
            ..CharacterTemplate::new("troll", "Troll", stats(1000, 1))
        }
        .with_passive(
            PassiveAbility::new("Regrowth", Trigger::TurnStart, PassiveRule::Regenerate)
                .with_data(PassiveData {
                    amount: Some(1),
                    max_triggers: Some(max),
                    ..PassiveData::default()
                }),
        );
        let wall = CharacterTemplate::new("wall", "Wall", stats(5000, 1));
        let config = BattleConfig {
            seed: Some(3),
            max_turns: turns,
            damage: DamageConfig::deterministic(),
            ..BattleConfig::default()
        };

        let mut battle = BattleOrchestrator::new(config);
        battle.start_battle(&[troll], &[wall]).unwrap();
        battle.run_to_completion();

        let fired = battle
            .trigger_tracker()
            .map(|t| t.trigger_count(&CharacterId::new("p-1"), "Regrowth", Trigger::TurnStart))
            .unwrap_or(0);
        prop_assert!(fired <= max);
        prop_assert_eq!(fired, max.min(turns));
    }

    #[test]
    fn prop_targets_are_always_living(
        enemy_hp in prop::collection::vec(0u32..=2, 1..6),
        seed in any::<u64>(),
    ) {
        let hero = CharacterTemplate::new("hero", "Hero", stats(10, 1));
        let enemies: Vec<CharacterTemplate> = enemy_hp
            .iter()
            .enumerate()
            .map(|(i, &hp)| CharacterTemplate {
                current_hp: Some(hp),
                ..CharacterTemplate::new(format!("foe{}", i), "Foe", stats(2, 0))
            })
            .collect();
        let field = Battlefield::from_rosters(&[hero], &enemies).unwrap();

        let resolver = TargetResolver::new(Some(Arc::new(BehaviorRegistry::with_builtins())));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let actor = &field.player[0];
        let pool: Vec<&Character> = field.iter().collect();

        let selection = resolver.select_target(actor, None, &pool, &mut rng);
        match selection {
            Some(selection) => {
                for id in selection.ids() {
                    let target = field.get(&id).unwrap();
                    prop_assert!(target.is_alive());
                    prop_assert_eq!(target.team, Team::Enemy);
                }
            }
            None => prop_assert_eq!(field.living_count(Team::Enemy), 0),
        }
    }

    #[test]
    fn prop_tracker_reset_clears_turn_scope(passes in 1usize..6) {
        let mut tracker = TriggerTracker::new();
        let id = CharacterId::new("p-1");
        for _ in 0..passes {
            prop_assert!(!tracker.has_fired_this_turn(&id, "Regrowth", Trigger::TurnEnd));
            tracker.record_trigger(&id, "Regrowth", Trigger::TurnEnd);
            prop_assert!(tracker.has_fired_this_turn(&id, "Regrowth", Trigger::TurnEnd));
            tracker.reset_turn_tracking();
        }
        prop_assert_eq!(tracker.trigger_count(&id, "Regrowth", Trigger::TurnEnd), passes as u32);
    }
}
