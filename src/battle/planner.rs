//! Action planning: one immutable `Action` per living, able combatant
//!
//! Planning picks an ability and targets and previews the amounts. Health
//! is never touched here; the orchestrator applies the action when it runs.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::battle::battlefield::Battlefield;
use crate::battle::targeting::TargetResolver;
use crate::behavior::{BehaviorRegistry, DecisionContext};
use crate::character::{Ability, Character};
use crate::core::error::{BehaviorError, EntityError};
use crate::core::types::{CharacterId, DamageType, Team};
use crate::resolution::{DamageResolver, HealingResolver};

/// Chance of using a random ready ability when the decision behavior fails
const FALLBACK_ABILITY_CHANCE: f64 = 0.5;

/// Why no action was planned for a character
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanSkip {
    #[error("character not on the battlefield")]
    Missing,
    #[error("character failed validation: {0}")]
    Invalid(EntityError),
    #[error("character is defeated")]
    Dead,
    #[error("character is stunned")]
    Stunned,
    #[error("no valid target")]
    NoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Attack,
    Heal,
    Utility,
}

/// Previewed effect on one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedHit {
    pub target: CharacterId,
    pub amount: u32,
    pub is_critical: bool,
    pub scaling_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub actor: CharacterId,
    pub actor_name: String,
    pub team: Team,
    /// `None` is a basic attack
    pub ability: Option<Ability>,
    pub kind: ActionKind,
    pub damage_type: DamageType,
    pub hits: Vec<PlannedHit>,
}

impl Action {
    pub fn is_basic_attack(&self) -> bool {
        self.ability.is_none()
    }

    pub fn ability_name(&self) -> &str {
        self.ability.as_ref().map(|a| a.name.as_str()).unwrap_or("Attack")
    }

    pub fn targets(&self) -> Vec<CharacterId> {
        self.hits.iter().map(|h| h.target.clone()).collect()
    }

    pub fn is_critical(&self) -> bool {
        self.hits.iter().any(|h| h.is_critical)
    }
}

#[derive(Debug, Clone)]
pub struct ActionPlanner {
    registry: Option<Arc<BehaviorRegistry>>,
    targets: TargetResolver,
    damage: DamageResolver,
    healing: HealingResolver,
    default_cooldown: u32,
}

impl ActionPlanner {
    pub fn new(
        registry: Option<Arc<BehaviorRegistry>>,
        damage: DamageResolver,
        healing: HealingResolver,
        default_cooldown: u32,
    ) -> Self {
        Self {
            targets: TargetResolver::new(registry.clone()),
            registry,
            damage,
            healing,
            default_cooldown,
        }
    }

    /// Decide what `actor_id` does this turn.
    ///
    /// Mutates only the actor's team tag and, once a target resolves, the
    /// chosen ability's cooldown.
    pub fn plan_action(
        &self,
        actor_id: &CharacterId,
        team: Team,
        field: &mut Battlefield,
        rng: &mut dyn RngCore,
    ) -> Result<Action, PlanSkip> {
        let actor = field.get_mut(actor_id).ok_or(PlanSkip::Missing)?;
        actor.validate().map_err(PlanSkip::Invalid)?;
        if !actor.is_alive() {
            return Err(PlanSkip::Dead);
        }
        if actor.is_stunned() {
            return Err(PlanSkip::Stunned);
        }
        actor.team = team;

        let (ability_index, action) = {
            let field = &*field;
            let actor = field.get(actor_id).ok_or(PlanSkip::Missing)?;
            let ability_index = self.choose_ability(actor, field, rng);
            let ability = ability_index.map(|i| &actor.abilities[i]);

            let candidates = field.candidates();
            let selection = self
                .targets
                .select_target(actor, ability, &candidates, rng)
                .ok_or(PlanSkip::NoTarget)?;

            let kind = match ability {
                Some(a) if a.heals() => ActionKind::Heal,
                Some(a) if a.is_utility() => ActionKind::Utility,
                _ => ActionKind::Attack,
            };

            let hits = selection
                .ids()
                .into_iter()
                .filter_map(|id| field.get(&id))
                .map(|target| self.preview(actor, target, ability, kind, rng))
                .collect();

            let action = Action {
                actor: actor.id.clone(),
                actor_name: actor.name.clone(),
                team,
                ability: ability.cloned(),
                kind,
                damage_type: ability.map(|a| a.damage_type).unwrap_or(DamageType::Physical),
                hits,
            };
            (ability_index, action)
        };

        if let Some(i) = ability_index {
            if let Some(actor) = field.get_mut(actor_id) {
                let ability = &mut actor.abilities[i];
                ability.current_cooldown = ability.cooldown.unwrap_or(self.default_cooldown);
            }
        }

        tracing::debug!(
            "{} plans {} on {:?}",
            action.actor_name,
            action.ability_name(),
            action.targets()
        );
        Ok(action)
    }

    /// Preview one hit against `target` without applying it
    pub fn preview(
        &self,
        actor: &Character,
        target: &Character,
        ability: Option<&Ability>,
        kind: ActionKind,
        rng: &mut dyn RngCore,
    ) -> PlannedHit {
        match (kind, ability) {
            (ActionKind::Heal, Some(ability)) => {
                let outcome = self.healing.compute_healing(actor, ability, rng);
                PlannedHit {
                    target: target.id.clone(),
                    amount: outcome.amount,
                    is_critical: outcome.is_critical,
                    scaling_text: outcome.scaling_text,
                }
            }
            (ActionKind::Utility, _) => PlannedHit {
                target: target.id.clone(),
                amount: 0,
                is_critical: false,
                scaling_text: String::new(),
            },
            _ => {
                let outcome = self.damage.compute_damage(actor, target, ability, rng);
                PlannedHit {
                    target: target.id.clone(),
                    amount: outcome.amount,
                    is_critical: outcome.is_critical,
                    scaling_text: outcome.scaling_text,
                }
            }
        }
    }

    /// Index into `actor.abilities`, or `None` for a basic attack
    fn choose_ability(
        &self,
        actor: &Character,
        field: &Battlefield,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        let ready: Vec<usize> = actor
            .abilities
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_ready())
            .map(|(i, _)| i)
            .collect();
        if ready.is_empty() {
            return None;
        }

        match self.decide(actor, field, &ready, rng) {
            Ok(choice) => choice.map(|i| ready[i]),
            Err(e) => {
                tracing::warn!("decision for {} failed: {}; choosing at random", actor.name, e);
                if rng.gen_bool(FALLBACK_ABILITY_CHANCE) {
                    ready.choose(rng).copied()
                } else {
                    None
                }
            }
        }
    }

    fn decide(
        &self,
        actor: &Character,
        field: &Battlefield,
        ready: &[usize],
        rng: &mut dyn RngCore,
    ) -> Result<Option<usize>, BehaviorError> {
        let behavior = self
            .registry
            .as_ref()
            .and_then(|r| r.decision_for(actor))
            .ok_or_else(|| BehaviorError::Failed("no decision behavior registered".into()))?;

        let available: Vec<&Ability> = ready.iter().map(|&i| &actor.abilities[i]).collect();
        let allies = field.living(actor.team);
        let enemies = field.living(actor.team.opponent());
        let ctx = DecisionContext {
            actor,
            available: &available,
            allies: &allies,
            enemies: &enemies,
        };

        match behavior(&ctx, rng)? {
            Some(index) if index >= available.len() => Err(BehaviorError::InvalidSelection {
                index,
                len: available.len(),
            }),
            choice => Ok(choice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::DecisionRule;
    use crate::character::{CharacterTemplate, Stats};
    use crate::core::config::DamageConfig;
    use crate::effects::StatusEffectEngine;
    use crate::resolution::TypeChart;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn planner(registry: Option<BehaviorRegistry>) -> ActionPlanner {
        ActionPlanner::new(
            registry.map(Arc::new),
            DamageResolver::new(DamageConfig::deterministic(), TypeChart::builtin()),
            HealingResolver::new(DamageConfig::deterministic()),
            3,
        )
    }

    fn duel() -> Battlefield {
        let attacker = CharacterTemplate::new(
            "vaelgar",
            "Vaelgar",
            Stats {
                hp: 50,
                attack: 20,
                strength: 10,
                ..Stats::default()
            },
        );
        let defender = CharacterTemplate::new(
            "dummy",
            "Dummy",
            Stats {
                hp: 30,
                ..Stats::default()
            },
        );
        Battlefield::from_rosters(&[attacker], &[defender]).unwrap()
    }

    fn p1() -> CharacterId {
        CharacterId::new("p-1")
    }

    #[test]
    fn test_basic_attack_preview_does_not_touch_health() {
        let mut field = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let action = planner(Some(BehaviorRegistry::with_builtins()))
            .plan_action(&p1(), Team::Player, &mut field, &mut rng)
            .unwrap();

        assert!(action.is_basic_attack());
        assert_eq!(action.kind, ActionKind::Attack);
        assert_eq!(action.hits.len(), 1);
        assert_eq!(action.hits[0].target, CharacterId::new("e-1"));
        assert_eq!(action.hits[0].amount, 20);
        assert_eq!(field.enemy[0].current_hp, 30);
    }

    #[test]
    fn test_missing_and_dead_characters_skipped() {
        let mut field = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let planner = planner(Some(BehaviorRegistry::with_builtins()));

        assert_eq!(
            planner.plan_action(&CharacterId::new("p-7"), Team::Player, &mut field, &mut rng),
            Err(PlanSkip::Missing)
        );

        field.player[0].current_hp = 0;
        field.player[0].is_dead = true;
        assert_eq!(
            planner.plan_action(&p1(), Team::Player, &mut field, &mut rng),
            Err(PlanSkip::Dead)
        );
    }

    #[test]
    fn test_invalid_character_skipped() {
        let mut field = duel();
        field.player[0].name.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(
            planner(None).plan_action(&p1(), Team::Player, &mut field, &mut rng),
            Err(PlanSkip::Invalid(EntityError::MissingName))
        );
    }

    #[test]
    fn test_stunned_character_skipped_until_effect_ends() {
        let mut field = duel();
        let engine = StatusEffectEngine::default();
        engine.add_effect(&mut field.player[0], "stun", Some(2), "Dummy");
        let planner = planner(Some(BehaviorRegistry::with_builtins()));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..2 {
            assert_eq!(
                planner.plan_action(&p1(), Team::Player, &mut field, &mut rng),
                Err(PlanSkip::Stunned)
            );
            engine.tick_control_effects(&mut field.player[0]);
        }
        assert!(planner.plan_action(&p1(), Team::Player, &mut field, &mut rng).is_ok());
    }

    #[test]
    fn test_no_living_enemy_is_no_target() {
        let mut field = duel();
        field.enemy[0].current_hp = 0;
        field.enemy[0].is_dead = true;
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(
            planner(Some(BehaviorRegistry::with_builtins()))
                .plan_action(&p1(), Team::Player, &mut field, &mut rng),
            Err(PlanSkip::NoTarget)
        );
    }

    #[test]
    fn test_chosen_ability_goes_on_cooldown() {
        let mut field = duel();
        field.player[0].abilities = vec![
            Ability::new("Slash", 18, DamageType::Physical),
            Ability::new("Smash", 30, DamageType::Physical).with_cooldown(4),
        ];
        field.player[0].decision_rule = Some(DecisionRule::Aggressive);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let planner = planner(Some(BehaviorRegistry::with_builtins()));

        let first = planner.plan_action(&p1(), Team::Player, &mut field, &mut rng).unwrap();
        assert_eq!(first.ability_name(), "Smash");
        assert_eq!(field.player[0].abilities[1].current_cooldown, 4);

        let second = planner.plan_action(&p1(), Team::Player, &mut field, &mut rng).unwrap();
        assert_eq!(second.ability_name(), "Slash");
        assert_eq!(field.player[0].abilities[0].current_cooldown, 3);

        let third = planner.plan_action(&p1(), Team::Player, &mut field, &mut rng).unwrap();
        assert!(third.is_basic_attack());
    }

    #[test]
    fn test_out_of_range_decision_falls_back() {
        let mut registry = BehaviorRegistry::with_builtins();
        registry.register_decision_override("vaelgar", |_, _| Ok(Some(99)));
        let planner = planner(Some(registry));

        let mut field = duel();
        field.player[0].abilities = vec![Ability::new("Slash", 18, DamageType::Physical)];
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..10 {
            field.player[0].abilities[0].current_cooldown = 0;
            let action = planner.plan_action(&p1(), Team::Player, &mut field, &mut rng).unwrap();
            assert!(action.is_basic_attack() || action.ability_name() == "Slash");
        }
    }

    #[test]
    fn test_heal_ability_targets_wounded_ally() {
        let mut field = duel();
        field.player[0].current_hp = 10;
        field.player[0].abilities = vec![Ability::new("Mend", 20, DamageType::Healing)];
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let action = planner(Some(BehaviorRegistry::with_builtins()))
            .plan_action(&p1(), Team::Player, &mut field, &mut rng)
            .unwrap();
        assert_eq!(action.kind, ActionKind::Heal);
        assert_eq!(action.targets(), vec![p1()]);
        assert_eq!(field.player[0].current_hp, 10);
    }
}
