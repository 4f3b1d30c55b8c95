//! Target resolution for planned actions
//!
//! Rule order: the ability's explicit targeting logic, then its target
//! type, then inference from the ability itself (heals pick the most
//! wounded ally, utility targets self, area abilities hit all enemies),
//! then the registry default. Any registry miss or behavior failure falls
//! back to a random living enemy.

use rand::seq::SliceRandom;
use rand::RngCore;
use std::sync::Arc;

use crate::behavior::{BehaviorRegistry, TargetSelection, TargetingContext, TargetingRule};
use crate::character::{Ability, Character};
use crate::core::types::CharacterId;

#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    registry: Option<Arc<BehaviorRegistry>>,
}

impl TargetResolver {
    pub fn new(registry: Option<Arc<BehaviorRegistry>>) -> Self {
        Self { registry }
    }

    /// Rule an ability asks for, or `None` to use the registry default
    pub fn rule_for(ability: Option<&Ability>) -> Option<TargetingRule> {
        let ability = ability?;
        if let Some(rule) = &ability.targeting_logic {
            return Some(rule.clone());
        }
        if let Some(target_type) = ability.target_type {
            return Some(target_type.rule());
        }
        if ability.heals() {
            Some(TargetingRule::LowestHpAlly)
        } else if ability.is_utility() {
            Some(TargetingRule::SelfOnly)
        } else if ability.is_aoe {
            Some(TargetingRule::AllEnemies)
        } else {
            None
        }
    }

    /// Pick targets for `actor` from `pool`. Never returns a defeated or
    /// malformed character.
    pub fn select_target(
        &self,
        actor: &Character,
        ability: Option<&Ability>,
        pool: &[&Character],
        rng: &mut dyn RngCore,
    ) -> Option<TargetSelection> {
        let living: Vec<&Character> = pool
            .iter()
            .copied()
            .filter(|c| c.is_alive() && c.is_valid())
            .collect();

        let selection = match self.run_behavior(actor, ability, &living, rng) {
            Some(selection) => selection,
            None => return Self::fallback(actor, &living, rng),
        };

        Self::keep_living(selection, &living)
    }

    fn run_behavior(
        &self,
        actor: &Character,
        ability: Option<&Ability>,
        living: &[&Character],
        rng: &mut dyn RngCore,
    ) -> Option<TargetSelection> {
        let registry = self.registry.as_ref()?;
        let rule = Self::rule_for(ability);

        let behavior = match &rule {
            Some(rule) => registry.targeting(rule).or_else(|| {
                tracing::warn!("targeting rule '{}' is not registered; using default", rule);
                registry.default_targeting()
            }),
            None => registry.default_targeting(),
        }?;

        let ctx = TargetingContext {
            actor,
            ability,
            candidates: living,
        };
        match behavior(&ctx, rng) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::warn!("targeting for {} failed: {}", actor.name, e);
                None
            }
        }
    }

    /// A uniformly random living member of the opposing team
    fn fallback(
        actor: &Character,
        living: &[&Character],
        mut rng: &mut dyn RngCore,
    ) -> Option<TargetSelection> {
        let enemies: Vec<&&Character> = living.iter().filter(|c| c.team != actor.team).collect();
        enemies
            .choose(&mut rng)
            .map(|c| TargetSelection::Single(c.id.clone()))
    }

    fn keep_living(selection: TargetSelection, living: &[&Character]) -> Option<TargetSelection> {
        let is_living = |id: &CharacterId| living.iter().any(|c| &c.id == id);
        match selection {
            TargetSelection::Single(id) if is_living(&id) => Some(TargetSelection::Single(id)),
            TargetSelection::Single(_) => None,
            TargetSelection::Multiple(ids) => {
                let ids: Vec<_> = ids.into_iter().filter(|id| is_living(id)).collect();
                if ids.is_empty() {
                    None
                } else {
                    Some(TargetSelection::Multiple(ids))
                }
            }
        }
    }
}
