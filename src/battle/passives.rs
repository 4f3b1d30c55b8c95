//! Passive ability dispatch
//!
//! Finds a character's passives for a trigger, gates them through the
//! trigger tracker and runs their behaviors. Behaviors only describe
//! effects; the orchestrator applies the returned `PassiveResult`s.

use rand::RngCore;
use std::sync::Arc;

use crate::battle::battlefield::Battlefield;
use crate::battle::triggers::{Trigger, TriggerData, TriggerTracker};
use crate::behavior::{BehaviorRegistry, PassiveContext, PassiveEffect};
use crate::core::error::EntityError;
use crate::core::types::CharacterId;

/// A passive that fired
#[derive(Debug, Clone, PartialEq)]
pub struct PassiveResult {
    pub character: CharacterId,
    pub passive: String,
    pub trigger: Trigger,
    pub message: String,
    pub effects: Vec<PassiveEffect>,
}

#[derive(Debug, Clone, Default)]
pub struct PassiveEngine {
    registry: Option<Arc<BehaviorRegistry>>,
}

impl PassiveEngine {
    pub fn new(registry: Option<Arc<BehaviorRegistry>>) -> Self {
        Self { registry }
    }

    /// Run every eligible passive `character_id` has for `trigger`.
    ///
    /// Without a tracker nothing is gated: passives fire every time their
    /// trigger does.
    pub fn process_passives(
        &self,
        trigger: Trigger,
        character_id: &CharacterId,
        data: &TriggerData,
        field: &Battlefield,
        mut tracker: Option<&mut TriggerTracker>,
        rng: &mut dyn RngCore,
    ) -> Vec<PassiveResult> {
        let mut results = Vec::new();

        let Some(registry) = self.registry.as_ref() else {
            return results;
        };
        let Some(actor) = field.get(character_id) else {
            tracing::warn!("process_passives: unknown character {}", character_id);
            return results;
        };
        if let Err(e) = actor.validate() {
            tracing::warn!("process_passives: skipping {}: {}", actor.id, e);
            return results;
        }
        if actor.passive_abilities.is_empty() {
            tracing::trace!("process_passives: {}", EntityError::NoPassives);
            return results;
        }
        if !actor.is_alive() {
            return results;
        }

        let allies = field.living(actor.team);
        let enemies = field.living(actor.team.opponent());

        for passive in actor.passive_abilities.iter().filter(|p| p.trigger == trigger) {
            let Some(behavior) = registry.passive(&passive.behavior) else {
                tracing::debug!("passive behavior '{}' is not registered", passive.behavior);
                continue;
            };
            let passive_id = passive.passive_id();

            if let Some(tracker) = tracker.as_deref() {
                if tracker.has_fired_this_turn(&actor.id, passive_id, trigger) {
                    continue;
                }
                if trigger == Trigger::BattleStart
                    && tracker.has_fired_this_battle(&actor.id, passive_id, trigger)
                {
                    continue;
                }
                if let Some(max) = passive.passive_data.max_triggers {
                    if tracker.has_reached_max_stacks(&actor.id, passive_id, trigger, max) {
                        continue;
                    }
                }
            }

            let ctx = PassiveContext {
                actor,
                passive,
                trigger,
                data,
                allies: &allies,
                enemies: &enemies,
            };
            match behavior(&ctx, rng) {
                Ok(outcome) if outcome.executed => {
                    if let Some(tracker) = tracker.as_deref_mut() {
                        tracker.record_trigger(&actor.id, passive_id, trigger);
                    }
                    tracing::debug!("{} [{}]: {}", actor.name, trigger, outcome.message);
                    results.push(PassiveResult {
                        character: actor.id.clone(),
                        passive: passive.name.clone(),
                        trigger,
                        message: outcome.message,
                        effects: outcome.effects,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("passive '{}' on {} failed: {}", passive.name, actor.name, e);
                }
            }
        }

        results
    }
}
