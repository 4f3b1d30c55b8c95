//! Behavior registry: named strategy functions for targeting, action
//! decisions and passive effects
//!
//! Behaviors are pure with respect to battle state. They read characters
//! through their context and return a selection or an outcome; the caller
//! applies it. Failures come back as `BehaviorError` values.

use ahash::AHashMap;
use rand::RngCore;
use std::fmt;
use std::sync::Arc;

use crate::battle::triggers::{Trigger, TriggerData};
use crate::behavior::ids::{DecisionRule, PassiveRule, TargetingRule};
use crate::behavior::{decision, passive, targeting};
use crate::character::{Ability, Character, PassiveAbility};
use crate::core::error::BehaviorError;
use crate::core::types::CharacterId;

pub type BehaviorResult<T> = std::result::Result<T, BehaviorError>;

/// What a targeting behavior picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    Single(CharacterId),
    Multiple(Vec<CharacterId>),
}

impl TargetSelection {
    pub fn ids(&self) -> Vec<CharacterId> {
        match self {
            TargetSelection::Single(id) => vec![id.clone()],
            TargetSelection::Multiple(ids) => ids.clone(),
        }
    }
}

/// Input to a targeting behavior
pub struct TargetingContext<'a> {
    pub actor: &'a Character,
    pub ability: Option<&'a Ability>,
    /// Living, valid characters from both teams
    pub candidates: &'a [&'a Character],
}

impl<'a> TargetingContext<'a> {
    pub fn enemies(&self) -> Vec<&'a Character> {
        self.candidates
            .iter()
            .copied()
            .filter(|c| c.team != self.actor.team)
            .collect()
    }

    /// Allies including the actor
    pub fn allies(&self) -> Vec<&'a Character> {
        self.candidates
            .iter()
            .copied()
            .filter(|c| c.team == self.actor.team)
            .collect()
    }
}

/// Input to an action-decision behavior
pub struct DecisionContext<'a> {
    pub actor: &'a Character,
    /// Abilities ready this turn; the behavior answers with an index into it
    pub available: &'a [&'a Ability],
    pub allies: &'a [&'a Character],
    pub enemies: &'a [&'a Character],
}

/// Input to a passive behavior
pub struct PassiveContext<'a> {
    pub actor: &'a Character,
    pub passive: &'a PassiveAbility,
    pub trigger: Trigger,
    pub data: &'a TriggerData,
    /// Living allies including the actor
    pub allies: &'a [&'a Character],
    pub enemies: &'a [&'a Character],
}

/// State change a passive asks the battle to make
#[derive(Debug, Clone, PartialEq)]
pub enum PassiveEffect {
    Heal {
        target: CharacterId,
        amount: u32,
    },
    Damage {
        target: CharacterId,
        amount: u32,
    },
    ApplyStatus {
        target: CharacterId,
        status_id: String,
        duration: Option<i32>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassiveOutcome {
    pub executed: bool,
    pub message: String,
    pub effects: Vec<PassiveEffect>,
}

impl PassiveOutcome {
    /// Conditions not met; nothing happens and the trigger is not recorded
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn executed(message: impl Into<String>, effects: Vec<PassiveEffect>) -> Self {
        Self {
            executed: true,
            message: message.into(),
            effects,
        }
    }
}

pub type TargetingFn = Arc<
    dyn Fn(&TargetingContext<'_>, &mut dyn RngCore) -> BehaviorResult<Option<TargetSelection>>
        + Send
        + Sync,
>;
pub type DecisionFn = Arc<
    dyn Fn(&DecisionContext<'_>, &mut dyn RngCore) -> BehaviorResult<Option<usize>>
        + Send
        + Sync,
>;
pub type PassiveFn = Arc<
    dyn Fn(&PassiveContext<'_>, &mut dyn RngCore) -> BehaviorResult<PassiveOutcome>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct BehaviorRegistry {
    targeting: AHashMap<TargetingRule, TargetingFn>,
    decisions: AHashMap<DecisionRule, DecisionFn>,
    passives: AHashMap<PassiveRule, PassiveFn>,
    /// Decision functions for specific roster templates, by template id
    decision_overrides: AHashMap<String, DecisionFn>,
    default_targeting: TargetingRule,
    default_decision: DecisionRule,
}

impl BehaviorRegistry {
    /// An empty registry; every lookup misses
    pub fn new() -> Self {
        Self {
            targeting: AHashMap::new(),
            decisions: AHashMap::new(),
            passives: AHashMap::new(),
            decision_overrides: AHashMap::new(),
            default_targeting: TargetingRule::RandomEnemy,
            default_decision: DecisionRule::Default,
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_targeting(TargetingRule::RandomEnemy, targeting::random_enemy);
        registry.register_targeting(TargetingRule::LowestHpEnemy, targeting::lowest_hp_enemy);
        registry.register_targeting(
            TargetingRule::HighestAttackEnemy,
            targeting::highest_attack_enemy,
        );
        registry.register_targeting(TargetingRule::LowestHpAlly, targeting::lowest_hp_ally);
        registry.register_targeting(TargetingRule::RandomAlly, targeting::random_ally);
        registry.register_targeting(TargetingRule::SelfOnly, targeting::self_only);
        registry.register_targeting(TargetingRule::AllEnemies, targeting::all_enemies);
        registry.register_targeting(TargetingRule::AllAllies, targeting::all_allies);

        registry.register_decision(DecisionRule::Default, decision::default_decision);
        registry.register_decision(DecisionRule::Aggressive, decision::aggressive);
        registry.register_decision(DecisionRule::Support, decision::support);

        registry.register_passive(PassiveRule::Regenerate, passive::regenerate);
        registry.register_passive(PassiveRule::ApplyStatus, passive::apply_status);
        registry.register_passive(PassiveRule::Thorns, passive::thorns);
        registry.register_passive(PassiveRule::SecondWind, passive::second_wind);

        registry
    }

    pub fn register_targeting<F>(&mut self, rule: TargetingRule, f: F)
    where
        F: Fn(&TargetingContext<'_>, &mut dyn RngCore) -> BehaviorResult<Option<TargetSelection>>
            + Send
            + Sync
            + 'static,
    {
        self.targeting.insert(rule, Arc::new(f));
    }

    pub fn register_decision<F>(&mut self, rule: DecisionRule, f: F)
    where
        F: Fn(&DecisionContext<'_>, &mut dyn RngCore) -> BehaviorResult<Option<usize>>
            + Send
            + Sync
            + 'static,
    {
        self.decisions.insert(rule, Arc::new(f));
    }

    /// Decision function used for every character built from `template_id`
    pub fn register_decision_override<F>(&mut self, template_id: impl Into<String>, f: F)
    where
        F: Fn(&DecisionContext<'_>, &mut dyn RngCore) -> BehaviorResult<Option<usize>>
            + Send
            + Sync
            + 'static,
    {
        self.decision_overrides.insert(template_id.into(), Arc::new(f));
    }

    pub fn register_passive<F>(&mut self, rule: PassiveRule, f: F)
    where
        F: Fn(&PassiveContext<'_>, &mut dyn RngCore) -> BehaviorResult<PassiveOutcome>
            + Send
            + Sync
            + 'static,
    {
        self.passives.insert(rule, Arc::new(f));
    }

    pub fn targeting(&self, rule: &TargetingRule) -> Option<&TargetingFn> {
        self.targeting.get(rule)
    }

    pub fn default_targeting(&self) -> Option<&TargetingFn> {
        self.targeting.get(&self.default_targeting)
    }

    /// Template override, then the character's named rule, then the default
    pub fn decision_for(&self, character: &Character) -> Option<&DecisionFn> {
        if let Some(f) = self.decision_overrides.get(&character.template_id) {
            return Some(f);
        }
        if let Some(rule) = &character.decision_rule {
            match self.decisions.get(rule) {
                Some(f) => return Some(f),
                None => tracing::warn!(
                    "decision rule '{}' for {} is not registered; using default",
                    rule,
                    character.name
                ),
            }
        }
        self.decisions.get(&self.default_decision)
    }

    pub fn passive(&self, rule: &PassiveRule) -> Option<&PassiveFn> {
        self.passives.get(rule)
    }

    pub fn has_passive(&self, rule: &PassiveRule) -> bool {
        self.passives.contains_key(rule)
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("targeting", &self.targeting.keys().collect::<Vec<_>>())
            .field("decisions", &self.decisions.keys().collect::<Vec<_>>())
            .field("passives", &self.passives.keys().collect::<Vec<_>>())
            .field(
                "decision_overrides",
                &self.decision_overrides.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
