//! Passive trigger names and fire-once bookkeeping
//!
//! A record is keyed by (character, passive, trigger). The turn scope is
//! cleared at every turn start; the battle scope and counts only at battle
//! start.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::CharacterId;

/// Lifecycle event passives subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    #[serde(rename = "onBattleStart")]
    BattleStart,
    #[serde(rename = "onTurnStart")]
    TurnStart,
    #[serde(rename = "onTurnEnd")]
    TurnEnd,
    #[serde(rename = "onDamageTaken")]
    DamageTaken,
    #[serde(rename = "onDamageDealt")]
    DamageDealt,
    #[serde(rename = "onKill")]
    Kill,
    #[serde(rename = "onAllyDefeated")]
    AllyDefeated,
    #[serde(rename = "onHealed")]
    Healed,
}

impl Trigger {
    pub fn name(self) -> &'static str {
        match self {
            Trigger::BattleStart => "onBattleStart",
            Trigger::TurnStart => "onTurnStart",
            Trigger::TurnEnd => "onTurnEnd",
            Trigger::DamageTaken => "onDamageTaken",
            Trigger::DamageDealt => "onDamageDealt",
            Trigger::Kill => "onKill",
            Trigger::AllyDefeated => "onAllyDefeated",
            Trigger::Healed => "onHealed",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extra context handed to passives alongside the trigger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerData {
    /// Who caused the event (attacker, healer, killer)
    pub source: Option<CharacterId>,
    /// Who the event happened to, when not the passive's owner
    pub target: Option<CharacterId>,
    pub amount: Option<u32>,
    pub ability: Option<String>,
}

impl TriggerData {
    pub fn from_source(source: &CharacterId, amount: u32) -> Self {
        Self {
            source: Some(source.clone()),
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: &CharacterId) -> Self {
        self.target = Some(target.clone());
        self
    }

    pub fn with_ability(mut self, ability: Option<&str>) -> Self {
        self.ability = ability.map(str::to_string);
        self
    }
}

type TriggerKey = (CharacterId, String, Trigger);

fn key(character: &CharacterId, passive_id: &str, trigger: Trigger) -> TriggerKey {
    (character.clone(), passive_id.to_string(), trigger)
}

#[derive(Debug, Clone, Default)]
pub struct TriggerTracker {
    fired_this_turn: AHashSet<TriggerKey>,
    fired_this_battle: AHashSet<TriggerKey>,
    counts: AHashMap<TriggerKey, u32>,
}

impl TriggerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired_this_turn(
        &self,
        character: &CharacterId,
        passive_id: &str,
        trigger: Trigger,
    ) -> bool {
        self.fired_this_turn
            .contains(&key(character, passive_id, trigger))
    }

    pub fn has_fired_this_battle(
        &self,
        character: &CharacterId,
        passive_id: &str,
        trigger: Trigger,
    ) -> bool {
        self.fired_this_battle
            .contains(&key(character, passive_id, trigger))
    }

    /// Mark both scopes and bump the battle-wide count
    pub fn record_trigger(&mut self, character: &CharacterId, passive_id: &str, trigger: Trigger) {
        let k = key(character, passive_id, trigger);
        self.fired_this_turn.insert(k.clone());
        self.fired_this_battle.insert(k.clone());
        *self.counts.entry(k).or_insert(0) += 1;
    }

    pub fn trigger_count(
        &self,
        character: &CharacterId,
        passive_id: &str,
        trigger: Trigger,
    ) -> u32 {
        self.counts
            .get(&key(character, passive_id, trigger))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_reached_max_stacks(
        &self,
        character: &CharacterId,
        passive_id: &str,
        trigger: Trigger,
        max_stacks: u32,
    ) -> bool {
        self.trigger_count(character, passive_id, trigger) >= max_stacks
    }

    /// Called once per turn start
    pub fn reset_turn_tracking(&mut self) {
        self.fired_this_turn.clear();
    }

    /// Called once per battle start
    pub fn reset_battle_tracking(&mut self) {
        self.fired_this_turn.clear();
        self.fired_this_battle.clear();
        self.counts.clear();
    }
}
