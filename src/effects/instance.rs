//! Per-character active effect

use serde::{Deserialize, Serialize};

use crate::core::types::Stat;
use crate::effects::catalog::{EffectType, StatusEffectDefinition};

/// Duration marker for effects that never expire on their own
pub const PERMANENT: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectInstance {
    pub effect_id: String,
    pub name: String,
    pub effect_type: EffectType,
    /// Turns left; `PERMANENT` never counts down
    pub remaining_duration: i32,
    pub stacks: u32,
    pub source: String,
    /// Per-stack value copied from the definition
    pub value: f64,
    pub stat: Option<Stat>,
    pub revives: bool,
    /// Absorb pool left on a shield
    pub shield_remaining: u32,
}

impl StatusEffectInstance {
    pub fn from_definition(def: &StatusEffectDefinition, duration: i32, source: &str) -> Self {
        let mut instance = Self {
            effect_id: def.id.clone(),
            name: def.name.clone(),
            effect_type: def.effect_type,
            remaining_duration: duration,
            stacks: 1,
            source: source.to_string(),
            value: def.value,
            stat: def.stat,
            revives: def.revives,
            shield_remaining: 0,
        };
        instance.reset_shield();
        instance
    }

    pub fn is_permanent(&self) -> bool {
        self.remaining_duration == PERMANENT
    }

    /// Periodic amount for all stacks
    pub fn total_value(&self) -> f64 {
        self.value * self.stacks as f64
    }

    pub(crate) fn reset_shield(&mut self) {
        if self.effect_type == EffectType::Shield {
            self.shield_remaining = self.total_value().max(0.0).round() as u32;
        }
    }

    /// Count down one turn. Returns true once the effect has expired.
    pub fn tick_duration(&mut self) -> bool {
        if self.is_permanent() {
            return false;
        }
        self.remaining_duration = (self.remaining_duration - 1).max(0);
        self.remaining_duration == 0
    }

    /// Whether `duration` should replace the current one on refresh
    pub fn is_longer(&self, duration: i32) -> bool {
        if self.is_permanent() {
            return false;
        }
        duration == PERMANENT || duration > self.remaining_duration
    }
}
