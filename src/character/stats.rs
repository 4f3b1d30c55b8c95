//! Base stat block

use serde::{Deserialize, Serialize};

use crate::core::types::Stat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub strength: u32,
    pub intellect: u32,
    pub spirit: u32,
}

impl Stats {
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::Speed => self.speed,
            Stat::Strength => self.strength,
            Stat::Intellect => self.intellect,
            Stat::Spirit => self.spirit,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        match stat {
            Stat::Hp => self.hp = value,
            Stat::Attack => self.attack = value,
            Stat::Defense => self.defense = value,
            Stat::Speed => self.speed = value,
            Stat::Strength => self.strength = value,
            Stat::Intellect => self.intellect = value,
            Stat::Spirit => self.spirit = value,
        }
    }
}
