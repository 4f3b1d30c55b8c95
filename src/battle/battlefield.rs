//! The two live rosters of one battle

use serde::{Deserialize, Serialize};

use crate::character::{Character, CharacterSnapshot, CharacterTemplate};
use crate::core::error::{BattleError, Result};
use crate::core::types::{CharacterId, Team};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Battlefield {
    pub player: Vec<Character>,
    pub enemy: Vec<Character>,
}

impl Battlefield {
    /// Copy both rosters into fresh combatants
    pub fn from_rosters(player: &[CharacterTemplate], enemy: &[CharacterTemplate]) -> Result<Self> {
        Ok(Self {
            player: Self::copy_roster(player, Team::Player)?,
            enemy: Self::copy_roster(enemy, Team::Enemy)?,
        })
    }

    fn copy_roster(roster: &[CharacterTemplate], team: Team) -> Result<Vec<Character>> {
        if roster.is_empty() {
            return Err(BattleError::EmptyRoster(team));
        }
        roster
            .iter()
            .enumerate()
            .map(|(slot, template)| {
                template
                    .validate()
                    .map_err(|reason| BattleError::InvalidTemplate {
                        name: template.name.clone(),
                        reason,
                    })?;
                Ok(Character::from_template(template, team, slot))
            })
            .collect()
    }

    pub fn team(&self, team: Team) -> &[Character] {
        match team {
            Team::Player => &self.player,
            Team::Enemy => &self.enemy,
        }
    }

    pub fn team_mut(&mut self, team: Team) -> &mut Vec<Character> {
        match team {
            Team::Player => &mut self.player,
            Team::Enemy => &mut self.enemy,
        }
    }

    /// Player roster first, then enemy, each in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.player.iter().chain(self.enemy.iter())
    }

    pub fn ids(&self) -> Vec<CharacterId> {
        self.iter().map(|c| c.id.clone()).collect()
    }

    pub fn get(&self, id: &CharacterId) -> Option<&Character> {
        self.iter().find(|c| &c.id == id)
    }

    pub fn get_mut(&mut self, id: &CharacterId) -> Option<&mut Character> {
        self.player
            .iter_mut()
            .chain(self.enemy.iter_mut())
            .find(|c| &c.id == id)
    }

    pub fn name_of(&self, id: &CharacterId) -> String {
        self.get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn living_count(&self, team: Team) -> usize {
        self.team(team).iter().filter(|c| c.is_alive()).count()
    }

    /// Living, well-formed characters from both teams
    pub fn candidates(&self) -> Vec<&Character> {
        self.iter().filter(|c| c.is_alive() && c.is_valid()).collect()
    }

    pub fn living(&self, team: Team) -> Vec<&Character> {
        self.team(team).iter().filter(|c| c.is_alive()).collect()
    }

    pub fn snapshots(&self, team: Team) -> Vec<CharacterSnapshot> {
        self.team(team).iter().map(Character::snapshot).collect()
    }
}
