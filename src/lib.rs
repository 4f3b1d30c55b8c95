//! Skirmish Engine - turn-based auto-battler combat core
//!
//! Two rosters go in, a battle log and an event stream come out. Everything
//! a combatant decides (which ability, which target, what a passive does)
//! goes through the behavior registry so it can be swapped per character.

pub mod battle;
pub mod behavior;
pub mod character;
pub mod core;
pub mod effects;
pub mod resolution;

pub use battle::{BattleEvent, BattleOrchestrator, BattleOutcome, BattleReport, EndReason};
pub use behavior::BehaviorRegistry;
pub use character::{Character, CharacterTemplate};
pub use crate::core::{BattleConfig, BattleError, Result};
pub use effects::StatusCatalog;
