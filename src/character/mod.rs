//! Characters, their stats and abilities
//!
//! Templates are authored data; `Character` is the live per-battle copy.

pub mod ability;
pub mod combatant;
pub mod stats;

pub use ability::{
    Ability, PassiveAbility, PassiveData, PassiveTarget, StatusApplication, TargetType,
};
pub use combatant::{load_roster, Character, CharacterSnapshot, CharacterTemplate};
pub use stats::Stats;
