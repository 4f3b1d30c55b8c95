//! Damage and healing resolution

pub mod damage;
pub mod healing;
pub mod type_chart;

pub use damage::{DamageApplication, DamageOutcome, DamageResolver};
pub use healing::{
    check_and_reset_death_status, DeathStatusChange, HealingApplication, HealingOutcome,
    HealingResolver,
};
pub use type_chart::TypeChart;
