//! Timed status effects: catalog, per-character instances and the engine

pub mod catalog;
pub mod engine;
pub mod instance;

pub use catalog::{EffectType, StatusCatalog, StatusEffectDefinition};
pub use engine::{AddOutcome, ShieldAbsorb, StatusEffectEngine, StatusTick, StatusTickReport};
pub use instance::{StatusEffectInstance, PERMANENT};
