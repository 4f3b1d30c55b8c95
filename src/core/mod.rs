pub mod config;
pub mod error;
pub mod types;

pub use config::{BattleConfig, DamageConfig, TypeChartEntry};
pub use error::{BattleError, BehaviorError, EntityError, Result, SinkError};
pub use types::{CharacterId, DamageType, Element, Stat, Team, Turn};
