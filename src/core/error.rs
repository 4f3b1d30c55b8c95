use thiserror::Error;

use crate::core::types::Team;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Roster is empty: {0}")]
    EmptyRoster(Team),

    #[error("Invalid character template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: EntityError },

    #[error("A battle is already in progress")]
    AlreadyActive,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Entity-shape validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("missing name")]
    MissingName,

    #[error("max hp must be positive")]
    ZeroMaxHp,

    #[error("current hp {current} exceeds max hp {max}")]
    HpAboveMax { current: u32, max: u32 },

    #[error("no passive abilities")]
    NoPassives,
}

/// Failures raised by pluggable behaviors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BehaviorError {
    #[error("behavior failed: {0}")]
    Failed(String),

    #[error("selected index {index} out of {len} options")]
    InvalidSelection { index: usize, len: usize },

    #[error("missing passive data field: {0}")]
    MissingData(&'static str),
}

/// An event listener refused or failed to handle an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("event sink error: {0}")]
pub struct SinkError(pub String);

pub type Result<T> = std::result::Result<T, BattleError>;
