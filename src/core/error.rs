use thiserror::Error;

use crate::core::types::Position;

/// Static-data problems: raised while loading the catalog or building a map,
/// never recovered mid-run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Unknown marker: {0}")]
    UnknownMarker(String),

    #[error("Unknown decay curve '{curve}' on marker '{marker}'")]
    UnknownCurve { marker: String, curve: String },

    #[error("Malformed tag '{tag}' on marker '{marker}'")]
    MalformedTag { marker: String, tag: String },

    #[error("Marker '{marker}' references undefined synergy partnership '{suffix}'")]
    UnknownPartnership { marker: String, suffix: String },

    #[error("Unknown global buff: {0}")]
    UnknownBuff(String),

    #[error("Invalid {attribute} profile on marker '{marker}': {reason}")]
    InvalidProfile {
        marker: String,
        attribute: String,
        reason: String,
    },

    #[error("Duplicate marker key: {0}")]
    DuplicateMarker(String),

    #[error("Marker '{marker}' ruins into unknown marker '{ruin}'")]
    UnknownRuin { marker: String, ruin: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Caller mistakes rejected at the simulation entry point before any step runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("Simulation duration must be positive, got {0} years")]
    NonPositiveDuration(u32),

    #[error("Elapsed time must be a non-negative finite number, got {0}")]
    NegativeElapsed(f32),

    #[error("Position {position} is outside the {width}x{height} site")]
    PositionOutOfBounds {
        position: Position,
        width: usize,
        height: usize,
    },

    #[error("Global buff '{0}' has a non-finite magnitude")]
    NonFiniteBuff(String),
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SiteError>;
