pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{config, set_config, SimulationConfig};
pub use error::{ConfigurationError, InvariantViolation, Result, SiteError};
pub use types::{Attribute, AttributeSet, Position, Profile, TechLevel};
