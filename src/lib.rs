//! Place of Honor - long-term deterrence simulation for nuclear-waste sites
//!
//! Markers placed around a waste core decay over millennia, interact through
//! their tags, and either keep future societies away or let them breach the
//! site. [`run_simulation`] is the entry point.

pub mod core;
pub mod markers;
pub mod simulation;
pub mod site;

pub use crate::core::{Result, SiteError};
pub use markers::MarkerCatalog;
pub use simulation::{run_simulation, run_simulation_seeded, RunState, SimulationReport};
pub use site::{GlobalBuffs, SiteMap};
