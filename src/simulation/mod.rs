//! Time-stepped site simulation

pub mod events;
pub mod intrusion;
pub mod phase;
pub mod report;
pub mod resolver;
pub mod simulator;

pub use events::{Event, EventKind, EventLog};
pub use intrusion::CellRisk;
pub use phase::{is_final_phase, phase_duration, phase_funding, FINAL_PHASE};
pub use report::{CellSnapshot, MapSnapshot, SimulationReport, SimulationStats};
pub use resolver::{EffectiveGrid, InteractionResolver};
pub use simulator::{derive_seed, run_simulation, run_simulation_seeded, RunState, Simulator};
