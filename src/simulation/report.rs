//! Simulation report and serialization

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{AttributeSet, Position, TechLevel};
use crate::simulation::events::{EventKind, EventLog};
use crate::simulation::simulator::RunState;

/// Complete result of one run, handed to the presentation layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub outcome: RunState,
    pub duration_years: u32,
    pub events: EventLog,
    pub snapshots: Vec<MapSnapshot>,
    pub statistics: SimulationStats,
}

/// State of the map at the end of one step, for playback
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub step: u32,
    pub year: f32,
    pub tech: TechLevel,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub position: Position,
    pub marker: String,
    pub ruined: bool,
    pub damage: f32,
    pub risk: f32,
    pub effective: AttributeSet,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub seed: u64,
    pub steps_run: u32,
    pub years_simulated: f32,
    pub total_events: u32,
    pub intrusion_attempts: u32,
    pub intrusions_repelled: u32,
    pub intrusions_succeeded: u32,
    pub markers_ruined: u32,
    /// Highest single-cell risk seen during the run
    pub peak_risk: f32,
}

impl SimulationStats {
    pub fn from_log(log: &EventLog, seed: u64, steps_run: u32, years_simulated: f32, peak_risk: f32) -> Self {
        let mut stats = Self {
            seed,
            steps_run,
            years_simulated,
            total_events: log.len() as u32,
            peak_risk,
            ..Self::default()
        };
        for event in log.iter() {
            match event.kind {
                EventKind::IntrusionRepelled { .. } => stats.intrusions_repelled += 1,
                EventKind::IntrusionSucceeded { .. } | EventKind::Breach { .. } => {
                    stats.intrusions_succeeded += 1
                }
                EventKind::MarkerRuined { .. } => stats.markers_ruined += 1,
            }
        }
        stats.intrusion_attempts = stats.intrusions_repelled + stats.intrusions_succeeded;
        stats
    }
}

impl SimulationReport {
    pub fn breached(&self) -> bool {
        self.outcome == RunState::Breached
    }

    pub fn completed(&self) -> bool {
        self.outcome == RunState::Completed
    }

    /// Position and year of the breach, if the run failed
    pub fn breach(&self) -> Option<(Position, f32)> {
        self.events.iter().find_map(|e| match e.kind {
            EventKind::Breach { position } => Some((position, e.year)),
            _ => None,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        let verdict = match self.breach() {
            Some((pos, year)) => format!("The site was breached at {} in year {:.0}", pos, year),
            None => format!("The site went {} years undisturbed", self.duration_years),
        };
        format!(
            "{}\n{} steps over {:.0} years (seed {:#018x})\n{} intrusion attempts: {} repelled, {} succeeded; {} markers ruined",
            verdict,
            self.statistics.steps_run,
            self.statistics.years_simulated,
            self.statistics.seed,
            self.statistics.intrusion_attempts,
            self.statistics.intrusions_repelled,
            self.statistics.intrusions_succeeded,
            self.statistics.markers_ruined,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> EventLog {
        let mut log = EventLog::new();
        let p = Position::new(0, 0);
        log.add_event(EventKind::IntrusionRepelled { position: p, risk: 0.5 }, 1, 10.0, TechLevel::Low);
        log.add_event(
            EventKind::IntrusionSucceeded { position: p, risk: 0.5, damage: 0.25 },
            2,
            20.0,
            TechLevel::Low,
        );
        log.add_event(EventKind::Breach { position: Position::new(1, 1) }, 3, 30.0, TechLevel::Low);
        log
    }

    #[test]
    fn test_stats_count_breach_as_success() {
        let stats = SimulationStats::from_log(&log(), 7, 3, 30.0, 0.5);
        assert_eq!(stats.intrusion_attempts, 3);
        assert_eq!(stats.intrusions_repelled, 1);
        assert_eq!(stats.intrusions_succeeded, 2);
        assert_eq!(stats.markers_ruined, 0);
        assert_eq!(stats.total_events, 3);
    }

    #[test]
    fn test_summary_names_breach() {
        let events = log();
        let report = SimulationReport {
            outcome: RunState::Breached,
            duration_years: 400,
            statistics: SimulationStats::from_log(&events, 7, 3, 30.0, 0.5),
            events,
            snapshots: Vec::new(),
        };
        assert!(report.breached());
        assert_eq!(report.breach(), Some((Position::new(1, 1), 30.0)));
        assert!(report.summary().starts_with("The site was breached at (1, 1) in year 30"));
        assert!(report.to_json().unwrap().contains("\"Breached\""));
    }
}
