//! A placed marker and its run-local state

use serde::{Deserialize, Serialize};

use crate::core::types::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Position,
    /// Catalog key of the marker standing here
    pub marker: String,
    /// Years since the current marker was placed (or since it ruined)
    pub age_years: f32,
    pub ruined: bool,
    /// Structural damage from successful intrusions
    pub damage: f32,
    /// Contiguous years the marker has spent below its ruin thresholds
    pub failing_years: f32,
}

impl Cell {
    pub fn new(position: Position, marker: impl Into<String>) -> Self {
        Self {
            position,
            marker: marker.into(),
            age_years: 0.0,
            ruined: false,
            damage: 0.0,
            failing_years: 0.0,
        }
    }

    pub fn advance(&mut self, years: f32) {
        self.age_years += years;
    }

    /// Swap in the ruined counterpart; the ruined flag is never cleared
    pub fn ruin_into(&mut self, ruin: &str) {
        self.marker = ruin.to_string();
        self.age_years = 0.0;
        self.damage = 0.0;
        self.failing_years = 0.0;
        self.ruined = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruin_resets_wear_and_sets_flag() {
        let mut cell = Cell::new(Position::new(0, 0), "wooden-monolith");
        cell.advance(300.0);
        cell.damage = 0.5;
        cell.failing_years = 120.0;

        cell.ruin_into("ruined-wooden-monolith");

        assert_eq!(cell.marker, "ruined-wooden-monolith");
        assert!(cell.ruined);
        assert_eq!(cell.age_years, 0.0);
        assert_eq!(cell.damage, 0.0);
        assert_eq!(cell.failing_years, 0.0);
    }
}
