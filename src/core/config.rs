//! Simulation configuration with documented constants
//!
//! Every tunable of the interaction and intrusion models lives here. The
//! decay curves themselves are fixed by their identifiers and keep their
//! constants in `markers::curves`.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigurationError;
use crate::core::types::TechLevel;

/// Configuration for one simulation run
///
/// Values are tuned so that an unprotected core is usually breached within a
/// single 400-year phase while a strong global deterrent holds for the full
/// 10 000 years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === TIME ===
    /// Number of discrete steps a run is divided into
    ///
    /// Each step covers `duration / steps_per_run` years and produces one
    /// map snapshot for playback.
    pub steps_per_run: u32,

    /// Year at which medium-tech societies take over from low-tech ones
    pub medium_tech_year: f32,

    /// Year at which high-tech societies take over from medium-tech ones
    pub high_tech_year: f32,

    // === INTERACTIONS ===
    /// Chebyshev radius used for synergy, spooky aura, terraforming
    /// suppression and neighbour deterrence
    ///
    /// 1 means the eight surrounding cells.
    pub adjacency_radius: usize,

    /// Fraction of a global marker's decayed attributes added to every other cell
    pub global_reach: f32,

    /// Respectability added to each neighbour of a spooky marker
    pub spooky_aura: f32,

    /// Understandability added to educational markers per pro-educational marker
    pub education_bonus: f32,

    /// Lowest effective attribute value; anything below saturates here
    pub attribute_floor: f32,

    /// Highest effective attribute value; anything above saturates here
    pub attribute_ceiling: f32,

    // === INTRUSION ===
    /// Baseline land desirability for low, medium and high tech societies
    pub land_value: [f32; 3],

    /// Expected intrusion attempts per year on a cell with risk 1.0
    ///
    /// At 0.005, a fully exposed cell sees roughly one attempt every two
    /// centuries.
    pub intrusion_rate: f32,

    /// Share of each neighbour's deterrence that protects a cell
    ///
    /// Intruders walk past surrounding markers before reaching a cell.
    pub neighbour_share: f32,

    /// Deterrence per point of visibility (amplified by understandability)
    pub visibility_weight: f32,

    /// Deterrence per point of respectability
    pub respectability_weight: f32,

    /// Deterrence per point of likability
    pub likability_weight: f32,

    /// Deterrence per point of negative usability
    pub obstruction_weight: f32,

    // === RUIN ===
    /// Structural integrity below which a ruinable marker starts failing
    pub ruin_integrity_threshold: f32,

    /// Effective usability at or below which a ruinable marker starts failing
    pub ruin_usability_threshold: f32,

    /// Contiguous failing years before the marker turns into its ruin
    pub ruin_sustain_years: f32,

    /// Integrity lost by a non-core cell each time an intrusion succeeds there
    pub intrusion_damage: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Time
            steps_per_run: 40,
            medium_tech_year: 2500.0,
            high_tech_year: 6000.0,

            // Interactions
            adjacency_radius: 1,
            global_reach: 0.5,
            spooky_aura: 1.0,
            education_bonus: 2.0,
            attribute_floor: -10.0,
            attribute_ceiling: 10.0,

            // Intrusion
            land_value: [1.0, 1.5, 2.0],
            intrusion_rate: 0.005,
            neighbour_share: 0.25,
            visibility_weight: 1.0,
            respectability_weight: 1.0,
            likability_weight: 0.5,
            obstruction_weight: 1.0,

            // Ruin
            ruin_integrity_threshold: 0.35,
            ruin_usability_threshold: -8.0,
            ruin_sustain_years: 100.0,
            intrusion_damage: 0.25,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document layered over the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Technology level of the societies active at `elapsed_years`
    pub fn tech_level(&self, elapsed_years: f32) -> TechLevel {
        if elapsed_years >= self.high_tech_year {
            TechLevel::High
        } else if elapsed_years >= self.medium_tech_year {
            TechLevel::Medium
        } else {
            TechLevel::Low
        }
    }

    /// Land desirability baseline for a tech level
    pub fn land_value_for(&self, tech: TechLevel) -> f32 {
        self.land_value[tech.index()]
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |msg: String| Err(ConfigurationError::InvalidConfig(msg));

        if self.steps_per_run == 0 {
            return invalid("steps_per_run must be at least 1".into());
        }

        if self.medium_tech_year < 0.0 || self.medium_tech_year > self.high_tech_year {
            return invalid(format!(
                "tech eras must satisfy 0 <= medium_tech_year ({}) <= high_tech_year ({})",
                self.medium_tech_year, self.high_tech_year
            ));
        }

        if self.attribute_floor >= self.attribute_ceiling {
            return invalid(format!(
                "attribute_floor ({}) must be below attribute_ceiling ({})",
                self.attribute_floor, self.attribute_ceiling
            ));
        }

        if self.land_value.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return invalid("land_value entries must be positive".into());
        }

        if !(0.0..=1.0).contains(&self.neighbour_share) {
            return invalid(format!(
                "neighbour_share ({}) must lie in [0, 1]",
                self.neighbour_share
            ));
        }

        let non_negative = [
            ("global_reach", self.global_reach),
            ("spooky_aura", self.spooky_aura),
            ("education_bonus", self.education_bonus),
            ("intrusion_rate", self.intrusion_rate),
            ("visibility_weight", self.visibility_weight),
            ("respectability_weight", self.respectability_weight),
            ("likability_weight", self.likability_weight),
            ("obstruction_weight", self.obstruction_weight),
            ("ruin_sustain_years", self.ruin_sustain_years),
            ("intrusion_damage", self.intrusion_damage),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{} must be a non-negative number, got {}", name, value));
            }
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}

/// Set the global simulation config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: SimulationConfig) -> Result<(), SimulationConfig> {
    CONFIG.set(config)
}
