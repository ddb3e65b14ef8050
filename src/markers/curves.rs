//! Decay curve library.
//!
//! A curve maps a marker's initial three-point profile and the years elapsed
//! since placement to the profile currently in effect. Every curve is a pure
//! function of its inputs and treats each tech level independently.
//!
//! Linear curves share one reference horizon so that every `lin_0` marker
//! fades out at the same moment regardless of its starting magnitude;
//! `slow_lin_0` and `fast_lin_0` stretch and shrink that horizon.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigurationError, InvariantViolation, Result};
use crate::core::types::Profile;

/// Years after which a `lin_0` value reaches zero (one full campaign).
pub const REFERENCE_HORIZON_YEARS: f32 = 10_000.0;

/// Horizon multiplier for `slow_lin_0`.
pub const SLOW_HORIZON_FACTOR: f32 = 1.5;

/// Horizon multiplier for `fast_lin_0`; exactly half of the slow horizon.
pub const FAST_HORIZON_FACTOR: f32 = 0.75;

/// Half-life of the exponential curves.
pub const HALF_LIFE_YEARS: f32 = 1_000.0;

/// Asymptote of `exp_neg_10`.
pub const NEGATIVE_FLOOR: f32 = -10.0;

/// Growth of the `slow_lin_inc_*` curves, in points per year.
pub const INCREASE_PER_YEAR: f32 = 0.001;

/// Named decay curve attached to every marker attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecayCurve {
    #[serde(rename = "constant")]
    Constant,
    #[serde(rename = "lin_0")]
    Linear,
    #[serde(rename = "slow_lin_0")]
    SlowLinear,
    #[serde(rename = "fast_lin_0")]
    FastLinear,
    #[serde(rename = "exp_0")]
    Exponential,
    #[serde(rename = "exp_neg_10")]
    ExponentialNegative,
    #[serde(rename = "slow_lin_inc_8")]
    SlowIncreaseTo8,
    #[serde(rename = "slow_lin_inc_3")]
    SlowIncreaseTo3,
    #[serde(rename = "tech_curve")]
    TechCurve,
}

impl DecayCurve {
    pub const ALL: [DecayCurve; 9] = [
        DecayCurve::Constant,
        DecayCurve::Linear,
        DecayCurve::SlowLinear,
        DecayCurve::FastLinear,
        DecayCurve::Exponential,
        DecayCurve::ExponentialNegative,
        DecayCurve::SlowIncreaseTo8,
        DecayCurve::SlowIncreaseTo3,
        DecayCurve::TechCurve,
    ];

    /// Catalog identifier of the curve.
    pub fn id(self) -> &'static str {
        match self {
            DecayCurve::Constant => "constant",
            DecayCurve::Linear => "lin_0",
            DecayCurve::SlowLinear => "slow_lin_0",
            DecayCurve::FastLinear => "fast_lin_0",
            DecayCurve::Exponential => "exp_0",
            DecayCurve::ExponentialNegative => "exp_neg_10",
            DecayCurve::SlowIncreaseTo8 => "slow_lin_inc_8",
            DecayCurve::SlowIncreaseTo3 => "slow_lin_inc_3",
            DecayCurve::TechCurve => "tech_curve",
        }
    }

    /// Years until a linear-to-zero curve bottoms out.
    pub fn horizon_years(self) -> Option<f32> {
        match self {
            DecayCurve::Linear => Some(REFERENCE_HORIZON_YEARS),
            DecayCurve::SlowLinear => Some(REFERENCE_HORIZON_YEARS * SLOW_HORIZON_FACTOR),
            DecayCurve::FastLinear => Some(REFERENCE_HORIZON_YEARS * FAST_HORIZON_FACTOR),
            _ => None,
        }
    }

    /// Upper bound of the increasing curves.
    pub fn ceiling(self) -> Option<f32> {
        match self {
            DecayCurve::SlowIncreaseTo8 => Some(8.0),
            DecayCurve::SlowIncreaseTo3 => Some(3.0),
            _ => None,
        }
    }

    /// Profile in effect `elapsed_years` after placement.
    ///
    /// Negative elapsed time is treated as zero; use [`evaluate`] to reject it.
    pub fn evaluate(self, profile: Profile, elapsed_years: f32) -> Profile {
        let t = elapsed_years.max(0.0);
        match self {
            DecayCurve::Constant | DecayCurve::TechCurve => profile,
            DecayCurve::Linear | DecayCurve::SlowLinear | DecayCurve::FastLinear => {
                let horizon = self.horizon_years().unwrap_or(REFERENCE_HORIZON_YEARS);
                let remaining = (1.0 - t / horizon).max(0.0);
                profile.map(|v| v * remaining)
            }
            DecayCurve::Exponential => {
                let k = half_life_factor(t);
                profile.map(|v| v * k)
            }
            DecayCurve::ExponentialNegative => {
                // v0*k + floor*(1-k) keeps t = 0 exact
                let k = half_life_factor(t);
                profile.map(|v| v * k + NEGATIVE_FLOOR * (1.0 - k))
            }
            DecayCurve::SlowIncreaseTo8 | DecayCurve::SlowIncreaseTo3 => {
                let cap = self.ceiling().unwrap_or(f32::INFINITY);
                profile.map(|v| (v + INCREASE_PER_YEAR * t).min(cap.max(v)))
            }
        }
    }
}

fn half_life_factor(elapsed_years: f32) -> f32 {
    0.5f32.powf(elapsed_years / HALF_LIFE_YEARS)
}

impl fmt::Display for DecayCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DecayCurve {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DecayCurve::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Evaluate a curve by catalog identifier.
///
/// Fails with `UnknownCurve` for an unmapped identifier and with
/// `NegativeElapsed` for a negative or non-finite elapsed time.
pub fn evaluate(curve_id: &str, profile: Profile, elapsed_years: f32) -> Result<Profile> {
    let curve = curve_id
        .parse::<DecayCurve>()
        .map_err(|curve| ConfigurationError::UnknownCurve {
            marker: "(none)".to_string(),
            curve,
        })?;
    if !elapsed_years.is_finite() || elapsed_years < 0.0 {
        return Err(InvariantViolation::NegativeElapsed(elapsed_years).into());
    }
    Ok(curve.evaluate(profile, elapsed_years))
}
