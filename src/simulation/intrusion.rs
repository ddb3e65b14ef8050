//! Intrusion risk model
//!
//! A cell is desirable in proportion to the land value of the era plus any
//! positive usability. It deters intruders through visible danger (amplified
//! by how well the warning is understood), respect, likability and physical
//! obstruction; part of each neighbour's deterrence also protects it since
//! intruders have to walk past the surrounding markers. Risk is the share of
//! desirability left uncovered by deterrence, so it never rises when any
//! deterrent attribute rises.

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{AttributeSet, Position, TechLevel};
use crate::simulation::resolver::EffectiveGrid;
use crate::site::Grid;

/// Risk assessment of one occupied cell for one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRisk {
    pub position: Position,
    pub desirability: f32,
    pub deterrence: f32,
    pub risk: f32,
}

/// How much intruders of era `tech` want the land under a cell
pub fn desirability(attrs: &AttributeSet, tech: TechLevel, config: &SimulationConfig) -> f32 {
    config.land_value_for(tech) + attrs.usability.get(tech).max(0.0)
}

/// Deterrence a cell exerts by itself, never negative
///
/// Understanding scales the visible warning by a factor in [0, 2]: a
/// misunderstood warning (negative understandability) counts for less than
/// an unexplained one.
pub fn own_deterrence(attrs: &AttributeSet, tech: TechLevel, config: &SimulationConfig) -> f32 {
    let visibility = attrs.visibility.get(tech).max(0.0);
    let understanding = attrs.understandability.get(tech).clamp(-10.0, 10.0);
    let obstruction = (-attrs.usability.get(tech)).max(0.0);

    let deterrence = config.visibility_weight * visibility * (1.0 + understanding / 10.0)
        + config.respectability_weight * attrs.respectability.get(tech)
        + config.likability_weight * attrs.likability.get(tech)
        + config.obstruction_weight * obstruction;
    deterrence.max(0.0)
}

/// Uncovered share of desirability, in [0, 1]
pub fn risk(desirability: f32, deterrence: f32) -> f32 {
    if desirability <= 0.0 {
        return 0.0;
    }
    ((desirability - deterrence) / desirability).clamp(0.0, 1.0)
}

/// Chance that at least one intrusion is attempted on a cell during a step
pub fn attempt_probability(risk: f32, step_years: f32, config: &SimulationConfig) -> f32 {
    if risk <= 0.0 || step_years <= 0.0 {
        return 0.0;
    }
    1.0 - (-config.intrusion_rate * risk * step_years).exp()
}

/// Assess every occupied cell in row-major order
pub fn assess(effective: &EffectiveGrid, tech: TechLevel, config: &SimulationConfig) -> Vec<CellRisk> {
    let own: Vec<(Position, f32, f32)> = effective
        .iter()
        .filter_map(|(pos, attrs)| {
            attrs.as_ref().map(|a| {
                (pos, desirability(a, tech, config), own_deterrence(a, tech, config))
            })
        })
        .collect();

    let mut own_grid: Grid<f32> = Grid::new(effective.width, effective.height);
    for &(pos, _, deterrence) in &own {
        own_grid.set(pos, deterrence);
    }

    own.into_iter()
        .map(|(position, desirability, deterrence)| {
            let approach: f32 = effective
                .neighbours(position, config.adjacency_radius)
                .filter_map(|n| own_grid.get(n))
                .sum();
            let deterrence = deterrence + config.neighbour_share * approach;
            CellRisk {
                position,
                desirability,
                deterrence,
                risk: risk(desirability, deterrence),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Attribute, Profile};
    use proptest::prelude::*;

    fn attrs(v: f32, n: f32, r: f32, l: f32, u: f32) -> AttributeSet {
        AttributeSet {
            visibility: Profile::splat(v),
            understandability: Profile::splat(n),
            respectability: Profile::splat(r),
            likability: Profile::splat(l),
            usability: Profile::splat(u),
        }
    }

    fn cell_risk(a: &AttributeSet) -> f32 {
        let config = SimulationConfig::default();
        let tech = TechLevel::Low;
        risk(desirability(a, tech, &config), own_deterrence(a, tech, &config))
    }

    #[test]
    fn test_bare_cell_is_fully_exposed() {
        assert_eq!(cell_risk(&AttributeSet::default()), 1.0);
    }

    #[test]
    fn test_strong_deterrent_has_zero_risk() {
        assert_eq!(cell_risk(&attrs(7.0, 0.0, 7.0, 5.0, 0.0)), 0.0);
    }

    #[test]
    fn test_attractive_land_raises_risk() {
        let plain = cell_risk(&attrs(0.5, 0.0, 0.0, 0.0, 0.0));
        let useful = cell_risk(&attrs(0.5, 0.0, 0.0, 0.0, 4.0));
        assert!(useful > plain);
    }

    #[test]
    fn test_zero_risk_never_attempts() {
        let config = SimulationConfig::default();
        assert_eq!(attempt_probability(0.0, 250.0, &config), 0.0);
        let p = attempt_probability(1.0, 10.0, &config);
        assert!(p > 0.04 && p < 0.05);
    }

    #[test]
    fn test_neighbours_share_their_deterrence() {
        let config = SimulationConfig::default();
        let mut grid = EffectiveGrid::new(3, 1);
        grid.set(Position::new(0, 0), Some(AttributeSet::default()));
        let alone = assess(&grid, TechLevel::Low, &config)[0].risk;

        grid.set(Position::new(0, 1), Some(attrs(0.0, 0.0, 2.0, 0.0, 0.0)));
        let guarded = assess(&grid, TechLevel::Low, &config)[0].risk;

        assert_eq!(alone, 1.0);
        assert!((guarded - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_counter_productive_understanding_weakens_deterrence() {
        let config = SimulationConfig::default();
        let tech = TechLevel::High;
        let understood = own_deterrence(&attrs(3.5, 5.0, 0.0, 0.0, 0.0), tech, &config);
        let unexplained = own_deterrence(&attrs(3.5, 0.0, 0.0, 0.0, 0.0), tech, &config);
        let misread = own_deterrence(&attrs(3.5, -10.0, 0.0, 0.0, 0.0), tech, &config);

        assert!(understood > unexplained);
        assert!(misread < unexplained);
        assert_eq!(misread, 0.0);
    }

    #[test]
    fn test_assess_skips_empty_positions() {
        let grid = EffectiveGrid::new(4, 4);
        assert!(assess(&grid, TechLevel::High, &SimulationConfig::default()).is_empty());
    }

    proptest! {
        #[test]
        fn test_risk_never_rises_with_deterrents(
            v in -10.0f32..10.0,
            n in -10.0f32..10.0,
            r in -10.0f32..10.0,
            l in -10.0f32..10.0,
            u in -10.0f32..10.0,
            which in 0usize..4,
            boost in 0.0f32..5.0,
        ) {
            let base = attrs(v, n, r, l, u);
            let attr = [
                Attribute::Visibility,
                Attribute::Understandability,
                Attribute::Respectability,
                Attribute::Likability,
            ][which];
            let mut raised = base;
            raised[attr] = raised[attr] + Profile::splat(boost);

            prop_assert!(cell_risk(&raised) <= cell_risk(&base) + 1e-6);
        }

        #[test]
        fn test_risk_is_a_probability(
            v in -10.0f32..10.0,
            r in -10.0f32..10.0,
            u in -10.0f32..10.0,
        ) {
            let value = cell_risk(&attrs(v, 0.0, r, 0.0, u));
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
