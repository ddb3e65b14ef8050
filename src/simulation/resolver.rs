//! Interaction resolver
//!
//! Turns the raw decayed attributes of every placed marker into effective
//! attributes by layering the tag-driven interactions on top:
//!
//! 1. player buffs (multipliers, then bonuses) on the cell's own values
//! 2. a share of every other global marker's decayed attributes
//! 3. synergy bonuses from differently-keyed partners within the radius
//! 4. respectability aura from spooky neighbours
//! 5. understandability for educational markers per pro-educational marker
//! 6. terraforming: own usability pinned to raw, neighbours capped at 0
//!
//! Every additive contribution is a plain sum, so the result does not depend
//! on the order cells are visited. Values saturate into the configured
//! attribute range at the end.

use crate::core::config::SimulationConfig;
use crate::core::error::{ConfigurationError, Result};
use crate::core::types::{Attribute, AttributeSet, Position, Profile};
use crate::markers::{MarkerCatalog, MarkerDefinition};
use crate::site::{GlobalBuffs, Grid, SiteMap};

/// Effective attributes per position; `None` where no marker stands
pub type EffectiveGrid = Grid<Option<AttributeSet>>;

/// One occupied cell as seen by the resolver
struct Placed<'c> {
    position: Position,
    definition: &'c MarkerDefinition,
    raw: AttributeSet,
}

pub struct InteractionResolver<'a> {
    catalog: &'a MarkerCatalog,
    config: &'a SimulationConfig,
    buffs: &'a GlobalBuffs,
}

impl<'a> InteractionResolver<'a> {
    pub fn new(catalog: &'a MarkerCatalog, config: &'a SimulationConfig, buffs: &'a GlobalBuffs) -> Self {
        Self { catalog, config, buffs }
    }

    /// Raw decayed attributes of every occupied cell, keyed by position
    pub fn raw(&self, map: &SiteMap) -> Result<EffectiveGrid> {
        let mut grid = EffectiveGrid::new(map.width(), map.height());
        for placed in self.collect(map)? {
            grid.set(placed.position, Some(placed.raw));
        }
        Ok(grid)
    }

    /// Effective attributes of every occupied cell at the cells' current ages
    pub fn resolve(&self, map: &SiteMap) -> Result<EffectiveGrid> {
        let placed = self.collect(map)?;
        let radius = self.config.adjacency_radius;

        let mut slots: Grid<Option<usize>> = Grid::new(map.width(), map.height());
        for (i, p) in placed.iter().enumerate() {
            slots.set(p.position, Some(i));
        }
        let at = |pos: Position| slots.get(pos).copied().flatten();

        let mut effective: Vec<AttributeSet> = placed
            .iter()
            .map(|p| p.raw.map(|attr, raw| self.buffs.apply(attr, raw)))
            .collect();

        // Global reach
        for (gi, global) in placed.iter().enumerate().filter(|(_, p)| p.definition.is_global()) {
            let share = global.raw.scale(self.config.global_reach);
            for (i, eff) in effective.iter_mut().enumerate() {
                if i != gi {
                    *eff = *eff + share;
                }
            }
        }

        // Synergy partnerships
        for (i, cell) in placed.iter().enumerate() {
            if !cell.definition.has_synergy_partnership() {
                continue;
            }
            for n in map.neighbours(cell.position, radius).filter_map(at) {
                let partner = placed[n].definition;
                if partner.key == cell.definition.key {
                    continue;
                }
                for suffix in cell.definition.get_synergy_partnerships() {
                    if !partner.get_synergy_partnerships().contains(suffix) {
                        continue;
                    }
                    let bond = self.catalog.partnership(suffix).ok_or_else(|| {
                        ConfigurationError::UnknownPartnership {
                            marker: cell.definition.key.clone(),
                            suffix: suffix.clone(),
                        }
                    })?;
                    let bonded = &mut effective[i][bond.attribute];
                    *bonded = *bonded + Profile::splat(bond.bonus);
                }
            }
        }

        // Spooky aura
        for spooky in placed.iter().filter(|p| p.definition.is_spooky()) {
            for n in map.neighbours(spooky.position, radius).filter_map(at) {
                let respect = &mut effective[n][Attribute::Respectability];
                *respect = *respect + Profile::splat(self.config.spooky_aura);
            }
        }

        // Education
        let teachers = placed.iter().filter(|p| p.definition.is_pro_educational()).count();
        if teachers > 0 {
            let lesson = Profile::splat(self.config.education_bonus * teachers as f32);
            for (i, p) in placed.iter().enumerate() {
                if p.definition.is_educational() {
                    let understanding = &mut effective[i][Attribute::Understandability];
                    *understanding = *understanding + lesson;
                }
            }
        }

        // Terraforming: caps first so a terraforming cell's own pin wins
        for terra in placed.iter().filter(|p| p.definition.is_terraforming()) {
            for n in map.neighbours(terra.position, radius).filter_map(at) {
                let usability = &mut effective[n][Attribute::Usability];
                *usability = usability.map(|v| v.min(0.0));
            }
        }
        for (i, p) in placed.iter().enumerate() {
            if p.definition.is_terraforming() {
                effective[i].usability = p.raw.usability;
            }
        }

        let (floor, ceiling) = (self.config.attribute_floor, self.config.attribute_ceiling);
        let mut grid = EffectiveGrid::new(map.width(), map.height());
        for (p, eff) in placed.iter().zip(effective) {
            grid.set(p.position, Some(eff.map(|_, v| v.saturate(floor, ceiling))));
        }
        Ok(grid)
    }

    fn collect(&self, map: &SiteMap) -> Result<Vec<Placed<'a>>> {
        map.cells()
            .map(|cell| -> Result<Placed<'a>> {
                let definition = self.catalog.get(&cell.marker)?;
                Ok(Placed {
                    position: cell.position,
                    definition,
                    raw: definition.decayed(cell.age_years),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(map: &SiteMap) -> EffectiveGrid {
        resolve_with(map, &GlobalBuffs::new())
    }

    fn resolve_with(map: &SiteMap, buffs: &GlobalBuffs) -> EffectiveGrid {
        let catalog = MarkerCatalog::builtin().unwrap();
        let config = SimulationConfig::default();
        InteractionResolver::new(catalog, &config, buffs).resolve(map).unwrap()
    }

    fn at(grid: &EffectiveGrid, row: usize, col: usize) -> AttributeSet {
        grid.get(Position::new(row, col)).copied().flatten().unwrap()
    }

    fn map_with(placements: &[(usize, usize, &str)]) -> SiteMap {
        let mut map = SiteMap::new(8, 8);
        for &(row, col, key) in placements {
            map.place(Position::new(row, col), key).unwrap();
        }
        map
    }

    #[test]
    fn test_lone_marker_resolves_to_raw() {
        let map = map_with(&[(0, 0, "danger-sign")]);
        let grid = resolve(&map);
        let def = MarkerCatalog::builtin().unwrap().get("danger-sign").unwrap();
        assert_eq!(at(&grid, 0, 0), def.initial());
        assert!(grid.get(Position::new(0, 1)).copied().flatten().is_none());
    }

    #[test]
    fn test_buffs_scale_then_add() {
        let map = map_with(&[(0, 0, "cemetery")]);
        let buffs = GlobalBuffs::from_pairs([
            ("likability_multiplier", 0.5),
            ("likability_bonus", -1.0),
        ])
        .unwrap();
        let grid = resolve_with(&map, &buffs);
        assert_eq!(at(&grid, 0, 0).likability, Profile::splat(-3.0));
    }

    #[test]
    fn test_global_marker_reaches_distant_cells_but_not_itself() {
        let map = map_with(&[(0, 0, "danger-sign"), (7, 7, "ray-cats")]);
        let grid = resolve(&map);
        assert_eq!(at(&grid, 0, 0).visibility, Profile::splat(1.0 + 2.5));
        assert_eq!(at(&grid, 7, 7).visibility, Profile::splat(5.0));
    }

    #[test]
    fn test_partners_bond_only_when_adjacent() {
        let near = resolve(&map_with(&[(3, 3, "danger-sign"), (4, 4, "disgust-faces")]));
        let far = resolve(&map_with(&[(0, 0, "danger-sign"), (5, 5, "disgust-faces")]));
        assert_eq!(at(&near, 3, 3).visibility, Profile::splat(3.0));
        assert_eq!(at(&far, 0, 0).visibility, Profile::splat(1.0));
        assert_eq!(at(&near, 4, 4).visibility, Profile::splat(4.0));
    }

    #[test]
    fn test_same_key_partners_do_not_bond() {
        let grid = resolve(&map_with(&[(3, 3, "danger-sign"), (3, 4, "danger-sign")]));
        assert_eq!(at(&grid, 3, 3).visibility, Profile::splat(1.0));
    }

    #[test]
    fn test_distance_two_is_not_adjacent() {
        let grid = resolve(&map_with(&[(3, 3, "danger-sign"), (3, 5, "disgust-faces")]));
        assert_eq!(at(&grid, 3, 3).visibility, Profile::splat(1.0));
    }

    #[test]
    fn test_spooky_aura_skips_itself() {
        let grid = resolve(&map_with(&[(2, 2, "cemetery"), (2, 3, "wooden-monolith")]));
        let def = MarkerCatalog::builtin().unwrap().get("wooden-monolith").unwrap();
        assert_eq!(
            at(&grid, 2, 3).respectability,
            def.initial().respectability + Profile::splat(1.0)
        );
        assert_eq!(at(&grid, 2, 2).respectability, Profile::splat(10.0));
    }

    #[test]
    fn test_pro_educational_lifts_educational_map_wide() {
        let grid = resolve(&map_with(&[(0, 0, "star-map"), (7, 7, "visitor-center")]));
        let def = MarkerCatalog::builtin().unwrap().get("star-map").unwrap();
        assert_eq!(
            at(&grid, 0, 0).understandability,
            (def.initial().understandability + Profile::splat(2.0)).saturate(-10.0, 10.0)
        );
    }

    #[test]
    fn test_terraforming_pins_own_usability_and_caps_neighbours() {
        let grid = resolve(&map_with(&[(3, 3, "spike-field"), (3, 4, "attractive-monument")]));
        assert_eq!(at(&grid, 3, 3).usability, Profile::new(-10.0, -5.0, -5.0));
        assert_eq!(at(&grid, 3, 4).usability, Profile::ZERO);
    }

    #[test]
    fn test_terraforming_pin_ignores_buffs() {
        let map = map_with(&[(3, 3, "spike-field")]);
        let buffs = GlobalBuffs::from_pairs([("usability_bonus", 20.0)]).unwrap();
        let grid = resolve_with(&map, &buffs);
        assert_eq!(at(&grid, 3, 3).usability, Profile::new(-10.0, -5.0, -5.0));
    }

    #[test]
    fn test_values_saturate() {
        let map = map_with(&[(0, 0, "cemetery")]);
        let buffs = GlobalBuffs::from_pairs([("respectability_bonus", 50.0)]).unwrap();
        let grid = resolve_with(&map, &buffs);
        assert_eq!(at(&grid, 0, 0).respectability, Profile::splat(10.0));
    }
}
