//! The site map: placed markers and the waste core they protect

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::constants::CORE_MARKER_KEYS;
use crate::core::error::{InvariantViolation, Result};
use crate::core::types::Position;
use crate::markers::MarkerCatalog;
use crate::site::cell::Cell;
use crate::site::grid::Grid;

/// Grid of optional cells plus the positions that make up the waste core
///
/// `Clone` is a full deep copy; a run always works on its own copy so the
/// map the player is editing is never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMap {
    cells: Grid<Option<Cell>>,
    core: BTreeSet<Position>,
}

impl SiteMap {
    /// Empty map whose central 2x2 block is the core
    pub fn new(width: usize, height: usize) -> Self {
        let cells = Grid::new(width, height);
        let core = central_block(width, height).into_iter().collect();
        Self { cells, core }
    }

    /// Empty map with the four core tiles already placed on the central block
    pub fn with_core_markers(width: usize, height: usize) -> Result<Self> {
        let mut map = Self::new(width, height);
        let catalog = MarkerCatalog::builtin()?;
        for (pos, key) in central_block(width, height).into_iter().zip(CORE_MARKER_KEYS) {
            map.place_in(catalog, pos, key)?;
        }
        Ok(map)
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn height(&self) -> usize {
        self.cells.height
    }

    /// Place a built-in catalog marker, replacing whatever stood there
    pub fn place(&mut self, pos: Position, key: &str) -> Result<()> {
        self.place_in(MarkerCatalog::builtin()?, pos, key)
    }

    /// Place a marker known to `catalog`, replacing whatever stood there
    pub fn place_in(&mut self, catalog: &MarkerCatalog, pos: Position, key: &str) -> Result<()> {
        catalog.get(key)?;
        self.check_bounds(pos)?;
        self.cells.set(pos, Some(Cell::new(pos, key)));
        Ok(())
    }

    pub fn remove(&mut self, pos: Position) -> Option<Cell> {
        self.cells.get_mut(pos).and_then(Option::take)
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(pos).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.cells.get_mut(pos).and_then(Option::as_mut)
    }

    /// Occupied cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter_map(|(_, cell)| cell.as_ref())
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut().filter_map(|(_, cell)| cell.as_mut())
    }

    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// In-bounds positions within `radius` of `pos`, excluding it
    pub fn neighbours(&self, pos: Position, radius: usize) -> impl Iterator<Item = Position> + '_ {
        self.cells.neighbours(pos, radius)
    }

    pub fn is_core(&self, pos: Position) -> bool {
        self.core.contains(&pos)
    }

    pub fn core_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.core.iter().copied()
    }

    /// Replace the core set
    pub fn set_core<I: IntoIterator<Item = Position>>(&mut self, positions: I) -> Result<()> {
        let mut core = BTreeSet::new();
        for pos in positions {
            self.check_bounds(pos)?;
            core.insert(pos);
        }
        self.core = core;
        Ok(())
    }

    /// Independent copy for one simulation run
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Check that every placed key is known to `catalog`
    ///
    /// Maps built through `place` always pass; deserialized maps may not.
    pub fn validate(&self, catalog: &MarkerCatalog) -> Result<()> {
        for cell in self.cells() {
            catalog.get(&cell.marker)?;
            self.check_bounds(cell.position)?;
        }
        for &pos in &self.core {
            self.check_bounds(pos)?;
        }
        Ok(())
    }

    fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.cells.contains(pos) {
            Ok(())
        } else {
            Err(InvariantViolation::PositionOutOfBounds {
                position: pos,
                width: self.width(),
                height: self.height(),
            }
            .into())
        }
    }
}

/// Central 2x2 block in top-left, top-right, bottom-left, bottom-right order,
/// clipped to the map
fn central_block(width: usize, height: usize) -> Vec<Position> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let top = (height / 2).saturating_sub(1);
    let left = (width / 2).saturating_sub(1);
    let mut block = Vec::with_capacity(4);
    for row in [top, top + 1] {
        for col in [left, left + 1] {
            let pos = Position::new(row, col);
            if row < height && col < width && !block.contains(&pos) {
                block.push(pos);
            }
        }
    }
    block
}
