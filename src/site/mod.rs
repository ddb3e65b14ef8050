//! Site map, cells and the global buffs in force for a run

pub mod buffs;
pub mod cell;
pub mod grid;
pub mod map;

pub use buffs::{BuffMode, GlobalBuffs};
pub use cell::Cell;
pub use grid::Grid;
pub use map::SiteMap;
