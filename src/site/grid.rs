//! Generic grid for site data

use serde::{Deserialize, Serialize};

use crate::core::types::Position;

/// Bounded 2D grid stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        pos.row * self.width + pos.col
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<&T> {
        if self.contains(pos) {
            Some(&self.data[self.index(pos)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        if self.contains(pos) {
            let idx = self.index(pos);
            Some(&mut self.data[idx])
        } else {
            None
        }
    }

    /// Write a value; returns false when `pos` is outside the grid
    #[inline]
    pub fn set(&mut self, pos: Position, value: T) -> bool {
        match self.get_mut(pos) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| Position::new(row, col)))
    }

    /// Every (position, value) pair in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        self.positions().zip(self.data.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Position, &mut T)> {
        let width = self.width.max(1);
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(i, v)| (Position::new(i / width, i % width), v))
    }

    /// In-bounds positions within Chebyshev `radius` of `center`, excluding it
    pub fn neighbours(&self, center: Position, radius: usize) -> impl Iterator<Item = Position> {
        let row_lo = center.row.saturating_sub(radius);
        let row_hi = (center.row + radius).min(self.height.saturating_sub(1));
        let col_lo = center.col.saturating_sub(radius);
        let col_hi = (center.col + radius).min(self.width.saturating_sub(1));
        let empty = self.width == 0 || self.height == 0;

        (row_lo..=row_hi)
            .flat_map(move |row| (col_lo..=col_hi).map(move |col| Position::new(row, col)))
            .filter(move |&p| !empty && p != center)
    }
}
