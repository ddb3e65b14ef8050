//! Core type definitions used throughout the codebase

use std::fmt;
use std::ops::{Add, Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grid position of a cell on the site map (row-major ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev distance (king moves) between two positions
    pub fn chebyshev(&self, other: &Self) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Technology level of the society probing the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechLevel {
    Low,
    Medium,
    High,
}

impl TechLevel {
    pub const ALL: [TechLevel; 3] = [TechLevel::Low, TechLevel::Medium, TechLevel::High];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The five deterrent attributes every marker carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Visibility,
    Understandability,
    Respectability,
    Likability,
    Usability,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Visibility,
        Attribute::Understandability,
        Attribute::Respectability,
        Attribute::Likability,
        Attribute::Usability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Visibility => "visibility",
            Attribute::Understandability => "understandability",
            Attribute::Respectability => "respectability",
            Attribute::Likability => "likability",
            Attribute::Usability => "usability",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("unknown attribute '{}'", s))
    }
}

/// Three-point response of a marker against low, medium and high tech societies
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile(pub [f32; 3]);

impl Profile {
    pub const ZERO: Profile = Profile([0.0; 3]);

    pub fn new(low: f32, medium: f32, high: f32) -> Self {
        Self([low, medium, high])
    }

    pub fn splat(value: f32) -> Self {
        Self([value; 3])
    }

    #[inline]
    pub fn get(&self, tech: TechLevel) -> f32 {
        self.0[tech.index()]
    }

    pub fn low(&self) -> f32 {
        self.0[0]
    }

    pub fn medium(&self) -> f32 {
        self.0[1]
    }

    pub fn high(&self) -> f32 {
        self.0[2]
    }

    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self(self.0.map(f))
    }

    pub fn scale(self, factor: f32) -> Self {
        self.map(|v| v * factor)
    }

    pub fn mean(&self) -> f32 {
        self.0.iter().sum::<f32>() / 3.0
    }

    pub fn max_value(&self) -> f32 {
        self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Saturate every entry into `[floor, ceiling]`
    pub fn saturate(self, floor: f32, ceiling: f32) -> Self {
        self.map(|v| if v.is_nan() { floor } else { v.clamp(floor, ceiling) })
    }
}

impl Add for Profile {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self([self.0[0] + rhs.0[0], self.0[1] + rhs.0[1], self.0[2] + rhs.0[2]])
    }
}

impl From<[f32; 3]> for Profile {
    fn from(values: [f32; 3]) -> Self {
        Self(values)
    }
}

/// One profile per attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub visibility: Profile,
    pub understandability: Profile,
    pub respectability: Profile,
    pub likability: Profile,
    pub usability: Profile,
}

impl AttributeSet {
    pub fn from_fn(mut f: impl FnMut(Attribute) -> Profile) -> Self {
        Self {
            visibility: f(Attribute::Visibility),
            understandability: f(Attribute::Understandability),
            respectability: f(Attribute::Respectability),
            likability: f(Attribute::Likability),
            usability: f(Attribute::Usability),
        }
    }

    pub fn map(&self, mut f: impl FnMut(Attribute, Profile) -> Profile) -> Self {
        Self::from_fn(|attr| f(attr, self[attr]))
    }

    pub fn scale(&self, factor: f32) -> Self {
        self.map(|_, p| p.scale(factor))
    }
}

impl Add for AttributeSet {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.map(|attr, p| p + rhs[attr])
    }
}

impl Index<Attribute> for AttributeSet {
    type Output = Profile;

    fn index(&self, attr: Attribute) -> &Profile {
        match attr {
            Attribute::Visibility => &self.visibility,
            Attribute::Understandability => &self.understandability,
            Attribute::Respectability => &self.respectability,
            Attribute::Likability => &self.likability,
            Attribute::Usability => &self.usability,
        }
    }
}

impl IndexMut<Attribute> for AttributeSet {
    fn index_mut(&mut self, attr: Attribute) -> &mut Profile {
        match attr {
            Attribute::Visibility => &mut self.visibility,
            Attribute::Understandability => &mut self.understandability,
            Attribute::Respectability => &mut self.respectability,
            Attribute::Likability => &mut self.likability,
            Attribute::Usability => &mut self.usability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_row_major() {
        let mut positions = vec![Position::new(1, 0), Position::new(0, 3), Position::new(0, 1)];
        positions.sort();
        assert_eq!(
            positions,
            vec![Position::new(0, 1), Position::new(0, 3), Position::new(1, 0)]
        );
    }

    #[test]
    fn test_chebyshev_counts_diagonals_as_one() {
        let origin = Position::new(2, 2);
        assert_eq!(origin.chebyshev(&Position::new(3, 3)), 1);
        assert_eq!(origin.chebyshev(&Position::new(2, 4)), 2);
        assert_eq!(origin.chebyshev(&origin), 0);
    }

    #[test]
    fn test_attribute_round_trips_through_name() {
        for attr in Attribute::ALL {
            assert_eq!(attr.name().parse::<Attribute>(), Ok(attr));
        }
        assert!("charisma".parse::<Attribute>().is_err());
    }

    #[test]
    fn test_profile_saturate_clamps_and_replaces_nan() {
        let p = Profile::new(-40.0, f32::NAN, 12.5).saturate(-10.0, 10.0);
        assert_eq!(p, Profile::new(-10.0, -10.0, 10.0));
    }

    #[test]
    fn test_attribute_set_indexing() {
        let mut set = AttributeSet::default();
        set[Attribute::Likability] = Profile::splat(3.0);
        assert_eq!(set.likability, Profile::splat(3.0));
        assert_eq!(set[Attribute::Usability], Profile::ZERO);
    }
}
