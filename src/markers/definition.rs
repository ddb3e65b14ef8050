//! Marker definitions
//!
//! A definition is an immutable record of one placeable marker type: its
//! shop data, one decaying profile per attribute, and its parsed tags.

use crate::core::types::{Attribute, AttributeSet, Profile};
use crate::markers::curves::DecayCurve;
use crate::markers::tags::{Capabilities, TagSet};

/// Initial profile of one attribute and the curve it decays along
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeProfile {
    pub init: Profile,
    pub curve: DecayCurve,
}

impl AttributeProfile {
    pub fn new(init: Profile, curve: DecayCurve) -> Self {
        Self { init, curve }
    }

    pub fn at(&self, age_years: f32) -> Profile {
        self.curve.evaluate(self.init, age_years)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    pub base_cost: u64,
    pub visibility: AttributeProfile,
    pub understandability: AttributeProfile,
    pub respectability: AttributeProfile,
    pub likability: AttributeProfile,
    pub usability: AttributeProfile,
    pub tags: TagSet,
    /// Key of the marker this one degrades into
    pub ruin: Option<String>,
}

impl MarkerDefinition {
    pub fn attribute(&self, attr: Attribute) -> &AttributeProfile {
        match attr {
            Attribute::Visibility => &self.visibility,
            Attribute::Understandability => &self.understandability,
            Attribute::Respectability => &self.respectability,
            Attribute::Likability => &self.likability,
            Attribute::Usability => &self.usability,
        }
    }

    /// Initial attribute values, before any decay
    pub fn initial(&self) -> AttributeSet {
        AttributeSet::from_fn(|attr| self.attribute(attr).init)
    }

    /// Raw decayed attribute values `age_years` after placement
    pub fn decayed(&self, age_years: f32) -> AttributeSet {
        AttributeSet::from_fn(|attr| self.attribute(attr).at(age_years))
    }

    pub fn is_global(&self) -> bool {
        self.tags.has(Capabilities::GLOBAL)
    }

    pub fn is_purchasable(&self) -> bool {
        !self.tags.has(Capabilities::NOT_PURCHASABLE)
    }

    pub fn has_synergy_partnership(&self) -> bool {
        !self.tags.partnerships().is_empty()
    }

    /// Suffixes of every `synergy_partnership_*` tag
    pub fn get_synergy_partnerships(&self) -> &[String] {
        self.tags.partnerships()
    }

    pub fn shares_partnership_with(&self, other: &MarkerDefinition) -> bool {
        self.tags
            .partnerships()
            .iter()
            .any(|s| other.tags.partnerships().contains(s))
    }

    pub fn is_spooky(&self) -> bool {
        self.tags.has(Capabilities::SPOOKY)
    }

    pub fn is_pro_educational(&self) -> bool {
        self.tags.has(Capabilities::PRO_EDUCATIONAL)
    }

    pub fn is_educational(&self) -> bool {
        self.tags.has(Capabilities::EDUCATIONAL)
    }

    pub fn is_terraforming(&self) -> bool {
        self.tags.has(Capabilities::TERRAFORMING)
    }

    pub fn is_monolith(&self) -> bool {
        self.tags.has(Capabilities::MONOLITH)
    }

    /// Fraction of the initial visibility still standing after `age_years`
    ///
    /// Markers with no initial visibility have nothing physical to erode
    /// and always report 1.0.
    pub fn standing_fraction(&self, age_years: f32) -> f32 {
        let initial = self.visibility.init.mean();
        if initial <= 0.0 {
            return 1.0;
        }
        (self.visibility.at(age_years).mean() / initial).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(tags: &[&str], visibility: AttributeProfile) -> MarkerDefinition {
        let flat = AttributeProfile::new(Profile::ZERO, DecayCurve::Constant);
        MarkerDefinition {
            key: "test".into(),
            name: "Test".into(),
            description: String::new(),
            base_cost: 10,
            visibility,
            understandability: flat,
            respectability: flat,
            likability: flat,
            usability: flat,
            tags: TagSet::parse("test", tags).unwrap(),
            ruin: None,
        }
    }

    #[test]
    fn test_predicates_follow_tags() {
        let flat = AttributeProfile::new(Profile::ZERO, DecayCurve::Constant);
        let def = definition(&["global", "non-purchasable", "monolith"], flat);
        assert!(def.is_global());
        assert!(!def.is_purchasable());
        assert!(def.is_monolith());
        assert!(!def.is_spooky());
        assert!(!def.has_synergy_partnership());
    }

    #[test]
    fn test_shared_partnership_detection() {
        let flat = AttributeProfile::new(Profile::ZERO, DecayCurve::Constant);
        let a = definition(&["synergy_partnership_1"], flat);
        let b = definition(&["synergy_partnership_2", "synergy_partnership_1"], flat);
        let c = definition(&["synergy_partnership_3"], flat);
        assert!(a.shares_partnership_with(&b));
        assert!(!a.shares_partnership_with(&c));
        assert_eq!(b.get_synergy_partnerships(), ["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_standing_fraction_tracks_visibility_decay() {
        let def = definition(&[], AttributeProfile::new(Profile::splat(6.0), DecayCurve::Linear));
        assert_eq!(def.standing_fraction(0.0), 1.0);
        assert!((def.standing_fraction(5_000.0) - 0.5).abs() < 1e-4);
        assert_eq!(def.standing_fraction(20_000.0), 0.0);
    }

    #[test]
    fn test_standing_fraction_without_visibility_is_whole() {
        let def = definition(&[], AttributeProfile::new(Profile::ZERO, DecayCurve::Linear));
        assert_eq!(def.standing_fraction(9_000.0), 1.0);
    }
}
