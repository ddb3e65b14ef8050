//! Marker tag vocabulary
//!
//! Catalog tags are parsed once into a capability bitset for the fixed
//! vocabulary, a sorted list of synergy-partnership suffixes, and the
//! remaining free-form descriptive tags. Predicates read the bitset instead
//! of scanning strings every step.

use std::fmt;

use crate::core::error::ConfigurationError;

pub const NOT_PURCHASABLE: &str = "non-purchasable";
pub const GLOBAL: &str = "global";
pub const SYNERGY_PARTNERSHIP_PREFIX: &str = "synergy_partnership_";
pub const SPOOKY: &str = "spooky";
pub const PRO_EDUCATIONAL: &str = "pro-educational";
pub const EDUCATIONAL: &str = "educational";
pub const TERRAFORMING: &str = "terraforming";
pub const MONOLITH: &str = "monolith";

/// Bitset over the fixed tag vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const GLOBAL: Capabilities = Capabilities(1 << 0);
    pub const NOT_PURCHASABLE: Capabilities = Capabilities(1 << 1);
    pub const SPOOKY: Capabilities = Capabilities(1 << 2);
    pub const PRO_EDUCATIONAL: Capabilities = Capabilities(1 << 3);
    pub const EDUCATIONAL: Capabilities = Capabilities(1 << 4);
    pub const TERRAFORMING: Capabilities = Capabilities(1 << 5);
    pub const MONOLITH: Capabilities = Capabilities(1 << 6);

    const VOCABULARY: [(&'static str, Capabilities); 7] = [
        (GLOBAL, Capabilities::GLOBAL),
        (NOT_PURCHASABLE, Capabilities::NOT_PURCHASABLE),
        (SPOOKY, Capabilities::SPOOKY),
        (PRO_EDUCATIONAL, Capabilities::PRO_EDUCATIONAL),
        (EDUCATIONAL, Capabilities::EDUCATIONAL),
        (TERRAFORMING, Capabilities::TERRAFORMING),
        (MONOLITH, Capabilities::MONOLITH),
    ];

    fn from_tag(tag: &str) -> Option<Capabilities> {
        Self::VOCABULARY
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, cap)| *cap)
    }

    #[inline]
    pub fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Capabilities) {
        self.0 |= other.0;
    }
}

/// Parsed, duplicate-free tag set of one marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    capabilities: Capabilities,
    partnerships: Vec<String>,
    descriptive: Vec<String>,
}

impl TagSet {
    /// Parse raw catalog tags; `marker` is only used for error context
    pub fn parse<S: AsRef<str>>(marker: &str, tags: &[S]) -> Result<Self, ConfigurationError> {
        let mut set = TagSet::default();

        for tag in tags {
            let tag = tag.as_ref();
            let malformed = || ConfigurationError::MalformedTag {
                marker: marker.to_string(),
                tag: tag.to_string(),
            };

            if !is_well_formed(tag) {
                return Err(malformed());
            }

            if let Some(cap) = Capabilities::from_tag(tag) {
                set.capabilities.insert(cap);
            } else if let Some(suffix) = tag.strip_prefix(SYNERGY_PARTNERSHIP_PREFIX) {
                if suffix.is_empty() {
                    return Err(malformed());
                }
                set.partnerships.push(suffix.to_string());
            } else {
                set.descriptive.push(tag.to_string());
            }
        }

        set.partnerships.sort();
        set.partnerships.dedup();
        set.descriptive.sort();
        set.descriptive.dedup();
        Ok(set)
    }

    #[inline]
    pub fn has(&self, cap: Capabilities) -> bool {
        self.capabilities.contains(cap)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Synergy partnership suffixes, sorted
    pub fn partnerships(&self) -> &[String] {
        &self.partnerships
    }

    /// Free-form tags outside the fixed vocabulary, sorted
    pub fn descriptive(&self) -> &[String] {
        &self.descriptive
    }

    /// Rebuild the full tag list (vocabulary, partnerships, descriptive)
    pub fn to_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Capabilities::VOCABULARY
            .iter()
            .filter(|(_, cap)| self.capabilities.contains(*cap))
            .map(|(name, _)| name.to_string())
            .collect();
        tags.extend(
            self.partnerships
                .iter()
                .map(|s| format!("{}{}", SYNERGY_PARTNERSHIP_PREFIX, s)),
        );
        tags.extend(self.descriptive.iter().cloned());
        tags
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_tags().join(", "))
    }
}

fn is_well_formed(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_sets_capabilities() {
        let tags = TagSet::parse("m", &["global", "spooky", "surface"]).unwrap();
        assert!(tags.has(Capabilities::GLOBAL));
        assert!(tags.has(Capabilities::SPOOKY));
        assert!(!tags.has(Capabilities::TERRAFORMING));
        assert_eq!(tags.descriptive(), ["surface".to_string()]);
    }

    #[test]
    fn test_partnership_suffixes_are_extracted() {
        let tags = TagSet::parse("m", &["synergy_partnership_1", "synergy_partnership_b", "pictoral"])
            .unwrap();
        assert_eq!(tags.partnerships(), ["1".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let err = TagSet::parse("m", &["Synergy_Partnership_1"]).unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedTag { .. }));
    }

    #[test]
    fn test_empty_partnership_suffix_is_malformed() {
        assert!(TagSet::parse("m", &["synergy_partnership_"]).is_err());
    }

    #[test]
    fn test_whitespace_and_empty_tags_are_malformed() {
        assert!(TagSet::parse("m", &["low tech"]).is_err());
        assert!(TagSet::parse("m", &[""]).is_err());
    }

    #[test]
    fn test_duplicates_collapse_and_order_is_irrelevant() {
        let a = TagSet::parse("m", &["spooky", "surface", "spooky", "synergy_partnership_1"]).unwrap();
        let b = TagSet::parse("m", &["synergy_partnership_1", "surface", "spooky"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_tags().len(), 3);
    }
}
