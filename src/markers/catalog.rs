//! Marker catalog: the load-once registry of marker definitions.
//!
//! The catalog is parsed from TOML and validated in full before it is handed
//! out, so a run never meets an unknown curve, a malformed tag, a dangling
//! ruin link or an undefined synergy partnership. The built-in catalog is
//! embedded at compile time and shared process-wide.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use ahash::AHashMap;
use serde::Deserialize;

use crate::core::error::ConfigurationError;
use crate::core::types::{Attribute, Profile};
use crate::markers::curves::DecayCurve;
use crate::markers::definition::{AttributeProfile, MarkerDefinition};
use crate::markers::tags::TagSet;

const BUILTIN_CATALOG: &str = include_str!("../../data/markers.toml");

/// Mutual bonus granted to co-located markers sharing a partnership suffix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partnership {
    pub attribute: Attribute,
    pub bonus: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default, rename = "marker")]
    markers: Vec<RawMarker>,
    #[serde(default, rename = "partnership")]
    partnerships: BTreeMap<String, RawPartnership>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMarker {
    key: String,
    name: String,
    #[serde(default)]
    description: String,
    base_cost: u64,
    #[serde(default)]
    ruin: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    visibility: RawAttribute,
    understandability: RawAttribute,
    respectability: RawAttribute,
    likability: RawAttribute,
    usability: RawAttribute,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAttribute {
    init: [f32; 3],
    curve: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPartnership {
    attribute: String,
    bonus: f32,
}

/// Registry of marker definitions, in catalog order
#[derive(Debug, Clone)]
pub struct MarkerCatalog {
    markers: Vec<MarkerDefinition>,
    by_key: AHashMap<String, usize>,
    partnerships: BTreeMap<String, Partnership>,
}

impl MarkerCatalog {
    /// Parse and validate a catalog document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| ConfigurationError::Parse(e.to_string()))?;

        let mut partnerships = BTreeMap::new();
        for (suffix, raw) in file.partnerships {
            let attribute = raw.attribute.parse::<Attribute>().map_err(|e| {
                ConfigurationError::InvalidConfig(format!("partnership '{}': {}", suffix, e))
            })?;
            if !raw.bonus.is_finite() {
                return Err(ConfigurationError::InvalidConfig(format!(
                    "partnership '{}' has a non-finite bonus",
                    suffix
                )));
            }
            partnerships.insert(suffix, Partnership { attribute, bonus: raw.bonus });
        }

        let mut markers = Vec::with_capacity(file.markers.len());
        let mut by_key = AHashMap::with_capacity(file.markers.len());
        for raw in file.markers {
            let definition = build_definition(raw)?;
            if by_key.contains_key(&definition.key) {
                return Err(ConfigurationError::DuplicateMarker(definition.key));
            }
            for suffix in definition.get_synergy_partnerships() {
                if !partnerships.contains_key(suffix) {
                    return Err(ConfigurationError::UnknownPartnership {
                        marker: definition.key.clone(),
                        suffix: suffix.clone(),
                    });
                }
            }
            by_key.insert(definition.key.clone(), markers.len());
            markers.push(definition);
        }

        let catalog = Self { markers, by_key, partnerships };
        catalog.validate_ruins()?;
        Ok(catalog)
    }

    /// The embedded catalog shared by the whole process
    pub fn builtin() -> Result<&'static MarkerCatalog, ConfigurationError> {
        static CATALOG: OnceLock<Result<MarkerCatalog, ConfigurationError>> = OnceLock::new();
        CATALOG
            .get_or_init(|| MarkerCatalog::from_toml_str(BUILTIN_CATALOG))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Look up a definition by key
    pub fn get(&self, key: &str) -> Result<&MarkerDefinition, ConfigurationError> {
        self.by_key
            .get(key)
            .map(|&idx| &self.markers[idx])
            .ok_or_else(|| ConfigurationError::UnknownMarker(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// All marker keys, in catalog order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|m| m.key.as_str())
    }

    /// Keys the shop may offer
    pub fn purchasable_keys(&self) -> impl Iterator<Item = &str> {
        self.markers
            .iter()
            .filter(|m| m.is_purchasable())
            .map(|m| m.key.as_str())
    }

    pub fn base_cost(&self, key: &str) -> Result<u64, ConfigurationError> {
        self.get(key).map(|m| m.base_cost)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerDefinition> {
        self.markers.iter()
    }

    pub fn partnership(&self, suffix: &str) -> Option<&Partnership> {
        self.partnerships.get(suffix)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn validate_ruins(&self) -> Result<(), ConfigurationError> {
        for marker in &self.markers {
            let Some(ruin) = &marker.ruin else { continue };
            let target = self.get(ruin).map_err(|_| ConfigurationError::UnknownRuin {
                marker: marker.key.clone(),
                ruin: ruin.clone(),
            })?;
            if target.is_purchasable() {
                return Err(ConfigurationError::InvalidConfig(format!(
                    "ruin '{}' of marker '{}' must be non-purchasable",
                    ruin, marker.key
                )));
            }
        }
        Ok(())
    }
}

fn build_definition(raw: RawMarker) -> Result<MarkerDefinition, ConfigurationError> {
    let key = raw.key;
    let attribute = |attr: Attribute, raw: RawAttribute| build_attribute(&key, attr, raw);

    Ok(MarkerDefinition {
        visibility: attribute(Attribute::Visibility, raw.visibility)?,
        understandability: attribute(Attribute::Understandability, raw.understandability)?,
        respectability: attribute(Attribute::Respectability, raw.respectability)?,
        likability: attribute(Attribute::Likability, raw.likability)?,
        usability: attribute(Attribute::Usability, raw.usability)?,
        tags: TagSet::parse(&key, &raw.tags)?,
        name: raw.name,
        description: raw.description,
        base_cost: raw.base_cost,
        ruin: raw.ruin,
        key,
    })
}

fn build_attribute(
    marker: &str,
    attr: Attribute,
    raw: RawAttribute,
) -> Result<AttributeProfile, ConfigurationError> {
    let curve = raw
        .curve
        .parse::<DecayCurve>()
        .map_err(|curve| ConfigurationError::UnknownCurve {
            marker: marker.to_string(),
            curve,
        })?;
    let init = Profile(raw.init);
    let invalid = |reason: String| ConfigurationError::InvalidProfile {
        marker: marker.to_string(),
        attribute: attr.name().to_string(),
        reason,
    };

    if init.0.iter().any(|v| !v.is_finite()) {
        return Err(invalid("values must be finite".into()));
    }
    if let Some(cap) = curve.ceiling() {
        if init.max_value() > cap {
            return Err(invalid(format!("{} starts above its ceiling of {}", curve, cap)));
        }
    }
    if curve == DecayCurve::TechCurve && !(init.low() <= init.medium() && init.medium() <= init.high()) {
        return Err(invalid("tech_curve profiles must not fall with technology".into()));
    }

    Ok(AttributeProfile::new(init, curve))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = r#"
visibility = { init = [1.0, 1.0, 1.0], curve = "constant" }
understandability = { init = [0.0, 0.0, 0.0], curve = "constant" }
respectability = { init = [0.0, 0.0, 0.0], curve = "constant" }
likability = { init = [0.0, 0.0, 0.0], curve = "constant" }
usability = { init = [0.0, 0.0, 0.0], curve = "constant" }
"#;

    fn marker(key: &str, extra: &str) -> String {
        format!("[[marker]]\nkey = \"{key}\"\nname = \"{key}\"\nbase_cost = 5\n{extra}\n{FLAT}\n")
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = MarkerCatalog::builtin().expect("builtin catalog is valid");
        assert!(catalog.len() > 40);
        assert!(catalog.contains("granite-monolith"));
        assert!(catalog.contains("core-top-left"));
    }

    #[test]
    fn test_builtin_lookup_and_predicates() {
        let catalog = MarkerCatalog::builtin().unwrap();
        let cult = catalog.get("good-cult").unwrap();
        assert!(cult.is_global());
        assert_eq!(cult.base_cost, 2_000_000);
        assert!(catalog.get("spike-field").unwrap().is_terraforming());
        assert!(catalog.get("danger-sign").unwrap().has_synergy_partnership());
        assert!(!catalog.get("ruined-metal-monolith").unwrap().is_purchasable());
    }

    #[test]
    fn test_unknown_marker_lookup_fails() {
        let catalog = MarkerCatalog::builtin().unwrap();
        assert_eq!(
            catalog.get("obelisk").unwrap_err(),
            ConfigurationError::UnknownMarker("obelisk".into())
        );
    }

    #[test]
    fn test_keys_preserve_catalog_order() {
        let catalog = MarkerCatalog::builtin().unwrap();
        let keys: Vec<&str> = catalog.keys().collect();
        assert_eq!(keys[0], "granite-monolith");
        assert_eq!(keys.len(), catalog.len());
    }

    #[test]
    fn test_purchasable_keys_skip_ruins_and_terrain() {
        let catalog = MarkerCatalog::builtin().unwrap();
        let shop: Vec<&str> = catalog.purchasable_keys().collect();
        assert!(shop.contains(&"spike-field"));
        assert!(!shop.contains(&"ruined-granite-monolith"));
        assert!(!shop.contains(&"sand"));
    }

    #[test]
    fn test_builtin_partnership_bonds_visibility() {
        let catalog = MarkerCatalog::builtin().unwrap();
        let bond = catalog.partnership("1").unwrap();
        assert_eq!(bond.attribute, Attribute::Visibility);
        assert!(bond.bonus > 0.0);
    }

    #[test]
    fn test_unknown_curve_fails_at_load() {
        let doc = marker("m", "").replace(
            "visibility = { init = [1.0, 1.0, 1.0], curve = \"constant\" }",
            "visibility = { init = [1.0, 1.0, 1.0], curve = \"wobble\" }",
        );
        let err = MarkerCatalog::from_toml_str(&doc).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownCurve { marker: "m".into(), curve: "wobble".into() }
        );
    }

    #[test]
    fn test_undefined_partnership_fails_at_load() {
        let doc = marker("m", "tags = [\"synergy_partnership_7\"]");
        let err = MarkerCatalog::from_toml_str(&doc).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownPartnership { ref suffix, .. } if suffix == "7"));
    }

    #[test]
    fn test_duplicate_key_fails_at_load() {
        let doc = format!("{}{}", marker("m", ""), marker("m", ""));
        assert_eq!(
            MarkerCatalog::from_toml_str(&doc).unwrap_err(),
            ConfigurationError::DuplicateMarker("m".into())
        );
    }

    #[test]
    fn test_dangling_ruin_fails_at_load() {
        let doc = marker("m", "ruin = \"m-ruin\"");
        assert!(matches!(
            MarkerCatalog::from_toml_str(&doc).unwrap_err(),
            ConfigurationError::UnknownRuin { .. }
        ));
    }

    #[test]
    fn test_purchasable_ruin_rejected() {
        let doc = format!("{}{}", marker("m", "ruin = \"n\""), marker("n", ""));
        assert!(matches!(
            MarkerCatalog::from_toml_str(&doc).unwrap_err(),
            ConfigurationError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_increasing_profile_above_ceiling_rejected() {
        let doc = marker("m", "").replace(
            "respectability = { init = [0.0, 0.0, 0.0], curve = \"constant\" }",
            "respectability = { init = [4.0, 4.0, 4.0], curve = \"slow_lin_inc_3\" }",
        );
        assert!(matches!(
            MarkerCatalog::from_toml_str(&doc).unwrap_err(),
            ConfigurationError::InvalidProfile { .. }
        ));
    }

    #[test]
    fn test_falling_tech_curve_rejected() {
        let doc = marker("m", "").replace(
            "respectability = { init = [0.0, 0.0, 0.0], curve = \"constant\" }",
            "respectability = { init = [5.0, 3.0, 1.0], curve = \"tech_curve\" }",
        );
        assert!(MarkerCatalog::from_toml_str(&doc).is_err());
    }

    #[test]
    fn test_malformed_tag_fails_at_load() {
        let doc = marker("m", "tags = [\"Low Tech\"]");
        assert!(matches!(
            MarkerCatalog::from_toml_str(&doc).unwrap_err(),
            ConfigurationError::MalformedTag { .. }
        ));
    }
}
