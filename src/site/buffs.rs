//! Player-purchased modifiers applied to every cell of a run
//!
//! Buff identifiers name an attribute and a mode: `<attribute>_bonus` adds
//! its magnitude, `<attribute>_multiplier` scales the raw decayed value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigurationError, InvariantViolation, Result};
use crate::core::types::{Attribute, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuffMode {
    Bonus,
    Multiplier,
}

/// Parse a buff identifier into the attribute and mode it targets
pub fn parse_buff_id(id: &str) -> std::result::Result<(Attribute, BuffMode), ConfigurationError> {
    let unknown = || ConfigurationError::UnknownBuff(id.to_string());
    let (attr, mode) = if let Some(attr) = id.strip_suffix("_bonus") {
        (attr, BuffMode::Bonus)
    } else if let Some(attr) = id.strip_suffix("_multiplier") {
        (attr, BuffMode::Multiplier)
    } else {
        return Err(unknown());
    };
    let attribute = attr.parse::<Attribute>().map_err(|_| unknown())?;
    Ok((attribute, mode))
}

/// Buff identifier to magnitude, ordered by identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalBuffs {
    entries: BTreeMap<String, f32>,
}

impl GlobalBuffs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let mut buffs = Self::new();
        for (id, magnitude) in pairs {
            buffs.insert(id, magnitude)?;
        }
        Ok(buffs)
    }

    /// Add or replace a buff
    pub fn insert(&mut self, id: impl Into<String>, magnitude: f32) -> Result<()> {
        let id = id.into();
        parse_buff_id(&id)?;
        if !magnitude.is_finite() {
            return Err(InvariantViolation::NonFiniteBuff(id).into());
        }
        self.entries.insert(id, magnitude);
        Ok(())
    }

    /// Check entries that bypassed `insert` (deserialized buff tables)
    pub fn validate(&self) -> Result<()> {
        for (id, magnitude) in &self.entries {
            parse_buff_id(id)?;
            if !magnitude.is_finite() {
                return Err(InvariantViolation::NonFiniteBuff(id.clone()).into());
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.entries.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scale a raw profile by every multiplier on `attr`, then add every bonus
    pub fn apply(&self, attr: Attribute, raw: Profile) -> Profile {
        let mut factor = 1.0_f32;
        let mut bonus = 0.0_f32;
        for (id, &magnitude) in &self.entries {
            match parse_buff_id(id) {
                Ok((a, BuffMode::Multiplier)) if a == attr => factor *= magnitude,
                Ok((a, BuffMode::Bonus)) if a == attr => bonus += magnitude,
                _ => {}
            }
        }
        raw.map(|v| v * factor + bonus)
    }
}
