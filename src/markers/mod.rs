//! Marker definitions, decay curves and the catalog that holds them

pub mod catalog;
pub mod curves;
pub mod definition;
pub mod tags;

pub use catalog::{MarkerCatalog, Partnership};
pub use curves::{evaluate, DecayCurve};
pub use definition::{AttributeProfile, MarkerDefinition};
pub use tags::{Capabilities, TagSet};
