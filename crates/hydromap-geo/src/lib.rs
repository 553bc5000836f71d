//! # hydromap-geo
//!
//! Geometry codec and GeoJSON projection for the hydromap catalog.
//!
//! This crate provides:
//! - WKB/EWKB decoding to an in-memory geometry model
//! - GeoJSON geometry, Feature, and FeatureCollection output types
//! - The projection from a resolved perceptual model to a Feature with
//!   denormalized related-entity properties
//!
//! ## Example
//!
//! ```ignore
//! use hydromap_geo::{project_feature, project_collection};
//!
//! let bundle = db.perceptual_models.get_bundle(42).await?
//!     .ok_or_else(|| Error::NotFound("perceptual model 42".into()))?;
//! let feature = project_feature(&bundle)?;
//! ```

pub mod geojson;
pub mod projection;
pub mod wkb;

// Re-export core types
pub use hydromap_core::*;

pub use geojson::{Feature, FeatureCollection, GeoJsonGeometry};
pub use projection::{project_collection, project_feature};
pub use wkb::{decode, DecodedGeometry, Geometry, Position, WkbError};
