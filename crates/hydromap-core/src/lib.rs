//! # hydromap-core
//!
//! Core types, traits, and abstractions for the hydromap catalog.
//!
//! This crate provides the domain entities (perceptual models, locations,
//! citations, taxonomies, zone and model types), the repository traits the
//! database layer implements, the shared error type, and the runtime
//! configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{ApiConfig, NullModelTypePolicy, DEFAULT_NULL_MODEL_TYPE_LABEL};
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
