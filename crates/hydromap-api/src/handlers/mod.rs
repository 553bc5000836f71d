//! HTTP handlers for the hydromap catalog API.

pub mod perceptual_models;
pub mod statistics;
pub mod taxonomy;
