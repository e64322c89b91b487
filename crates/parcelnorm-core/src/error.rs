//! Error types for parcelnorm

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParcelError {
    // Per-polygon errors, recovered by the pipeline and written to the report
    #[error("Malformed coordinates: {reason}")]
    Parse { reason: String },

    #[error("Invalid ring: {reason}")]
    Validity { reason: String },

    #[error("Area {area_acres:.6} acres is below the minimum of {minimum_acres} acres")]
    BelowMinimumArea { area_acres: f64, minimum_acres: f64 },

    #[error("Polygon {id} conflicts with accepted geometry: {reason}")]
    IntersectionConflict { id: String, reason: String },

    // Run-level errors
    #[error("Spatial index failure: {reason}")]
    Index { reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ParcelError {
    pub fn parse(reason: impl Into<String>) -> Self {
        ParcelError::Parse { reason: reason.into() }
    }

    pub fn validity(reason: impl Into<String>) -> Self {
        ParcelError::Validity { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ParcelError>;
