//! Error types for Terrarium

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrariumError {
    // Session errors
    #[error("could not initialize earth engine. {reason}")]
    Initialization { reason: String },

    #[error("earth engine session is not initialized")]
    NotInitialized,

    // Geometry errors
    #[error("could not parse geojson. {reason}")]
    GeometryParse { reason: String },

    #[error("could not generate geojson. unsupported shape: {kind}")]
    UnsupportedShape { kind: String },

    #[error("could not {operation}. unsupported shape type: {kind}")]
    ShapeType { operation: String, kind: String },

    #[error("could not {operation}. projection failed: {reason}")]
    Projection { operation: String, reason: String },

    // Geocoding errors
    #[error("could not generate geocoded address. {reason}")]
    Geocoding { reason: String },

    // Imagery errors
    #[error("unsupported spectral index: {index}. expected one of TCI, NDVI")]
    UnsupportedIndex { index: String },

    #[error("could not {operation}. error: {reason}")]
    Remote { operation: String, reason: String },

    #[error("invalid argument for {operation}: {reason}")]
    InvalidArgument { operation: String, reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("could not read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TerrariumError {
    /// Build a [`TerrariumError::Remote`] naming the failed operation
    pub fn remote(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        TerrariumError::Remote { operation: operation.into(), reason: reason.to_string() }
    }

    /// Build a [`TerrariumError::Initialization`] from any displayable cause
    pub fn initialization(reason: impl std::fmt::Display) -> Self {
        TerrariumError::Initialization { reason: reason.to_string() }
    }

    /// Build a [`TerrariumError::GeometryParse`] from any displayable cause
    pub fn geometry_parse(reason: impl std::fmt::Display) -> Self {
        TerrariumError::GeometryParse { reason: reason.to_string() }
    }
}

impl From<serde_json::Error> for TerrariumError {
    fn from(e: serde_json::Error) -> Self {
        TerrariumError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TerrariumError>;
