//! Error types for the station dashboard.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Primary error type for catalog, geometry and viewport operations.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid station level: {0}")]
    InvalidLevel(u8),

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Failed to read station catalog: {0}")]
    CatalogError(String),
}

impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        MapError::CatalogError(err.to_string())
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::CatalogError(format!("JSON error: {}", err))
    }
}
