//! Error types for the flow field.

use thiserror::Error;

/// Errors that can occur while building or rendering the particle field.
#[derive(Error, Debug)]
pub enum FlowFieldError {
    /// The canvas cannot be allocated at this size.
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },

    /// A particle setting is out of range.
    #[error("invalid particle configuration: {0}")]
    InvalidConfig(String),

    /// PNG encoding failed.
    #[error("frame encoding failed: {0}")]
    EncodeFailed(String),
}

impl FlowFieldError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<std::io::Error> for FlowFieldError {
    fn from(err: std::io::Error) -> Self {
        Self::EncodeFailed(err.to_string())
    }
}

/// Result type for flow field operations.
pub type Result<T> = std::result::Result<T, FlowFieldError>;
