//! Paint error types

use thiserror::Error;

/// Errors raised when raw pixel data does not fit a surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Raw RGBA buffer has the wrong length for the requested size
    #[error("Invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },
}

/// Result type for paint operations
pub type Result<T> = std::result::Result<T, SurfaceError>;
