//! Error types for pixel cloud reading.

use swath_common::PipelineError;
use thiserror::Error;

/// Result type for pixel cloud reader operations.
pub type PixcResult<T> = Result<T, PixcError>;

/// Error types for pixel cloud reading.
#[derive(Error, Debug)]
pub enum PixcError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing group, variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// The file is not a readable pixel cloud
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// The columns were read but do not form a valid point cloud
    #[error(transparent)]
    Schema(#[from] PipelineError),

    /// The input format needs a capability this build does not have
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl PixcError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            PixcError::IoError(_) => 500,
            PixcError::Schema(e) => e.http_status_code(),
            PixcError::MissingData(_) | PixcError::InvalidFormat(_) => 400,
            PixcError::Unsupported(_) => 501,
        }
    }

    /// Stable machine-readable kind, used in HTTP error bodies.
    pub fn error_kind(&self) -> &'static str {
        match self {
            PixcError::Schema(e) => e.error_kind(),
            PixcError::IoError(_) => "IoError",
            PixcError::MissingData(_) | PixcError::InvalidFormat(_) => "InputSchemaError",
            PixcError::Unsupported(_) => "UnsupportedError",
        }
    }
}
