//! Error types for the projection pipeline.

use thiserror::Error;

use crate::crs::CrsParseError;

/// Result type alias using PipelineError.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Fatal errors raised by the projection pipeline.
///
/// An empty corridor intersection is not an error; it yields zero records.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required point cloud field is missing or has the wrong length.
    #[error("Invalid input field '{field}': {message}")]
    InputSchema { field: String, message: String },

    /// A numeric parameter is outside its allowed range.
    #[error("Invalid parameter '{name}' = {value}: {message}")]
    Parameter {
        name: String,
        value: f64,
        message: String,
    },

    /// The centerline is empty or degenerate.
    #[error("Invalid centerline geometry: {0}")]
    Geometry(String),

    /// No planar CRS could be resolved for the input extent.
    #[error("Projection error: {0}")]
    Projection(String),
}

impl PipelineError {
    pub fn missing_field(field: &str) -> Self {
        PipelineError::InputSchema {
            field: field.to_string(),
            message: "required field is missing".to_string(),
        }
    }

    pub fn parameter(name: &str, value: f64, message: impl Into<String>) -> Self {
        PipelineError::Parameter {
            name: name.to_string(),
            value,
            message: message.into(),
        }
    }

    /// Stable machine-readable kind, used in HTTP error bodies.
    pub fn error_kind(&self) -> &'static str {
        match self {
            PipelineError::InputSchema { .. } => "InputSchemaError",
            PipelineError::Parameter { .. } => "ParameterError",
            PipelineError::Geometry(_) => "GeometryError",
            PipelineError::Projection(_) => "ProjectionError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            PipelineError::InputSchema { .. }
            | PipelineError::Parameter { .. }
            | PipelineError::Geometry(_) => 400,

            PipelineError::Projection(_) => 422,
        }
    }
}

impl From<CrsParseError> for PipelineError {
    fn from(err: CrsParseError) -> Self {
        PipelineError::Projection(err.to_string())
    }
}
