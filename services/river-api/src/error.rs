//! HTTP error responses.
//!
//! Every failure is reported as `{"error": <kind>, "message": <text>}` with a
//! status derived from the underlying error.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use granule_catalog::CatalogError;
use pixc_reader::PixcError;
use serde::Serialize;
use swath_common::PipelineError;
use thiserror::Error;
use tracing::{error, warn};

use crate::metrics::ApiMetrics;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Pixc(#[from] PixcError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Malformed request that never reached the pipeline
    #[error("{message}")]
    BadRequest { kind: &'static str, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        let code = match self {
            ApiError::Pipeline(e) => e.http_status_code(),
            ApiError::Pixc(e) => e.http_status_code(),
            ApiError::Catalog(e) => e.http_status_code(),
            ApiError::BadRequest { .. } => 400,
            ApiError::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Pipeline(e) => e.error_kind(),
            ApiError::Pixc(e) => e.error_kind(),
            ApiError::Catalog(e) => e.error_kind(),
            ApiError::BadRequest { kind, .. } => *kind,
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("InputSchemaError", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request("ParameterError", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        if status.is_server_error() {
            error!(error = %self, kind, "Request failed");
        } else {
            warn!(error = %self, kind, "Request rejected");
        }
        ApiMetrics::record_error(kind);

        let body = ErrorBody {
            error: kind.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let e = ApiError::from(PipelineError::Projection("no zone".into()));
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.kind(), "ProjectionError");

        let e = ApiError::from(PipelineError::missing_field("height"));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.kind(), "InputSchemaError");

        let e = ApiError::bad_request("MissingUrl", "No URL provided");
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.to_string(), "No URL provided");

        let e = ApiError::from(CatalogError::DownloadFailed {
            attempts: 4,
            message: "503".into(),
        });
        assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
    }
}
