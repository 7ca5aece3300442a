//! Error types for granule search and download.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// The search parameters cannot form a CMR query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Upstream answered with a non-success status
    #[error("Failed to retrieve data: {status} from {url}")]
    Status { status: u16, url: String },

    /// Transport failure talking to upstream
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a body that is not the expected JSON
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Every download attempt failed
    #[error("Download failed after {attempts} attempts: {message}")]
    DownloadFailed { attempts: u32, message: String },
}

impl CatalogError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            CatalogError::InvalidQuery(_) => 400,
            // Pass client-side upstream statuses (401, 404, ...) through
            CatalogError::Status { status, .. } if (400..500).contains(status) => *status,
            CatalogError::Status { .. }
            | CatalogError::Http(_)
            | CatalogError::Decode(_)
            | CatalogError::DownloadFailed { .. } => 502,
        }
    }

    /// Stable machine-readable kind, used in HTTP error bodies.
    pub fn error_kind(&self) -> &'static str {
        match self {
            CatalogError::InvalidQuery(_) => "InvalidQuery",
            CatalogError::Status { .. } => "UpstreamStatus",
            CatalogError::Http(_) => "UpstreamUnavailable",
            CatalogError::Decode(_) => "UpstreamResponse",
            CatalogError::DownloadFailed { .. } => "DownloadFailed",
        }
    }

    /// Whether a retry could succeed: transport errors and 5xx/429 statuses.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Http(_) => true,
            CatalogError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = CatalogError::Status {
            status: 404,
            url: "https://example.com/x.nc".to_string(),
        };
        assert_eq!(not_found.http_status_code(), 404);
        assert!(!not_found.is_transient());

        let unavailable = CatalogError::Status {
            status: 503,
            url: "https://example.com/x.nc".to_string(),
        };
        assert_eq!(unavailable.http_status_code(), 502);
        assert!(unavailable.is_transient());

        assert_eq!(CatalogError::InvalidQuery("x".into()).http_status_code(), 400);
    }
}
