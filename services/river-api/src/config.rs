//! Service configuration loaded from YAML.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use granule_catalog::{CmrConfig, RetryPolicy};
use river_core::ProjectionParams;
use serde::{Deserialize, Serialize};
use swath_common::PipelineResult;
use tracing::{info, warn};

/// Root of `config/river-api.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub processing: ProcessingConfig,
    pub cmr: CmrConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 300,
            max_body_bytes: 256 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults for requests that omit `buffer_distance` or `spacing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub default_buffer_distance: f64,
    pub default_spacing: f64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            default_buffer_distance: 100.0,
            default_spacing: 50.0,
        }
    }
}

impl ProcessingConfig {
    /// Fill missing request values from the defaults and validate.
    pub fn resolve(
        &self,
        buffer_distance: Option<f64>,
        spacing: Option<f64>,
    ) -> PipelineResult<ProjectionParams> {
        ProjectionParams::new(
            buffer_distance.unwrap_or(self.default_buffer_distance),
            spacing.unwrap_or(self.default_spacing),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub timeout_secs: u64,
    /// Hosts granules may be fetched from; empty allows any.
    pub allowed_hosts: Vec<String>,
    pub retry: RetryPolicy,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            allowed_hosts: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_allowed_host(&self, host: &str) -> bool {
        self.allowed_hosts.is_empty()
            || self
                .allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(host))
    }
}

impl ApiConfig {
    /// Load from a YAML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                path = %path.display(),
                "Config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config: ApiConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        config
            .processing
            .resolve(None, None)
            .with_context(|| format!("Invalid processing defaults in {:?}", path))?;

        info!(path = %path.display(), "Loaded service config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = ApiConfig::load(Path::new("/nonexistent/river-api.yaml")).unwrap();
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("river-api.yaml");
        std::fs::write(
            &path,
            "processing:\n  default_spacing: 25.0\ndownload:\n  allowed_hosts: [archive.podaac.earthdata.nasa.gov]\n",
        )
        .unwrap();

        let config = ApiConfig::load(&path).unwrap();
        assert_eq!(config.processing.default_spacing, 25.0);
        assert_eq!(config.processing.default_buffer_distance, 100.0);
        assert_eq!(config.cmr.page_size, 2000);
        assert!(config.download.is_allowed_host("ARCHIVE.podaac.earthdata.nasa.gov"));
        assert!(!config.download.is_allowed_host("example.com"));
    }

    #[test]
    fn test_invalid_defaults_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("river-api.yaml");
        std::fs::write(&path, "processing:\n  default_spacing: 0.0\n").unwrap();
        assert!(ApiConfig::load(&path).is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/river-api.yaml");
        let config = ApiConfig::load(&path).unwrap();
        assert_eq!(config.download.retry.max_retries, 3);
        assert_eq!(config.download.retry.initial_retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_resolve_uses_request_values_first() {
        let processing = ProcessingConfig::default();
        let params = processing.resolve(Some(10.0), None).unwrap();
        assert_eq!(params.buffer_distance, 10.0);
        assert_eq!(params.spacing, 50.0);
        assert!(processing.resolve(Some(-1.0), None).is_err());
    }
}
