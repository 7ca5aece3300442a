//! Granule download with exponential backoff retry.
//!
//! PO.DAAC serves PIXC granules behind Earthdata Login. Requests carry an
//! optional bearer token; transport errors and 5xx/429 responses are retried,
//! other statuses fail immediately.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{CatalogError, CatalogResult};

/// Retry settings for downloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    #[serde(with = "millis")]
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    #[serde(with = "millis")]
    pub max_retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `n` (1-based): `initial * 2^(n-1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        std::cmp::min(
            self.initial_retry_delay.saturating_mul(factor),
            self.max_retry_delay,
        )
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Run `op` until it succeeds, fails permanently, or retries run out.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> CatalogResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CatalogResult<T>>,
{
    let mut retry_count = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                retry_count += 1;
                if retry_count > policy.max_retries {
                    return Err(CatalogError::DownloadFailed {
                        attempts: retry_count,
                        message: e.to_string(),
                    });
                }

                let delay = policy.delay_for(retry_count);
                warn!(
                    error = %e,
                    retry = retry_count,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Download failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// One GET of `url`, returning the full body.
async fn download_once(client: &Client, url: &str, token: Option<&str>) -> CatalogResult<Bytes> {
    let mut request = client.get(url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.bytes().await?)
}

/// Download a granule with retry.
#[instrument(skip(client, token, policy), fields(url = %url))]
pub async fn download(
    client: &Client,
    url: &str,
    token: Option<&str>,
    policy: &RetryPolicy,
) -> CatalogResult<Bytes> {
    let body = retry_with_backoff(policy, || download_once(client, url, token)).await?;
    info!(bytes = body.len(), "Download completed");
    Ok(body)
}
