use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use hookwire_application::{HookDeliveryClient, HookRequestOptions, HookResponse};
use hookwire_core::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// reqwest-backed hook delivery with exponential retry backoff.
pub struct ReqwestHookDeliveryClient {
    http_client: reqwest::Client,
    retry_backoff_ms: u64,
    timeout_override: Option<Duration>,
}

impl ReqwestHookDeliveryClient {
    /// Creates a delivery client.
    #[must_use]
    pub fn new(http_client: reqwest::Client, retry_backoff_ms: u64) -> Self {
        Self {
            http_client,
            retry_backoff_ms,
            timeout_override: None,
        }
    }

    /// Replaces the per-request timeout budget carried by request options.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    /// Delay before retry number `retry` (1-based).
    fn retry_delay(&self, retry: u8) -> Duration {
        let factor = 1_u64
            .checked_shl(u32::from(retry.saturating_sub(1)))
            .unwrap_or(u64::MAX);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor)).min(MAX_RETRY_DELAY)
    }

    async fn send_once(
        &self,
        url: &str,
        options: &HookRequestOptions,
        headers: &HeaderMap,
    ) -> Result<HookResponse, String> {
        // `headers` replaces same-named defaults set by `json`.
        let response = self
            .http_client
            .post(url)
            .json(&options.json)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|error| format!("failed to send hook request: {error}"))?;
        let status_code = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|error| format!("failed to read hook response: {error}"))?;

        Ok(HookResponse::from_text(status_code, text.as_str()))
    }

    async fn deliver_with_retry(
        &self,
        url: &str,
        options: &HookRequestOptions,
    ) -> AppResult<HookResponse> {
        let headers = header_map(&options.headers)?;
        let mut retries = 0_u8;

        loop {
            let attempt = self.send_once(url, options, &headers).await;
            let exhausted = retries >= options.retry_limit;

            match attempt {
                Ok(response) if !is_transient_status(response.status_code) || exhausted => {
                    return Ok(response);
                }
                Err(error) if exhausted => return Err(AppError::Internal(error)),
                Ok(response) => {
                    debug!(url = %url, status = response.status_code, retries, "retrying hook delivery");
                }
                Err(error) => {
                    debug!(url = %url, error = %error, retries, "retrying hook delivery");
                }
            }

            retries = retries.saturating_add(1);
            tokio::time::sleep(self.retry_delay(retries)).await;
        }
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|error| {
            AppError::Validation(format!("invalid hook header name '{name}': {error}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|error| {
            AppError::Validation(format!("invalid value for hook header '{name}': {error}"))
        })?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

fn is_transient_status(status_code: u16) -> bool {
    matches!(status_code, 408 | 429 | 500..=599)
}

#[async_trait]
impl HookDeliveryClient for ReqwestHookDeliveryClient {
    async fn post(&self, url: &str, options: &HookRequestOptions) -> AppResult<HookResponse> {
        let timeout = self.timeout_override.unwrap_or(options.timeout);

        tokio::time::timeout(timeout, self.deliver_with_retry(url, options))
            .await
            .map_err(|_| {
                AppError::Internal(format!(
                    "hook request to '{url}' timed out after {}ms",
                    timeout.as_millis()
                ))
            })?
    }
}
