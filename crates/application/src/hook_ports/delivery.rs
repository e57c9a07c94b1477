use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use hookwire_core::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fully prepared outbound hook call.
#[derive(Debug, Clone, PartialEq)]
pub struct HookRequestOptions {
    /// Lowercase header names mapped to values.
    pub headers: BTreeMap<String, String>,
    /// JSON body.
    pub json: Value,
    /// Retries allowed after the first attempt.
    pub retry_limit: u8,
    /// Wall-clock budget for the whole delivery, retries included.
    pub timeout: Duration,
}

/// Response captured from a hook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Parsed JSON body, or the raw text when it is not JSON.
    pub body: Value,
}

impl HookResponse {
    /// Builds a response from raw body text.
    #[must_use]
    pub fn from_text(status_code: u16, text: &str) -> Self {
        let body = serde_json::from_str::<Value>(text)
            .unwrap_or_else(|_| Value::String(text.to_owned()));

        Self { status_code, body }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Port for outbound hook HTTP delivery.
#[async_trait]
pub trait HookDeliveryClient: Send + Sync {
    /// Posts the prepared request and returns the last response received.
    ///
    /// Non-2xx responses are returned as `Ok`; `Err` means no response was
    /// obtained (transport failure or timeout).
    async fn post(&self, url: &str, options: &HookRequestOptions) -> AppResult<HookResponse>;
}
