use std::collections::BTreeMap;
use std::time::Duration;

use hookwire_core::{AppError, AppResult};
use hookwire_domain::{DEFAULT_HOOK_RETRIES, HookEventPayload};

use super::signature::generate_signature;
use crate::hook_ports::HookRequestOptions;

/// User agent sent with every hook delivery.
pub const HOOK_USER_AGENT: &str = "Logto (https://logto.io)";

/// Header carrying the payload signature.
pub const HOOK_SIGNATURE_HEADER: &str = "x-logto-signature-256";

/// Wall-clock budget for one delivery, retries included.
pub const HOOK_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT_HEADER: &str = "user-agent";

/// Inputs for [`create_hook_request_options`].
#[derive(Debug, Clone, Copy)]
pub struct HookRequestInput<'a> {
    /// Hook signing secret. Empty disables signing.
    pub signing_key: &'a str,
    /// Payload to deliver.
    pub payload: &'a HookEventPayload,
    /// Hook-specific headers.
    pub custom_headers: Option<&'a BTreeMap<String, String>>,
    /// Hook-specific retry count.
    pub retries: Option<u8>,
}

/// Builds the outbound request for one hook delivery.
///
/// Custom headers may replace the user agent but never the signature header:
/// it is always computed from the payload, or dropped when there is no key.
pub fn create_hook_request_options(input: HookRequestInput<'_>) -> AppResult<HookRequestOptions> {
    let json = serde_json::to_value(input.payload).map_err(|error| {
        AppError::Internal(format!("hook payload is not serializable: {error}"))
    })?;

    let mut headers = BTreeMap::from([(USER_AGENT_HEADER.to_owned(), HOOK_USER_AGENT.to_owned())]);
    if let Some(custom_headers) = input.custom_headers {
        for (name, value) in custom_headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }
    }

    headers.remove(HOOK_SIGNATURE_HEADER);
    if !input.signing_key.is_empty() {
        headers.insert(
            HOOK_SIGNATURE_HEADER.to_owned(),
            generate_signature(input.signing_key, &json)?,
        );
    }

    Ok(HookRequestOptions {
        headers,
        json,
        retry_limit: input.retries.unwrap_or(DEFAULT_HOOK_RETRIES),
        timeout: HOOK_REQUEST_TIMEOUT,
    })
}
