use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApplicationSnapshot, HookEvent, InteractionEvent, UserSnapshot};

/// Body delivered to a hook subscriber.
///
/// Optional fields are omitted from the wire form when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookEventPayload {
    /// Hook the payload is addressed to.
    pub hook_id: String,
    /// Hook event kind.
    pub event: HookEvent,
    /// Interaction label that caused the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_event: Option<InteractionEvent>,
    /// Dispatch time as an ISO-8601 string with millisecond precision.
    pub created_at: String,
    /// Interaction session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// User agent of the end-user request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Subject account identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Subject user snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSnapshot>,
    /// Client application snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationSnapshot>,
}

impl HookEventPayload {
    /// Creates a payload with only the mandatory fields set.
    #[must_use]
    pub fn new(hook_id: impl Into<String>, event: HookEvent, created_at: DateTime<Utc>) -> Self {
        Self {
            hook_id: hook_id.into(),
            event,
            interaction_event: None,
            created_at: format_timestamp(created_at),
            session_id: None,
            user_agent: None,
            user_id: None,
            user: None,
            application: None,
        }
    }
}

/// Formats a timestamp the way hook payloads carry it, e.g. `1970-01-01T00:01:40.000Z`.
#[must_use]
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
