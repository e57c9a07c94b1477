use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use hookwire_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use url::Url;

/// Retry count applied when a hook does not configure one.
pub const DEFAULT_HOOK_RETRIES: u8 = 3;

/// Upper bound accepted for a hook's retry count.
pub const MAX_HOOK_RETRIES: u8 = 10;

/// Event kinds a hook subscription can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HookEvent {
    /// Fired after a new account finished registration.
    PostRegister,
    /// Fired after a successful sign-in.
    PostSignIn,
    /// Fired after a password reset completed.
    PostResetPassword,
}

impl HookEvent {
    /// Returns the stable storage and wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostRegister => "PostRegister",
            Self::PostSignIn => "PostSignIn",
            Self::PostResetPassword => "PostResetPassword",
        }
    }

    /// Returns all known hook events.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[HookEvent] = &[
            HookEvent::PostRegister,
            HookEvent::PostSignIn,
            HookEvent::PostResetPassword,
        ];

        ALL
    }
}

impl Display for HookEvent {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PostRegister" => Ok(Self::PostRegister),
            "PostSignIn" => Ok(Self::PostSignIn),
            "PostResetPassword" => Ok(Self::PostResetPassword),
            _ => Err(AppError::Validation(format!(
                "unknown hook event value '{value}'"
            ))),
        }
    }
}

/// Delivery settings for one hook subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    url: String,
    headers: BTreeMap<String, String>,
    retries: Option<u8>,
}

impl HookConfig {
    /// Creates a validated delivery configuration.
    ///
    /// Header names are normalized to lowercase so later merges are
    /// case-insensitive.
    pub fn new(
        url: impl Into<String>,
        headers: BTreeMap<String, String>,
        retries: Option<u8>,
    ) -> AppResult<Self> {
        let url = url.into();
        let parsed = Url::parse(url.as_str())
            .map_err(|error| AppError::Validation(format!("invalid hook url '{url}': {error}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "hook url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if let Some(retries) = retries
            && retries > MAX_HOOK_RETRIES
        {
            return Err(AppError::Validation(format!(
                "hook retries must be less than or equal to {MAX_HOOK_RETRIES}"
            )));
        }

        let mut normalized = BTreeMap::new();
        for (name, value) in headers {
            let name = name.trim().to_ascii_lowercase();
            if !is_header_token(name.as_str()) {
                return Err(AppError::Validation(format!(
                    "invalid hook header name '{name}'"
                )));
            }
            normalized.insert(name, value);
        }

        Ok(Self {
            url,
            headers: normalized,
            retries,
        })
    }

    /// Returns the destination URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the custom headers sent with each delivery.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the configured retry count, if any.
    #[must_use]
    pub fn retries(&self) -> Option<u8> {
        self.retries
    }
}

fn is_header_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|byte| {
            byte.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&byte)
        })
}

/// Tenant-configured webhook subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    id: NonEmptyString,
    name: NonEmptyString,
    event: Option<HookEvent>,
    events: Vec<HookEvent>,
    signing_key: String,
    enabled: bool,
    config: HookConfig,
    created_at: DateTime<Utc>,
}

/// Input payload used to construct a validated hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookInput {
    /// Stable hook identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Deprecated single-event subscription kept for older records.
    pub event: Option<HookEvent>,
    /// Subscribed event kinds.
    pub events: Vec<HookEvent>,
    /// Secret used to sign payloads. Empty disables signing.
    pub signing_key: String,
    /// Enabled/disabled gate.
    pub enabled: bool,
    /// Delivery settings.
    pub config: HookConfig,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Hook {
    /// Creates a validated hook.
    ///
    /// Records that only carry the deprecated single `event` are upgraded so
    /// that `events` always holds at least one kind.
    pub fn new(input: HookInput) -> AppResult<Self> {
        let HookInput {
            id,
            name,
            event,
            mut events,
            signing_key,
            enabled,
            config,
            created_at,
        } = input;

        if events.is_empty()
            && let Some(event) = event
        {
            events.push(event);
        }

        if events.is_empty() {
            return Err(AppError::Validation(
                "hook must subscribe to at least one event".to_owned(),
            ));
        }

        events.sort();
        events.dedup();

        Ok(Self {
            id: NonEmptyString::new(id)?,
            name: NonEmptyString::new(name)?,
            event,
            events,
            signing_key,
            enabled,
            config,
            created_at,
        })
    }

    /// Returns the hook identifier.
    #[must_use]
    pub fn id(&self) -> &NonEmptyString {
        &self.id
    }

    /// Returns the hook display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the deprecated single-event subscription.
    #[must_use]
    pub fn event(&self) -> Option<HookEvent> {
        self.event
    }

    /// Returns subscribed event kinds.
    #[must_use]
    pub fn events(&self) -> &[HookEvent] {
        self.events.as_slice()
    }

    /// Returns the signing secret.
    #[must_use]
    pub fn signing_key(&self) -> &str {
        self.signing_key.as_str()
    }

    /// Returns whether the hook may be dispatched.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns delivery settings.
    #[must_use]
    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// Returns creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true when the hook is enabled and subscribed to `event`.
    #[must_use]
    pub fn matches(&self, event: HookEvent) -> bool {
        self.enabled && self.events.contains(&event)
    }
}
