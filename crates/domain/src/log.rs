use std::fmt::{Display, Formatter};
use std::str::FromStr;

use hookwire_core::AppError;
use serde::{Deserialize, Serialize};

use crate::HookEvent;

/// Prefix of audit log keys written by hook dispatch.
pub const TRIGGER_HOOK_LOG_KEY_PREFIX: &str = "TriggerHook";

/// Outcome classification stored in audit log payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogResult {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

impl LogResult {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
        }
    }
}

impl Display for LogResult {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for LogResult {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Success" => Ok(Self::Success),
            "Error" => Ok(Self::Error),
            _ => Err(AppError::Validation(format!(
                "unknown log result value '{value}'"
            ))),
        }
    }
}

/// Returns the audit log key for a hook dispatch, e.g. `TriggerHook.PostSignIn`.
#[must_use]
pub fn trigger_hook_log_key(event: HookEvent) -> String {
    format!("{TRIGGER_HOOK_LOG_KEY_PREFIX}.{}", event.as_str())
}
