use std::str::FromStr;

use hookwire_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User fields exposed to hook subscribers.
///
/// Contact fields serialize as explicit `null` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    /// User identifier.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Primary email address.
    pub primary_email: Option<String>,
    /// Primary phone number.
    pub primary_phone: Option<String>,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Free-form custom data object.
    pub custom_data: Value,
    /// Linked social identities.
    pub identities: Value,
    /// Last sign-in time in epoch milliseconds.
    pub last_sign_in_at: Option<i64>,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Application the user registered through.
    pub application_id: Option<String>,
    /// Whether the account is suspended.
    pub is_suspended: bool,
}

/// OIDC client application categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationType {
    /// Native/mobile application.
    Native,
    /// Single-page application.
    #[serde(rename = "SPA")]
    Spa,
    /// Server-rendered web application.
    Traditional,
    /// Machine-to-machine client.
    MachineToMachine,
}

impl ApplicationType {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "Native",
            Self::Spa => "SPA",
            Self::Traditional => "Traditional",
            Self::MachineToMachine => "MachineToMachine",
        }
    }
}

impl FromStr for ApplicationType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Native" => Ok(Self::Native),
            "SPA" => Ok(Self::Spa),
            "Traditional" => Ok(Self::Traditional),
            "MachineToMachine" => Ok(Self::MachineToMachine),
            _ => Err(AppError::Validation(format!(
                "unknown application type '{value}'"
            ))),
        }
    }
}

/// Application fields exposed to hook subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSnapshot {
    /// Application identifier.
    pub id: String,
    /// Application category.
    #[serde(rename = "type")]
    pub application_type: ApplicationType,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}
