use std::fmt::{Display, Formatter};
use std::str::FromStr;

use hookwire_core::AppError;
use serde::{Deserialize, Serialize};

use crate::HookEvent;

/// Authentication-flow occurrences that can trigger hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionEvent {
    /// User signed in.
    SignIn,
    /// User registered a new account.
    Register,
    /// User reset a forgotten password.
    ForgotPassword,
}

impl InteractionEvent {
    /// Returns the display label carried in hook payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignIn => "SignIn",
            Self::Register => "Register",
            Self::ForgotPassword => "ForgotPassword",
        }
    }

    /// Returns the hook event fired for this interaction.
    #[must_use]
    pub fn hook_event(&self) -> HookEvent {
        match self {
            Self::SignIn => HookEvent::PostSignIn,
            Self::Register => HookEvent::PostRegister,
            Self::ForgotPassword => HookEvent::PostResetPassword,
        }
    }
}

impl Display for InteractionEvent {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for InteractionEvent {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "SignIn" => Ok(Self::SignIn),
            "Register" => Ok(Self::Register),
            "ForgotPassword" => Ok(Self::ForgotPassword),
            _ => Err(AppError::Validation(format!(
                "unknown interaction event value '{value}'"
            ))),
        }
    }
}

/// Interaction session snapshot handed over by the OIDC interaction layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction session identifier.
    pub jti: Option<String>,
    /// Outcome of the interaction, present once it finished.
    #[serde(default)]
    pub result: Option<InteractionResult>,
    /// Authorization request parameters.
    #[serde(default)]
    pub params: InteractionParams,
}

/// Interaction outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionResult {
    /// Successful login marker.
    #[serde(default)]
    pub login: Option<InteractionLogin>,
}

/// Successful login outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionLogin {
    /// Authenticated account identifier.
    #[serde(rename = "accountId")]
    pub account_id: String,
}

/// Authorization request parameters relevant to hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionParams {
    /// OIDC client that started the interaction.
    #[serde(default)]
    pub client_id: Option<String>,
}

impl Interaction {
    /// Returns the authenticated account id, if the login succeeded.
    #[must_use]
    pub fn account_id(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|result| result.login.as_ref())
            .map(|login| login.account_id.as_str())
            .filter(|account_id| !account_id.is_empty())
    }

    /// Returns the requesting client id, if any.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.params
            .client_id
            .as_deref()
            .filter(|client_id| !client_id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Interaction, InteractionEvent};
    use crate::HookEvent;

    #[test]
    fn interaction_reads_account_and_client_from_oidc_shape() {
        let interaction: Interaction = serde_json::from_value(json!({
            "jti": "some_jti",
            "result": { "login": { "accountId": "123" } },
            "params": { "client_id": "some_client" }
        }))
        .unwrap_or_default();

        assert_eq!(interaction.jti.as_deref(), Some("some_jti"));
        assert_eq!(interaction.account_id(), Some("123"));
        assert_eq!(interaction.client_id(), Some("some_client"));
    }

    #[test]
    fn unfinished_interaction_has_no_account() {
        let interaction: Interaction =
            serde_json::from_value(json!({ "jti": "pending" })).unwrap_or_default();

        assert_eq!(interaction.account_id(), None);
        assert_eq!(interaction.client_id(), None);
    }

    #[test]
    fn interaction_events_map_to_post_hooks() {
        assert_eq!(InteractionEvent::SignIn.hook_event(), HookEvent::PostSignIn);
        assert_eq!(
            InteractionEvent::Register.hook_event(),
            HookEvent::PostRegister
        );
        assert_eq!(
            InteractionEvent::ForgotPassword.hook_event(),
            HookEvent::PostResetPassword
        );
    }
}
