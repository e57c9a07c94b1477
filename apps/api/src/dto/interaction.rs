use hookwire_domain::Interaction;
use serde::Deserialize;
use ts_rs::TS;

/// Interaction-event notification sent by the authentication flow.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/trigger-interaction-hooks-request.ts"
)]
pub struct TriggerInteractionHooksRequest {
    /// `SignIn`, `Register` or `ForgotPassword`.
    pub event: String,
    #[ts(
        type = "{ jti?: string | null, result?: { login?: { accountId: string } | null } | null, params?: { client_id?: string | null } } | null"
    )]
    #[serde(default)]
    pub interaction: Option<Interaction>,
    #[serde(default)]
    pub user_agent: Option<String>,
}
