use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use hookwire_core::{AppError, AppResult, TenantId};
use hookwire_domain::{
    ApplicationSnapshot, Hook, HookEventPayload, Interaction, InteractionEvent, LogResult,
    UserSnapshot, format_timestamp, trigger_hook_log_key,
};
use serde_json::{Map, Value};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::hook_ports::{
    ApplicationRepository, HookDeliveryClient, HookRepository, HookResponse, LogEntry, LogWriter,
    UserRepository,
};

mod dispatch;
mod request_options;
mod signature;

pub use request_options::{
    HOOK_REQUEST_TIMEOUT, HOOK_SIGNATURE_HEADER, HOOK_USER_AGENT, HookRequestInput,
    create_hook_request_options,
};
pub use signature::{canonical_json, generate_signature};

#[cfg(test)]
mod tests;

/// Hook dispatcher: matches interaction events to hook subscriptions,
/// delivers signed payloads and records one audit log per delivery.
#[derive(Clone)]
pub struct HookService {
    hook_repository: Arc<dyn HookRepository>,
    user_repository: Arc<dyn UserRepository>,
    application_repository: Arc<dyn ApplicationRepository>,
    log_writer: Arc<dyn LogWriter>,
    delivery_client: Arc<dyn HookDeliveryClient>,
}

impl HookService {
    /// Creates a hook dispatcher.
    #[must_use]
    pub fn new(
        hook_repository: Arc<dyn HookRepository>,
        user_repository: Arc<dyn UserRepository>,
        application_repository: Arc<dyn ApplicationRepository>,
        log_writer: Arc<dyn LogWriter>,
        delivery_client: Arc<dyn HookDeliveryClient>,
    ) -> Self {
        Self {
            hook_repository,
            user_repository,
            application_repository,
            log_writer,
            delivery_client,
        }
    }

    /// Dispatches every enabled hook subscribed to `event`.
    ///
    /// Returns the number of audit records written. Failures are logged and
    /// never returned; an interaction without an authenticated account is a
    /// no-op that does not touch the hook registry.
    pub async fn trigger_interaction_hooks_if_needed(
        &self,
        tenant_id: TenantId,
        event: InteractionEvent,
        interaction: Option<&Interaction>,
        user_agent: Option<&str>,
    ) -> usize {
        let Some(interaction) = interaction else {
            return 0;
        };
        let Some(account_id) = interaction.account_id() else {
            debug!(tenant_id = %tenant_id, event = %event, "interaction has no account, skipping hooks");
            return 0;
        };

        let hooks = match self.hook_repository.find_all_hooks(tenant_id).await {
            Ok(hooks) => hooks,
            Err(error) => {
                warn!(tenant_id = %tenant_id, error = %error, "failed to load hooks");
                return 0;
            }
        };

        let hook_event = event.hook_event();
        let matched: Vec<Hook> = hooks
            .into_iter()
            .filter(|hook| hook.matches(hook_event))
            .collect();
        if matched.is_empty() {
            return 0;
        }

        let context = Arc::new(DispatchContext {
            tenant_id,
            event,
            account_id: account_id.to_owned(),
            client_id: interaction.client_id().map(str::to_owned),
            session_id: interaction.jti.clone(),
            user_agent: user_agent.map(str::to_owned),
        });

        let mut pipelines = JoinSet::new();
        for hook in matched {
            let service = self.clone();
            let context = Arc::clone(&context);
            pipelines.spawn(async move { service.dispatch_hook(&context, &hook).await });
        }

        let mut logged = 0;
        while let Some(pipeline) = pipelines.join_next().await {
            match pipeline {
                Ok(true) => logged += 1,
                Ok(false) => {}
                Err(error) => {
                    error!(tenant_id = %tenant_id, error = %error, "hook pipeline aborted");
                }
            }
        }

        info!(
            tenant_id = %tenant_id,
            event = %hook_event,
            logged,
            "interaction hooks dispatched"
        );

        logged
    }

    /// Launches [`Self::trigger_interaction_hooks_if_needed`] as a detached task.
    ///
    /// A panic inside the task is logged and reported as zero records written.
    pub fn spawn_interaction_hooks(
        &self,
        tenant_id: TenantId,
        event: InteractionEvent,
        interaction: Option<Interaction>,
        user_agent: Option<String>,
    ) -> JoinHandle<usize> {
        let service = self.clone();
        tokio::spawn(async move {
            let trigger = service.trigger_interaction_hooks_if_needed(
                tenant_id,
                event,
                interaction.as_ref(),
                user_agent.as_deref(),
            );

            match AssertUnwindSafe(trigger).catch_unwind().await {
                Ok(logged) => logged,
                Err(_) => {
                    error!(tenant_id = %tenant_id, event = %event, "interaction hook task panicked");
                    0
                }
            }
        })
    }
}

/// Per-trigger values shared by every matched hook.
struct DispatchContext {
    tenant_id: TenantId,
    event: InteractionEvent,
    account_id: String,
    client_id: Option<String>,
    session_id: Option<String>,
    user_agent: Option<String>,
}
