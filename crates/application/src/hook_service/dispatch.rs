use super::*;

/// Delivery outcome of one hook pipeline.
struct DeliveryOutcome {
    result: LogResult,
    response: Option<HookResponse>,
    error: Option<String>,
}

impl DeliveryOutcome {
    fn from_delivery(delivery: AppResult<HookResponse>) -> Self {
        match delivery {
            Ok(response) if response.is_success() => Self {
                result: LogResult::Success,
                response: Some(response),
                error: None,
            },
            Ok(response) => Self {
                result: LogResult::Error,
                error: Some(format!("HTTP {}", response.status_code)),
                response: Some(response),
            },
            Err(error) => Self {
                result: LogResult::Error,
                response: None,
                error: Some(error.to_string()),
            },
        }
    }
}

impl HookService {
    /// Runs resolve, build, send and log for one hook.
    ///
    /// Returns whether an audit record was written.
    pub(super) async fn dispatch_hook(&self, context: &DispatchContext, hook: &Hook) -> bool {
        let hook_id = hook.id().as_str();
        let (user, application) = self.resolve_context(context).await;

        let payload = HookEventPayload {
            hook_id: hook_id.to_owned(),
            event: context.event.hook_event(),
            interaction_event: Some(context.event),
            created_at: format_timestamp(Utc::now()),
            session_id: context.session_id.clone(),
            user_agent: context.user_agent.clone(),
            user_id: Some(context.account_id.clone()),
            user,
            application,
        };

        let options = match create_hook_request_options(HookRequestInput {
            signing_key: hook.signing_key(),
            payload: &payload,
            custom_headers: Some(hook.config().headers()),
            retries: hook.config().retries(),
        }) {
            Ok(options) => options,
            Err(error) => {
                error!(
                    tenant_id = %context.tenant_id,
                    hook_id = %hook_id,
                    error = %error,
                    "failed to build hook request"
                );
                return false;
            }
        };

        let delivery = self
            .delivery_client
            .post(hook.config().url(), &options)
            .await;
        let outcome = DeliveryOutcome::from_delivery(delivery);

        if let Some(error) = &outcome.error {
            warn!(
                tenant_id = %context.tenant_id,
                hook_id = %hook_id,
                url = %hook.config().url(),
                error = %error,
                "hook delivery failed"
            );
        }

        let key = trigger_hook_log_key(payload.event);
        let entry = LogEntry {
            id: Uuid::new_v4().to_string(),
            payload: log_payload(&key, hook_id, context, options.json, outcome),
            key,
            created_at: Utc::now(),
        };

        match self.log_writer.insert_log(context.tenant_id, entry).await {
            Ok(()) => true,
            Err(error) => {
                error!(
                    tenant_id = %context.tenant_id,
                    hook_id = %hook_id,
                    error = %error,
                    "failed to write hook log"
                );
                false
            }
        }
    }

    /// Looks up user and application snapshots concurrently.
    ///
    /// Misses and lookup errors both leave the field out.
    async fn resolve_context(
        &self,
        context: &DispatchContext,
    ) -> (Option<UserSnapshot>, Option<ApplicationSnapshot>) {
        let user_lookup = self
            .user_repository
            .find_user_by_id(context.tenant_id, &context.account_id);
        let application_lookup = async {
            match context.client_id.as_deref() {
                Some(client_id) => {
                    self.application_repository
                        .find_application_by_id(context.tenant_id, client_id)
                        .await
                }
                None => Ok(None),
            }
        };

        let (user, application) = futures::join!(user_lookup, application_lookup);
        (
            omit_on_error(user, context, "user"),
            omit_on_error(application, context, "application"),
        )
    }
}

fn omit_on_error<T>(
    lookup: AppResult<Option<T>>,
    context: &DispatchContext,
    field: &str,
) -> Option<T> {
    lookup.unwrap_or_else(|error: AppError| {
        warn!(
            tenant_id = %context.tenant_id,
            field,
            error = %error,
            "hook context lookup failed"
        );
        None
    })
}

fn log_payload(
    key: &str,
    hook_id: &str,
    context: &DispatchContext,
    json: Value,
    outcome: DeliveryOutcome,
) -> Value {
    let mut payload = Map::new();
    payload.insert("key".to_owned(), Value::from(key));
    payload.insert("result".to_owned(), Value::from(outcome.result.as_str()));
    payload.insert("hookId".to_owned(), Value::from(hook_id));
    payload.insert("userId".to_owned(), Value::from(context.account_id.as_str()));
    if let Some(client_id) = &context.client_id {
        payload.insert("applicationId".to_owned(), Value::from(client_id.as_str()));
    }
    payload.insert("json".to_owned(), json);
    if let Some(response) = outcome.response {
        payload.insert(
            "response".to_owned(),
            serde_json::json!({
                "statusCode": response.status_code,
                "body": response.body,
            }),
        );
    }
    if let Some(error) = outcome.error {
        payload.insert("error".to_owned(), Value::from(error));
    }

    Value::Object(payload)
}
