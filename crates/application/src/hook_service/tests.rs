use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;

use hookwire_core::{AppError, AppResult, TenantId};
use hookwire_domain::{
    ApplicationSnapshot, ApplicationType, Hook, HookConfig, HookEvent, HookInput, Interaction,
    InteractionEvent, InteractionLogin, InteractionParams, InteractionResult, UserSnapshot,
};

use crate::hook_ports::{
    ApplicationRepository, HookDeliveryClient, HookRepository, HookRequestOptions, HookResponse,
    LogEntry, LogWriter, UserRepository,
};

use super::{HOOK_SIGNATURE_HEADER, HookService, generate_signature};

#[derive(Default)]
struct FakeHookRepository {
    hooks: Vec<Hook>,
    fail: bool,
    panic: bool,
    calls: Mutex<usize>,
}

#[async_trait]
impl HookRepository for FakeHookRepository {
    async fn find_all_hooks(&self, _tenant_id: TenantId) -> AppResult<Vec<Hook>> {
        *self.calls.lock().await += 1;
        if self.panic {
            panic!("hook store corrupted");
        }
        if self.fail {
            return Err(AppError::Internal("hook store offline".to_owned()));
        }
        Ok(self.hooks.clone())
    }
}

#[derive(Default)]
struct FakeUserRepository {
    user: Option<UserSnapshot>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_user_by_id(
        &self,
        _tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Option<UserSnapshot>> {
        Ok(self.user.clone().filter(|user| user.id == user_id))
    }
}

#[derive(Default)]
struct FakeApplicationRepository {
    application: Option<ApplicationSnapshot>,
    fail: bool,
}

#[async_trait]
impl ApplicationRepository for FakeApplicationRepository {
    async fn find_application_by_id(
        &self,
        _tenant_id: TenantId,
        application_id: &str,
    ) -> AppResult<Option<ApplicationSnapshot>> {
        if self.fail {
            return Err(AppError::Internal("application store offline".to_owned()));
        }
        Ok(self
            .application
            .clone()
            .filter(|application| application.id == application_id))
    }
}

#[derive(Default)]
struct FakeLogWriter {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LogWriter for FakeLogWriter {
    async fn insert_log(&self, _tenant_id: TenantId, entry: LogEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

#[derive(Clone)]
enum FakeReply {
    Status(u16, &'static str),
    Unreachable,
    Panic,
}

#[derive(Default)]
struct FakeDeliveryClient {
    replies: HashMap<String, FakeReply>,
    requests: Mutex<Vec<(String, HookRequestOptions)>>,
}

#[async_trait]
impl HookDeliveryClient for FakeDeliveryClient {
    async fn post(&self, url: &str, options: &HookRequestOptions) -> AppResult<HookResponse> {
        self.requests
            .lock()
            .await
            .push((url.to_owned(), options.clone()));

        match self.replies.get(url).cloned() {
            Some(FakeReply::Status(status, body)) => Ok(HookResponse::from_text(status, body)),
            Some(FakeReply::Unreachable) => Err(AppError::Internal(
                "failed to send hook request: connection refused".to_owned(),
            )),
            Some(FakeReply::Panic) => panic!("delivery adapter crashed"),
            None => Ok(HookResponse::from_text(200, r#"{"message":"ok"}"#)),
        }
    }
}

struct Harness {
    hooks: Arc<FakeHookRepository>,
    logs: Arc<FakeLogWriter>,
    delivery: Arc<FakeDeliveryClient>,
    service: HookService,
}

fn harness(
    hooks: FakeHookRepository,
    users: FakeUserRepository,
    applications: FakeApplicationRepository,
    delivery: FakeDeliveryClient,
) -> Harness {
    let hooks = Arc::new(hooks);
    let logs = Arc::new(FakeLogWriter::default());
    let delivery = Arc::new(delivery);
    let service = HookService::new(
        hooks.clone(),
        Arc::new(users),
        Arc::new(applications),
        logs.clone(),
        delivery.clone(),
    );

    Harness {
        hooks,
        logs,
        delivery,
        service,
    }
}

fn hook(id: &str, url: &str, events: Vec<HookEvent>, enabled: bool) -> Hook {
    Hook::new(HookInput {
        id: id.to_owned(),
        name: format!("{id} hook"),
        event: None,
        events,
        signing_key: "signing_key".to_owned(),
        enabled,
        config: HookConfig::new(
            url,
            BTreeMap::from([("bar".to_owned(), "baz".to_owned())]),
            Some(3),
        )
        .unwrap_or_else(|_| unreachable!()),
        created_at: Utc::now(),
    })
    .unwrap_or_else(|_| unreachable!())
}

fn user() -> UserSnapshot {
    UserSnapshot {
        id: "123".to_owned(),
        name: Some("user_name".to_owned()),
        username: Some("user".to_owned()),
        primary_email: None,
        primary_phone: None,
        avatar: None,
        custom_data: json!({}),
        identities: json!({}),
        last_sign_in_at: None,
        created_at: 100_000,
        application_id: Some("app_id".to_owned()),
        is_suspended: false,
    }
}

fn application() -> ApplicationSnapshot {
    ApplicationSnapshot {
        id: "some_client".to_owned(),
        application_type: ApplicationType::Traditional,
        name: "app_name".to_owned(),
        description: Some("Mock Application For Test".to_owned()),
    }
}

fn interaction() -> Interaction {
    Interaction {
        jti: Some("some_jti".to_owned()),
        result: Some(InteractionResult {
            login: Some(InteractionLogin {
                account_id: "123".to_owned(),
            }),
        }),
        params: InteractionParams {
            client_id: Some("some_client".to_owned()),
        },
    }
}

fn full_context(hooks: Vec<Hook>, delivery: FakeDeliveryClient) -> Harness {
    harness(
        FakeHookRepository {
            hooks,
            ..FakeHookRepository::default()
        },
        FakeUserRepository { user: Some(user()) },
        FakeApplicationRepository {
            application: Some(application()),
            fail: false,
        },
        delivery,
    )
}

#[tokio::test]
async fn missing_interaction_never_queries_hooks() {
    let harness = full_context(
        vec![hook("foo", "https://logto.gg", vec![HookEvent::PostSignIn], true)],
        FakeDeliveryClient::default(),
    );

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(TenantId::new(), InteractionEvent::SignIn, None, None)
        .await;

    assert_eq!(logged, 0);
    assert_eq!(*harness.hooks.calls.lock().await, 0);
    assert!(harness.delivery.requests.lock().await.is_empty());
}

#[tokio::test]
async fn interaction_without_login_never_queries_hooks() {
    let harness = full_context(
        vec![hook("foo", "https://logto.gg", vec![HookEvent::PostSignIn], true)],
        FakeDeliveryClient::default(),
    );
    let pending = Interaction {
        jti: Some("some_jti".to_owned()),
        ..Interaction::default()
    };

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&pending),
            None,
        )
        .await;

    assert_eq!(logged, 0);
    assert_eq!(*harness.hooks.calls.lock().await, 0);
}

#[tokio::test]
async fn matched_hook_is_posted_once_and_logged_once() {
    let harness = full_context(
        vec![hook("foo", "https://logto.gg", vec![HookEvent::PostSignIn], true)],
        FakeDeliveryClient::default(),
    );
    let interaction = interaction();

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&interaction),
            Some("Mock User Agent"),
        )
        .await;
    assert_eq!(logged, 1);

    let requests = harness.delivery.requests.lock().await;
    assert_eq!(requests.len(), 1);
    let (url, options) = &requests[0];
    assert_eq!(url, "https://logto.gg");
    assert_eq!(options.retry_limit, 3);
    assert_eq!(options.headers.get("bar").map(String::as_str), Some("baz"));
    assert_eq!(options.json["hookId"], json!("foo"));
    assert_eq!(options.json["event"], json!("PostSignIn"));
    assert_eq!(options.json["interactionEvent"], json!("SignIn"));
    assert_eq!(options.json["sessionId"], json!("some_jti"));
    assert_eq!(options.json["userAgent"], json!("Mock User Agent"));
    assert_eq!(options.json["userId"], json!("123"));
    assert_eq!(options.json["user"]["username"], json!("user"));
    assert_eq!(options.json["application"]["type"], json!("Traditional"));

    let entries = harness.logs.entries.lock().await;
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.key, "TriggerHook.PostSignIn");
    assert_eq!(entry.payload["key"], json!("TriggerHook.PostSignIn"));
    assert_eq!(entry.payload["result"], json!("Success"));
    assert_eq!(entry.payload["hookId"], json!("foo"));
    assert_eq!(entry.payload["userId"], json!("123"));
    assert_eq!(entry.payload["applicationId"], json!("some_client"));
    assert_eq!(entry.payload["json"], options.json);
    assert_eq!(entry.payload["response"]["statusCode"], json!(200));
    assert_eq!(entry.payload["response"]["body"]["message"], json!("ok"));
    assert!(entry.payload.get("error").is_none());
}

#[tokio::test]
async fn delivered_signature_verifies_against_body() {
    let harness = full_context(
        vec![hook("foo", "https://logto.gg", vec![HookEvent::PostSignIn], true)],
        FakeDeliveryClient::default(),
    );
    let interaction = interaction();

    harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&interaction),
            None,
        )
        .await;

    let requests = harness.delivery.requests.lock().await;
    let (_, options) = &requests[0];
    let expected = generate_signature("signing_key", &options.json).unwrap_or_default();
    assert_eq!(
        options.headers.get(HOOK_SIGNATURE_HEADER),
        Some(&expected)
    );
}

#[tokio::test]
async fn error_response_is_logged_as_error() {
    let harness = full_context(
        vec![hook("foo", "https://logto.gg", vec![HookEvent::PostSignIn], true)],
        FakeDeliveryClient {
            replies: HashMap::from([(
                "https://logto.gg".to_owned(),
                FakeReply::Status(500, "Internal Server Error"),
            )]),
            ..FakeDeliveryClient::default()
        },
    );
    let interaction = interaction();

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&interaction),
            None,
        )
        .await;
    assert_eq!(logged, 1);

    let entries = harness.logs.entries.lock().await;
    assert_eq!(entries[0].payload["result"], json!("Error"));
    assert_eq!(entries[0].payload["response"]["statusCode"], json!(500));
    assert_eq!(
        entries[0].payload["response"]["body"],
        json!("Internal Server Error")
    );
    assert_eq!(entries[0].payload["error"], json!("HTTP 500"));
}

#[tokio::test]
async fn transport_failure_is_logged_without_response() {
    let harness = full_context(
        vec![hook("foo", "https://logto.gg", vec![HookEvent::PostSignIn], true)],
        FakeDeliveryClient {
            replies: HashMap::from([("https://logto.gg".to_owned(), FakeReply::Unreachable)]),
            ..FakeDeliveryClient::default()
        },
    );
    let interaction = interaction();

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&interaction),
            None,
        )
        .await;
    assert_eq!(logged, 1);

    let entries = harness.logs.entries.lock().await;
    assert_eq!(entries[0].payload["result"], json!("Error"));
    assert!(entries[0].payload.get("response").is_none());
    assert!(
        entries[0].payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("connection refused")
    );
}

#[tokio::test]
async fn sibling_hooks_are_independent() {
    let harness = full_context(
        vec![
            hook("ok", "https://ok.example.com", vec![HookEvent::PostSignIn], true),
            hook(
                "down",
                "https://down.example.com",
                vec![HookEvent::PostSignIn, HookEvent::PostRegister],
                true,
            ),
        ],
        FakeDeliveryClient {
            replies: HashMap::from([(
                "https://down.example.com".to_owned(),
                FakeReply::Unreachable,
            )]),
            ..FakeDeliveryClient::default()
        },
    );
    let interaction = interaction();

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&interaction),
            None,
        )
        .await;
    assert_eq!(logged, 2);
    assert_eq!(harness.delivery.requests.lock().await.len(), 2);

    let entries = harness.logs.entries.lock().await;
    let result_for = |hook_id: &str| {
        entries
            .iter()
            .find(|entry| entry.payload["hookId"] == json!(hook_id))
            .map(|entry| entry.payload["result"].clone())
    };
    assert_eq!(result_for("ok"), Some(json!("Success")));
    assert_eq!(result_for("down"), Some(json!("Error")));
}

#[tokio::test]
async fn disabled_or_unsubscribed_hooks_are_skipped() {
    let harness = full_context(
        vec![
            hook("disabled", "https://a.example.com", vec![HookEvent::PostSignIn], false),
            hook(
                "register-only",
                "https://b.example.com",
                vec![HookEvent::PostRegister],
                true,
            ),
        ],
        FakeDeliveryClient::default(),
    );
    let interaction = interaction();

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&interaction),
            None,
        )
        .await;

    assert_eq!(logged, 0);
    assert_eq!(*harness.hooks.calls.lock().await, 1);
    assert!(harness.delivery.requests.lock().await.is_empty());
    assert!(harness.logs.entries.lock().await.is_empty());
}

#[tokio::test]
async fn unresolved_context_is_omitted_from_payload() {
    let harness = harness(
        FakeHookRepository {
            hooks: vec![hook(
                "foo",
                "https://logto.gg",
                vec![HookEvent::PostRegister],
                true,
            )],
            ..FakeHookRepository::default()
        },
        FakeUserRepository::default(),
        FakeApplicationRepository {
            application: None,
            fail: true,
        },
        FakeDeliveryClient::default(),
    );
    let interaction = interaction();

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::Register,
            Some(&interaction),
            None,
        )
        .await;
    assert_eq!(logged, 1);

    let requests = harness.delivery.requests.lock().await;
    let (_, options) = &requests[0];
    assert_eq!(options.json["event"], json!("PostRegister"));
    assert!(options.json.get("user").is_none());
    assert!(options.json.get("application").is_none());
    assert!(options.json.get("userAgent").is_none());
    assert_eq!(options.json["userId"], json!("123"));
}

#[tokio::test]
async fn registry_failure_is_swallowed() {
    let harness = harness(
        FakeHookRepository {
            fail: true,
            ..FakeHookRepository::default()
        },
        FakeUserRepository::default(),
        FakeApplicationRepository::default(),
        FakeDeliveryClient::default(),
    );
    let interaction = interaction();

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&interaction),
            None,
        )
        .await;

    assert_eq!(logged, 0);
    assert!(harness.logs.entries.lock().await.is_empty());
}

#[tokio::test]
async fn spawned_dispatch_runs_to_completion() {
    let harness = full_context(
        vec![hook(
            "foo",
            "https://logto.gg",
            vec![HookEvent::PostResetPassword],
            true,
        )],
        FakeDeliveryClient::default(),
    );

    let handle = harness.service.spawn_interaction_hooks(
        TenantId::new(),
        InteractionEvent::ForgotPassword,
        Some(interaction()),
        Some("Mock User Agent".to_owned()),
    );
    let logged = handle.await.unwrap_or_default();

    assert_eq!(logged, 1);
    let entries = harness.logs.entries.lock().await;
    assert_eq!(entries[0].key, "TriggerHook.PostResetPassword");
}

#[tokio::test]
async fn panicking_pipeline_does_not_drop_sibling_records() {
    let harness = full_context(
        vec![
            hook("ok", "https://ok.example.com", vec![HookEvent::PostSignIn], true),
            hook("crash", "https://crash.example.com", vec![HookEvent::PostSignIn], true),
        ],
        FakeDeliveryClient {
            replies: HashMap::from([("https://crash.example.com".to_owned(), FakeReply::Panic)]),
            ..FakeDeliveryClient::default()
        },
    );
    let interaction = interaction();

    let logged = harness
        .service
        .trigger_interaction_hooks_if_needed(
            TenantId::new(),
            InteractionEvent::SignIn,
            Some(&interaction),
            None,
        )
        .await;

    assert_eq!(logged, 1);
    let entries = harness.logs.entries.lock().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].payload["hookId"], json!("ok"));
    assert_eq!(entries[0].payload["result"], json!("Success"));
}

#[tokio::test]
async fn spawned_dispatch_reports_zero_when_task_panics() {
    let harness = harness(
        FakeHookRepository {
            panic: true,
            ..FakeHookRepository::default()
        },
        FakeUserRepository::default(),
        FakeApplicationRepository::default(),
        FakeDeliveryClient::default(),
    );

    let handle = harness.service.spawn_interaction_hooks(
        TenantId::new(),
        InteractionEvent::SignIn,
        Some(interaction()),
        None,
    );
    let joined = handle.await;

    assert!(joined.is_ok());
    assert_eq!(joined.unwrap_or(usize::MAX), 0);
    assert_eq!(*harness.hooks.calls.lock().await, 1);
    assert!(harness.logs.entries.lock().await.is_empty());
}
