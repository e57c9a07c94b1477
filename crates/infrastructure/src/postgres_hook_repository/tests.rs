use hookwire_application::{ApplicationRepository, HookRepository, UserRepository};
use hookwire_core::TenantId;
use hookwire_domain::{ApplicationType, HookEvent};
use serde_json::json;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresHookRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres hook tests: {error}");
    }

    Some(pool)
}

async fn ensure_tenant(pool: &PgPool, tenant_id: TenantId) {
    let insert = sqlx::query(
        r#"
            INSERT INTO tenants (id, name)
            VALUES ($1, 'Hook Tenant')
            ON CONFLICT (id) DO NOTHING
            "#,
    )
    .bind(tenant_id.as_uuid())
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

#[tokio::test]
async fn find_all_hooks_maps_rows_and_skips_invalid_ones() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresHookRepository::new(pool.clone());
    let tenant_id = TenantId::new();
    ensure_tenant(&pool, tenant_id).await;

    let insert = sqlx::query(
        r#"
            INSERT INTO hooks (tenant_id, id, name, event, events, signing_key, enabled, config)
            VALUES
                ($1, 'legacy', 'Legacy hook', 'PostRegister', '{}', 'key', TRUE,
                    '{"url": "https://logto.gg", "headers": {"Bar": "baz"}, "retries": 2}'),
                ($1, 'multi', 'Multi hook', NULL, '{PostSignIn,PostRegister}', '', FALSE,
                    '{"url": "https://example.com/hook"}'),
                ($1, 'broken', 'Broken hook', NULL, '{PostSignIn}', '', TRUE,
                    '{"url": "ftp://example.com"}')
            "#,
    )
    .bind(tenant_id.as_uuid())
    .execute(&pool)
    .await;
    assert!(insert.is_ok());

    let hooks = repository.find_all_hooks(tenant_id).await;
    assert!(hooks.is_ok());
    let hooks = hooks.unwrap_or_default();
    assert_eq!(hooks.len(), 2);

    let legacy = hooks.iter().find(|hook| hook.id().as_str() == "legacy");
    assert!(legacy.is_some());
    let legacy = legacy.unwrap_or_else(|| unreachable!());
    assert_eq!(legacy.events(), &[HookEvent::PostRegister]);
    assert_eq!(legacy.config().retries(), Some(2));
    assert_eq!(
        legacy.config().headers().get("bar").map(String::as_str),
        Some("baz")
    );

    let multi = hooks.iter().find(|hook| hook.id().as_str() == "multi");
    assert!(multi.is_some_and(|hook| !hook.is_enabled() && hook.events().len() == 2));
}

#[tokio::test]
async fn snapshot_lookups_return_subset_fields() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresHookRepository::new(pool.clone());
    let tenant_id = TenantId::new();
    ensure_tenant(&pool, tenant_id).await;

    let insert_user = sqlx::query(
        r#"
            INSERT INTO users (tenant_id, id, username, name, custom_data, created_at, application_id)
            VALUES ($1, 'user_id', 'user', 'user_name', '{"tier": "gold"}',
                to_timestamp(100), 'app_id')
            "#,
    )
    .bind(tenant_id.as_uuid())
    .execute(&pool)
    .await;
    assert!(insert_user.is_ok());

    let insert_application = sqlx::query(
        r#"
            INSERT INTO applications (tenant_id, id, name, description, type)
            VALUES ($1, 'app_id', 'app_name', 'Mock Application For Test', 'Traditional')
            "#,
    )
    .bind(tenant_id.as_uuid())
    .execute(&pool)
    .await;
    assert!(insert_application.is_ok());

    let user = repository
        .find_user_by_id(tenant_id, "user_id")
        .await
        .unwrap_or_default();
    assert!(user.is_some());
    let user = user.unwrap_or_else(|| unreachable!());
    assert_eq!(user.username.as_deref(), Some("user"));
    assert_eq!(user.primary_email, None);
    assert_eq!(user.custom_data, json!({"tier": "gold"}));
    assert_eq!(user.created_at, 100_000);
    assert!(!user.is_suspended);

    let application = repository
        .find_application_by_id(tenant_id, "app_id")
        .await
        .unwrap_or_default();
    assert_eq!(
        application.map(|application| application.application_type),
        Some(ApplicationType::Traditional)
    );

    let missing = repository.find_user_by_id(tenant_id, "nobody").await;
    assert!(matches!(missing, Ok(None)));
    let other_tenant = repository
        .find_application_by_id(TenantId::new(), "app_id")
        .await;
    assert!(matches!(other_tenant, Ok(None)));
}
