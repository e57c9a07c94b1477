//! PostgreSQL-backed hook registry and payload context lookups.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::warn;

use hookwire_application::{ApplicationRepository, HookRepository, UserRepository};
use hookwire_core::{AppError, AppResult, TenantId};
use hookwire_domain::{
    ApplicationSnapshot, ApplicationType, Hook, HookConfig, HookEvent, HookInput, UserSnapshot,
};

/// PostgreSQL implementation of the hook, user and application read ports.
#[derive(Clone)]
pub struct PostgresHookRepository {
    pool: PgPool,
}

impl PostgresHookRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct HookRow {
    id: String,
    name: String,
    event: Option<String>,
    events: Vec<String>,
    signing_key: String,
    enabled: bool,
    config: Value,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct StoredHookConfig {
    url: String,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    retries: Option<u8>,
}

impl TryFrom<HookRow> for Hook {
    type Error = AppError;

    fn try_from(row: HookRow) -> Result<Self, Self::Error> {
        let config: StoredHookConfig = serde_json::from_value(row.config).map_err(|error| {
            AppError::Internal(format!("hook '{}' has malformed config: {error}", row.id))
        })?;
        let events = row
            .events
            .iter()
            .map(|event| HookEvent::from_str(event))
            .collect::<AppResult<Vec<_>>>()?;

        Hook::new(HookInput {
            id: row.id,
            name: row.name,
            event: row.event.as_deref().map(HookEvent::from_str).transpose()?,
            events,
            signing_key: row.signing_key,
            enabled: row.enabled,
            config: HookConfig::new(config.url, config.headers, config.retries)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    username: Option<String>,
    primary_email: Option<String>,
    primary_phone: Option<String>,
    avatar: Option<String>,
    custom_data: Value,
    identities: Value,
    last_sign_in_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    application_id: Option<String>,
    is_suspended: bool,
}

impl From<UserRow> for UserSnapshot {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            username: row.username,
            primary_email: row.primary_email,
            primary_phone: row.primary_phone,
            avatar: row.avatar,
            custom_data: row.custom_data,
            identities: row.identities,
            last_sign_in_at: row.last_sign_in_at.map(|value| value.timestamp_millis()),
            created_at: row.created_at.timestamp_millis(),
            application_id: row.application_id,
            is_suspended: row.is_suspended,
        }
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: String,
    application_type: String,
    name: String,
    description: Option<String>,
}

#[async_trait]
impl HookRepository for PostgresHookRepository {
    async fn find_all_hooks(&self, tenant_id: TenantId) -> AppResult<Vec<Hook>> {
        let rows = sqlx::query_as::<_, HookRow>(
            r#"
            SELECT id, name, event, events, signing_key, enabled, config, created_at
            FROM hooks
            WHERE tenant_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list hooks: {error}")))?;

        let mut hooks = Vec::with_capacity(rows.len());
        for row in rows {
            let hook_id = row.id.clone();
            match Hook::try_from(row) {
                Ok(hook) => hooks.push(hook),
                Err(error) => {
                    warn!(tenant_id = %tenant_id, hook_id = %hook_id, error = %error, "skipping invalid hook");
                }
            }
        }

        Ok(hooks)
    }
}

#[async_trait]
impl UserRepository for PostgresHookRepository {
    async fn find_user_by_id(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Option<UserSnapshot>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                name,
                username,
                primary_email,
                primary_phone,
                avatar,
                custom_data,
                identities,
                last_sign_in_at,
                created_at,
                application_id,
                is_suspended
            FROM users
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user '{user_id}': {error}")))?;

        Ok(row.map(UserSnapshot::from))
    }
}

#[async_trait]
impl ApplicationRepository for PostgresHookRepository {
    async fn find_application_by_id(
        &self,
        tenant_id: TenantId,
        application_id: &str,
    ) -> AppResult<Option<ApplicationSnapshot>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, type AS application_type, name, description
            FROM applications
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find application '{application_id}': {error}"
            ))
        })?;

        row.map(|row| {
            Ok(ApplicationSnapshot {
                id: row.id,
                application_type: ApplicationType::from_str(row.application_type.as_str())?,
                name: row.name,
                description: row.description,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests;
