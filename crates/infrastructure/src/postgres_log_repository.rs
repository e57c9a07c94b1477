use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use hookwire_application::{LogCondition, LogEntry, LogQueryRepository, LogWriter};
use hookwire_core::{AppError, AppResult, TenantId};

/// PostgreSQL-backed audit log store.
#[derive(Clone)]
pub struct PostgresLogRepository {
    pool: PgPool,
}

impl PostgresLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LogRow {
    id: String,
    key: String,
    payload: Value,
    created_at: DateTime<Utc>,
}

impl From<LogRow> for LogEntry {
    fn from(row: LogRow) -> Self {
        Self {
            id: row.id,
            key: row.key,
            payload: row.payload,
            created_at: row.created_at,
        }
    }
}

// Shared by count and list so both see the same rows.
const LOG_CONDITION_SQL: &str = r#"
    WHERE tenant_id = $1
        AND ($2::TEXT IS NULL OR payload ->> 'userId' = $2)
        AND ($3::TEXT IS NULL OR payload ->> 'applicationId' = $3)
        AND ($4::TEXT IS NULL OR key = $4)
        AND ($5::TEXT IS NULL OR payload ->> 'hookId' = $5)
        AND ($6::BIGINT IS NULL OR created_at > to_timestamp($6::DOUBLE PRECISION / 1000))
        AND ($7::BIGINT IS NULL OR created_at <= to_timestamp($7::DOUBLE PRECISION / 1000))
        AND ($8::TEXT IS NULL OR payload ->> 'result' = $8)
"#;

fn bind_condition<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    tenant_id: TenantId,
    condition: &'q LogCondition,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    query
        .bind(tenant_id.as_uuid())
        .bind(condition.user_id.as_deref())
        .bind(condition.application_id.as_deref())
        .bind(condition.log_key.as_deref())
        .bind(condition.hook_id.as_deref())
        .bind(condition.start_time_exclusive)
        .bind(condition.end_time_inclusive)
        .bind(condition.result.map(|result| result.as_str()))
}

#[async_trait]
impl LogWriter for PostgresLogRepository {
    async fn insert_log(&self, tenant_id: TenantId, entry: LogEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO logs (tenant_id, id, key, payload, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(entry.id.as_str())
        .bind(entry.key.as_str())
        .bind(&entry.payload)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to insert log '{}': {error}", entry.key))
        })?;

        Ok(())
    }
}

#[async_trait]
impl LogQueryRepository for PostgresLogRepository {
    async fn count_logs(&self, tenant_id: TenantId, condition: &LogCondition) -> AppResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM logs {LOG_CONDITION_SQL}");
        let (count,) = bind_condition(sqlx::query_as::<_, (i64,)>(sql.as_str()), tenant_id, condition)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count logs: {error}")))?;

        u64::try_from(count)
            .map_err(|error| AppError::Internal(format!("invalid log count {count}: {error}")))
    }

    async fn find_logs(
        &self,
        tenant_id: TenantId,
        limit: u32,
        offset: u64,
        condition: &LogCondition,
    ) -> AppResult<Vec<LogEntry>> {
        let offset = i64::try_from(offset)
            .map_err(|error| AppError::Validation(format!("log offset is too large: {error}")))?;
        let sql = format!(
            "SELECT id, key, payload, created_at FROM logs {LOG_CONDITION_SQL} \
             ORDER BY created_at DESC, id DESC LIMIT $9 OFFSET $10"
        );

        let rows = bind_condition(sqlx::query_as::<_, LogRow>(sql.as_str()), tenant_id, condition)
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list logs: {error}")))?;

        Ok(rows.into_iter().map(LogEntry::from).collect())
    }

    async fn find_log_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Option<LogEntry>> {
        let row = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT id, key, payload, created_at
            FROM logs
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find log '{id}': {error}")))?;

        Ok(row.map(LogEntry::from))
    }
}
