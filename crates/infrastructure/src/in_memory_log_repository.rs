use std::collections::HashMap;

use async_trait::async_trait;
use hookwire_application::{LogCondition, LogEntry, LogQueryRepository, LogWriter};
use hookwire_core::{AppError, AppResult, TenantId};
use tokio::sync::RwLock;

/// In-memory audit log store.
#[derive(Debug, Default)]
pub struct InMemoryLogRepository {
    entries: RwLock<HashMap<TenantId, Vec<LogEntry>>>,
}

impl InMemoryLogRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn matching(&self, tenant_id: TenantId, condition: &LogCondition) -> Vec<LogEntry> {
        let entries = self.entries.read().await;

        let mut values: Vec<LogEntry> = entries
            .get(&tenant_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| condition.matches(entry))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        values.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| right.id.cmp(&left.id))
        });

        values
    }
}

#[async_trait]
impl LogWriter for InMemoryLogRepository {
    async fn insert_log(&self, tenant_id: TenantId, entry: LogEntry) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let tenant_entries = entries.entry(tenant_id).or_default();

        if tenant_entries.iter().any(|stored| stored.id == entry.id) {
            return Err(AppError::Conflict(format!(
                "log '{}' already exists for tenant '{tenant_id}'",
                entry.id
            )));
        }

        tenant_entries.push(entry);
        Ok(())
    }
}

#[async_trait]
impl LogQueryRepository for InMemoryLogRepository {
    async fn count_logs(&self, tenant_id: TenantId, condition: &LogCondition) -> AppResult<u64> {
        Ok(self.matching(tenant_id, condition).await.len() as u64)
    }

    async fn find_logs(
        &self,
        tenant_id: TenantId,
        limit: u32,
        offset: u64,
        condition: &LogCondition,
    ) -> AppResult<Vec<LogEntry>> {
        let offset = usize::try_from(offset)
            .map_err(|error| AppError::Validation(format!("log offset is too large: {error}")))?;

        Ok(self
            .matching(tenant_id, condition)
            .await
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect())
    }

    async fn find_log_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Option<LogEntry>> {
        let entries = self.entries.read().await;

        Ok(entries
            .get(&tenant_id)
            .and_then(|entries| entries.iter().find(|entry| entry.id == id))
            .cloned())
    }
}
