use std::sync::Arc;

use hookwire_core::{AppError, AppResult, TenantId};

use crate::hook_ports::{LogCondition, LogEntry, LogPage, LogPagination, LogQueryRepository};

/// Read-side service over persisted audit log records.
#[derive(Clone)]
pub struct LogService {
    repository: Arc<dyn LogQueryRepository>,
}

impl LogService {
    /// Creates a log query service.
    #[must_use]
    pub fn new(repository: Arc<dyn LogQueryRepository>) -> Self {
        Self { repository }
    }

    /// Lists one page of records matching `condition`, newest first.
    pub async fn list_logs(
        &self,
        tenant_id: TenantId,
        pagination: LogPagination,
        condition: LogCondition,
    ) -> AppResult<LogPage> {
        let (total_count, entries) = futures::try_join!(
            self.repository.count_logs(tenant_id, &condition),
            self.repository.find_logs(
                tenant_id,
                pagination.limit(),
                pagination.offset(),
                &condition,
            ),
        )?;

        Ok(LogPage {
            total_count,
            entries,
        })
    }

    /// Returns one record by id.
    pub async fn find_log(&self, tenant_id: TenantId, log_id: &str) -> AppResult<LogEntry> {
        self.repository
            .find_log_by_id(tenant_id, log_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "log '{log_id}' does not exist for tenant '{tenant_id}'"
                ))
            })
    }
}
