use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hookwire_core::{AppError, AppResult, TenantId};
use hookwire_domain::LogResult;
use serde_json::Value;

/// Page size used when the caller does not pick one.
pub const DEFAULT_LOG_PAGE_SIZE: u32 = 20;

/// Largest accepted page size.
pub const MAX_LOG_PAGE_SIZE: u32 = 100;

/// Persisted audit log record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Generated record identifier.
    pub id: String,
    /// Structured key, e.g. `TriggerHook.PostSignIn`.
    pub key: String,
    /// JSON payload describing the logged operation.
    pub payload: Value,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

/// Filters accepted by log queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogCondition {
    /// Matches `payload.userId`.
    pub user_id: Option<String>,
    /// Matches `payload.applicationId`.
    pub application_id: Option<String>,
    /// Matches the record key exactly.
    pub log_key: Option<String>,
    /// Matches `payload.hookId`.
    pub hook_id: Option<String>,
    /// Lower time bound in epoch milliseconds, exclusive.
    pub start_time_exclusive: Option<i64>,
    /// Upper time bound in epoch milliseconds, inclusive.
    pub end_time_inclusive: Option<i64>,
    /// Matches `payload.result`.
    pub result: Option<LogResult>,
}

impl LogCondition {
    /// Returns true when `entry` satisfies every set filter.
    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        let payload_field = |name: &str| entry.payload.get(name).and_then(Value::as_str);
        let created_at = entry.created_at.timestamp_millis();

        self.log_key
            .as_deref()
            .is_none_or(|key| entry.key == key)
            && self
                .user_id
                .as_deref()
                .is_none_or(|user_id| payload_field("userId") == Some(user_id))
            && self
                .application_id
                .as_deref()
                .is_none_or(|application_id| payload_field("applicationId") == Some(application_id))
            && self
                .hook_id
                .as_deref()
                .is_none_or(|hook_id| payload_field("hookId") == Some(hook_id))
            && self
                .result
                .is_none_or(|result| payload_field("result") == Some(result.as_str()))
            && self
                .start_time_exclusive
                .is_none_or(|start| created_at > start)
            && self.end_time_inclusive.is_none_or(|end| created_at <= end)
    }
}

/// Page-number pagination for log listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPagination {
    page: u32,
    page_size: u32,
}

impl LogPagination {
    /// Creates validated pagination from optional 1-based `page` and `page_size`.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_LOG_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::Validation(
                "page must be greater than zero".to_owned(),
            ));
        }

        if page_size == 0 || page_size > MAX_LOG_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "page_size must be between 1 and {MAX_LOG_PAGE_SIZE}"
            )));
        }

        Ok(Self { page, page_size })
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the maximum rows per page.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// Returns rows skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for LogPagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_LOG_PAGE_SIZE,
        }
    }
}

/// One page of log records plus the unpaged total.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPage {
    /// Records matching the condition across all pages.
    pub total_count: u64,
    /// Records on the requested page, newest first.
    pub entries: Vec<LogEntry>,
}

/// Append-only port for audit log records.
#[async_trait]
pub trait LogWriter: Send + Sync {
    /// Persists one record.
    async fn insert_log(&self, tenant_id: TenantId, entry: LogEntry) -> AppResult<()>;
}

/// Query port for audit log records.
#[async_trait]
pub trait LogQueryRepository: Send + Sync {
    /// Counts records matching `condition`.
    async fn count_logs(&self, tenant_id: TenantId, condition: &LogCondition) -> AppResult<u64>;

    /// Lists records matching `condition`, newest first.
    async fn find_logs(
        &self,
        tenant_id: TenantId,
        limit: u32,
        offset: u64,
        condition: &LogCondition,
    ) -> AppResult<Vec<LogEntry>>;

    /// Finds one record by id.
    async fn find_log_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Option<LogEntry>>;
}
