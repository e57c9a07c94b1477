use std::str::FromStr;

use hookwire_application::{LogCondition, LogEntry};
use hookwire_core::AppResult;
use hookwire_domain::LogResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Query string accepted by the log listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogListQuery {
    pub page: Option<u32>,
    #[serde(rename = "page_size")]
    pub page_size: Option<u32>,
    pub user_id: Option<String>,
    pub application_id: Option<String>,
    pub log_key: Option<String>,
    pub hook_id: Option<String>,
    pub start_time_exclusive: Option<i64>,
    pub end_time_inclusive: Option<i64>,
    pub result: Option<String>,
}

impl LogListQuery {
    /// Converts filter fields into a repository condition.
    pub fn condition(&self) -> AppResult<LogCondition> {
        Ok(LogCondition {
            user_id: self.user_id.clone(),
            application_id: self.application_id.clone(),
            log_key: self.log_key.clone(),
            hook_id: self.hook_id.clone(),
            start_time_exclusive: self.start_time_exclusive,
            end_time_inclusive: self.end_time_inclusive,
            result: self
                .result
                .as_deref()
                .map(LogResult::from_str)
                .transpose()?,
        })
    }
}

/// API representation of an audit log record.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/log-entry-response.ts"
)]
pub struct LogEntryResponse {
    pub id: String,
    pub key: String,
    #[ts(type = "Record<string, unknown>")]
    pub payload: Value,
    /// Epoch milliseconds.
    #[ts(type = "number")]
    pub created_at: i64,
}

impl From<LogEntry> for LogEntryResponse {
    fn from(value: LogEntry) -> Self {
        Self {
            id: value.id,
            key: value.key,
            payload: value.payload,
            created_at: value.created_at.timestamp_millis(),
        }
    }
}
