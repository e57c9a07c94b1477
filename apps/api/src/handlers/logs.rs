use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderName;
use hookwire_application::LogPagination;
use hookwire_core::TenantId;

use crate::dto::{LogEntryResponse, LogListQuery};
use crate::error::ApiResult;
use crate::state::AppState;

/// Response header carrying the unpaged match count.
pub const TOTAL_NUMBER_HEADER: HeaderName = HeaderName::from_static("total-number");

pub async fn list_logs_handler(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Query(query): Query<LogListQuery>,
) -> ApiResult<([(HeaderName, String); 1], Json<Vec<LogEntryResponse>>)> {
    let pagination = LogPagination::new(query.page, query.page_size)?;
    let condition = query.condition()?;

    let page = state
        .log_service
        .list_logs(tenant_id, pagination, condition)
        .await?;
    let entries = page
        .entries
        .into_iter()
        .map(LogEntryResponse::from)
        .collect();

    Ok((
        [(TOTAL_NUMBER_HEADER, page.total_count.to_string())],
        Json(entries),
    ))
}

pub async fn get_log_handler(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Path(log_id): Path<String>,
) -> ApiResult<Json<LogEntryResponse>> {
    let entry = state.log_service.find_log(tenant_id, log_id.as_str()).await?;

    Ok(Json(LogEntryResponse::from(entry)))
}
