use std::str::FromStr;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use hookwire_core::{AppError, TenantId};

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the tenant every `/api` call is scoped to.
pub const TENANT_HEADER: &str = "x-tenant-id";

pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("bearer token required".to_owned()))?;

    if !constant_time_eq(token.as_bytes(), state.admin_token.as_bytes()) {
        return Err(AppError::Unauthorized("invalid bearer token".to_owned()).into());
    }

    Ok(next.run(request).await)
}

pub async fn require_tenant(mut request: Request, next: Next) -> ApiResult<Response> {
    let tenant_id = request
        .headers()
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Validation(format!("{TENANT_HEADER} header is required")))
        .and_then(TenantId::from_str)?;

    request.extensions_mut().insert(tenant_id);
    Ok(next.run(request).await)
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
            == 0
}
