use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use hookwire_core::TenantId;
use hookwire_domain::InteractionEvent;
use tracing::debug;

use crate::dto::{GenericMessageResponse, TriggerInteractionHooksRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn trigger_interaction_hooks_handler(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(payload): Json<TriggerInteractionHooksRequest>,
) -> ApiResult<(StatusCode, Json<GenericMessageResponse>)> {
    let event = InteractionEvent::from_str(payload.event.as_str())?;

    state.hook_service.spawn_interaction_hooks(
        tenant_id,
        event,
        payload.interaction,
        payload.user_agent,
    );
    debug!(tenant_id = %tenant_id, event = %event, "interaction hooks scheduled");

    Ok((
        StatusCode::ACCEPTED,
        Json(GenericMessageResponse {
            message: "interaction hooks scheduled".to_owned(),
        }),
    ))
}
