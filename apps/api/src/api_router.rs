use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/logs", get(handlers::logs::list_logs_handler))
        .route("/api/logs/{log_id}", get(handlers::logs::get_log_handler))
        .route(
            "/api/internal/interaction-events",
            post(handlers::interaction_events::trigger_interaction_hooks_handler),
        )
        .route_layer(from_fn(middleware::require_tenant))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_admin_token,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
