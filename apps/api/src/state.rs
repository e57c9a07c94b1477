use hookwire_application::{HookService, LogService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub hook_service: HookService,
    pub log_service: LogService,
    pub admin_token: String,
}
