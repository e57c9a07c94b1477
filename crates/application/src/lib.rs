//! Application services and ports.

#![forbid(unsafe_code)]

pub mod hook_ports;
mod hook_service;
mod log_service;

pub use hook_ports::{
    ApplicationRepository, DEFAULT_LOG_PAGE_SIZE, HookDeliveryClient, HookRepository,
    HookRequestOptions, HookResponse, LogCondition, LogEntry, LogPage, LogPagination,
    LogQueryRepository, LogWriter, MAX_LOG_PAGE_SIZE, UserRepository,
};
pub use hook_service::{
    HOOK_REQUEST_TIMEOUT, HOOK_SIGNATURE_HEADER, HOOK_USER_AGENT, HookRequestInput, HookService,
    canonical_json, create_hook_request_options, generate_signature,
};
pub use log_service::LogService;
