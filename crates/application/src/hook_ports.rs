mod delivery;
mod log;
mod repository;

pub use delivery::{HookDeliveryClient, HookRequestOptions, HookResponse};
pub use log::{
    DEFAULT_LOG_PAGE_SIZE, LogCondition, LogEntry, LogPage, LogPagination, LogQueryRepository,
    LogWriter, MAX_LOG_PAGE_SIZE,
};
pub use repository::{ApplicationRepository, HookRepository, UserRepository};
