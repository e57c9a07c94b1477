mod common;
mod interaction;
mod logs;

pub use common::{GenericMessageResponse, HealthResponse};
pub use interaction::TriggerInteractionHooksRequest;
pub use logs::{LogEntryResponse, LogListQuery};
