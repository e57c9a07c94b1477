//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod hook;
mod interaction;
mod log;
mod payload;
mod snapshot;

pub use hook::{DEFAULT_HOOK_RETRIES, Hook, HookConfig, HookEvent, HookInput, MAX_HOOK_RETRIES};
pub use interaction::{
    Interaction, InteractionEvent, InteractionLogin, InteractionParams, InteractionResult,
};
pub use log::{LogResult, TRIGGER_HOOK_LOG_KEY_PREFIX, trigger_hook_log_key};
pub use payload::{HookEventPayload, format_timestamp};
pub use snapshot::{ApplicationSnapshot, ApplicationType, UserSnapshot};
