pub mod health;
pub mod interaction_events;
pub mod logs;
