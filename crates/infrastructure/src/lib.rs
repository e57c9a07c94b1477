//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_log_repository;
mod postgres_hook_repository;
mod postgres_log_repository;
mod reqwest_hook_delivery_client;

pub use in_memory_log_repository::InMemoryLogRepository;
pub use postgres_hook_repository::PostgresHookRepository;
pub use postgres_log_repository::PostgresLogRepository;
pub use reqwest_hook_delivery_client::ReqwestHookDeliveryClient;
