use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use hookwire_core::AppError;
use tracing_subscriber::EnvFilter;

const MIN_ADMIN_TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub admin_token: String,
    pub hook_retry_backoff_ms: u64,
    pub hook_request_timeout: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let admin_token = required_non_empty_env("ADMIN_API_TOKEN")?;
        if admin_token.len() < MIN_ADMIN_TOKEN_LENGTH {
            return Err(AppError::Validation(format!(
                "ADMIN_API_TOKEN must be at least {MIN_ADMIN_TOKEN_LENGTH} characters"
            )));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let hook_retry_backoff_ms = optional_u64_env("HOOK_RETRY_BACKOFF_MS", 500)?;
        let hook_request_timeout_ms = optional_u64_env("HOOK_REQUEST_TIMEOUT_MS", 10_000)?;
        if hook_request_timeout_ms == 0 {
            return Err(AppError::Validation(
                "HOOK_REQUEST_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            database_url,
            api_host,
            api_port,
            admin_token,
            hook_retry_backoff_ms,
            hook_request_timeout: Duration::from_millis(hook_request_timeout_ms),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_u64_env(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
