use async_trait::async_trait;
use hookwire_core::{AppResult, TenantId};
use hookwire_domain::{ApplicationSnapshot, Hook, UserSnapshot};

/// Read port for tenant hook subscriptions.
#[async_trait]
pub trait HookRepository: Send + Sync {
    /// Lists every hook configured for the tenant.
    async fn find_all_hooks(&self, tenant_id: TenantId) -> AppResult<Vec<Hook>>;
}

/// Read port for user snapshots used to enrich hook payloads.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds one user by id.
    async fn find_user_by_id(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Option<UserSnapshot>>;
}

/// Read port for application snapshots used to enrich hook payloads.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Finds one application by id.
    async fn find_application_by_id(
        &self,
        tenant_id: TenantId,
        application_id: &str,
    ) -> AppResult<Option<ApplicationSnapshot>>;
}
