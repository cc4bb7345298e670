use async_trait::async_trait;

use crate::{
    ConnectionDescriptor, ConnectionResult, ProvisionError, Role, ServiceAccountRecord,
    VaultRecord, VaultSpec,
};

/// Remote operations the provisioning and batch workflows are built on.
///
/// Implementations own transport and authentication; the workflows only see
/// typed results and [`ProvisionError`]s.
#[async_trait]
pub trait RemoteResourceClient: Send + Sync {
    async fn create_vault(&self, spec: &VaultSpec) -> Result<VaultRecord, ProvisionError>;

    async fn create_service_account(
        &self,
        name: &str,
    ) -> Result<ServiceAccountRecord, ProvisionError>;

    async fn get_vault_roles(&self, vault_id: &str) -> Result<Vec<Role>, ProvisionError>;

    /// Returns the assignment ID.
    async fn assign_role(
        &self,
        role_id: &str,
        service_account_id: &str,
    ) -> Result<String, ProvisionError>;

    /// Soft probe: any failure reads as `false`.
    async fn verify_access(&self, vault_id: &str, api_key: &str) -> bool;

    async fn create_connection(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<ConnectionResult, ProvisionError>;
}
