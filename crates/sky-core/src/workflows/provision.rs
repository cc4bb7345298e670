use tracing::{info, warn};

use crate::{
    ProvisionError, ProvisioningOutcome, RemoteResourceClient, Role, VaultSpec, VAULT_OWNER_ROLE,
};

pub const OWNER_ROLE_MISSING_WARNING: &str =
    "VAULT_OWNER role not found, skipping role assignment";
pub const ACCESS_UNVERIFIED_WARNING: &str = "service account access could not be verified";

/// Creates a vault and, when requested, a service account that owns it.
///
/// Steps run strictly in order: create vault, create service account, fetch
/// roles, assign `VAULT_OWNER`, verify access. Vault creation, service account
/// creation, role fetch and role assignment are fatal on failure. A missing
/// owner role or a failed access probe only adds a warning. Nothing created
/// before a fatal step is rolled back.
pub async fn provision_vault<C>(
    client: &C,
    spec: &VaultSpec,
) -> Result<ProvisioningOutcome, ProvisionError>
where
    C: RemoteResourceClient + ?Sized,
{
    spec.validate()?;

    info!(name = %spec.name, workspace = %spec.workspace_id, "creating vault");
    let vault = client.create_vault(spec).await?;
    if vault.vault_id.trim().is_empty() {
        return Err(ProvisionError::VaultIdMissing);
    }
    info!(vault_id = %vault.vault_id, "vault created");

    let mut outcome = ProvisioningOutcome {
        vault,
        service_account: None,
        role_assignment_id: None,
        access_verified: false,
        warnings: Vec::new(),
    };
    if !spec.create_service_account {
        return Ok(outcome);
    }

    let account_name = spec.service_account_name();
    info!(name = %account_name, "creating service account");
    let account = client.create_service_account(&account_name).await?;

    info!(vault_id = %outcome.vault.vault_id, "fetching vault roles");
    let roles = client.get_vault_roles(&outcome.vault.vault_id).await?;

    match find_owner_role(&roles) {
        None => {
            warn!(vault_id = %outcome.vault.vault_id, "owner role missing");
            outcome.warnings.push(OWNER_ROLE_MISSING_WARNING.to_string());
        }
        Some(role) => {
            info!(role_id = %role.id, client_id = %account.client_id, "assigning owner role");
            let assignment = client.assign_role(&role.id, &account.client_id).await?;
            outcome.role_assignment_id = Some(assignment);

            info!(vault_id = %outcome.vault.vault_id, "verifying service account access");
            outcome.access_verified = client
                .verify_access(&outcome.vault.vault_id, &account.api_key)
                .await;
            if !outcome.access_verified {
                warn!(vault_id = %outcome.vault.vault_id, "access probe failed");
                outcome.warnings.push(ACCESS_UNVERIFIED_WARNING.to_string());
            }
        }
    }

    outcome.service_account = Some(account);
    Ok(outcome)
}

/// First role named [`VAULT_OWNER_ROLE`], in the order the service returned them.
#[must_use]
pub fn find_owner_role(roles: &[Role]) -> Option<&Role> {
    roles
        .iter()
        .find(|role| role.definition.name == VAULT_OWNER_ROLE)
}
