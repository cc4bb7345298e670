use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use sky_core::{
    cluster_id_from_url, extract_vault_id, ConnectionDescriptor, ConnectionResult,
    ProvisionError, RemoteResourceClient, Role, ServiceAccountRecord, VaultRecord, VaultSource,
    VaultSpec, SERVICE_ACCOUNT_MEMBER,
};
use tracing::{debug, info, warn};

use super::types::{
    AssignRoleRequest, CreateServiceAccountRequest, CreateVaultRequest, RoleMember,
    ServiceAccountDetails, Workspace, WorkspacesResponse,
};
use crate::modules::system::http::{append_params, auth_headers, send_request};
use crate::modules::system::ManagementAuth;

const CREATE_VAULT: &str = "Vault creation";
const CREATE_SERVICE_ACCOUNT: &str = "Service account creation";
const GET_ROLES: &str = "Get vault roles";
const ASSIGN_ROLE: &str = "Role assignment";
const VERIFY_ACCESS: &str = "Vault access check";
const GET_WORKSPACES: &str = "Get workspaces";
const CREATE_CONNECTION: &str = "Connection creation";

/// Management API client. Carries its own credentials instead of reading
/// process-wide state.
pub(crate) struct ManagementClient {
    client: reqwest::Client,
    api_url: String,
    auth: ManagementAuth,
}

impl ManagementClient {
    pub(crate) fn new(client: &reqwest::Client, api_url: &str, auth: ManagementAuth) -> Self {
        Self {
            client: client.clone(),
            api_url: api_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_url, path)
    }

    async fn send(
        &self,
        operation: &'static str,
        method: Method,
        url: &str,
        token: &str,
        payload: Option<Value>,
    ) -> Result<reqwest::Response, ProvisionError> {
        let headers = auth_headers(token, Some(&self.auth.account_id))
            .map_err(|err| ProvisionError::local(err.to_string()))?;
        let response = send_request(&self.client, method, url, headers, payload.as_ref())
            .await
            .map_err(|err| ProvisionError::transport(operation, err))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProvisionError::remote(operation, status, body));
        }
        Ok(response)
    }

    async fn send_json(
        &self,
        operation: &'static str,
        method: Method,
        url: &str,
        payload: Option<Value>,
    ) -> Result<Value, ProvisionError> {
        let response = self
            .send(operation, method, url, &self.auth.bearer_token, payload)
            .await?;
        let text = response
            .text()
            .await
            .map_err(|err| ProvisionError::transport(operation, err))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body = serde_json::from_str::<Value>(&text)
            .map_err(|err| ProvisionError::MalformedResponse(format!("{operation}: {err}")))?;
        debug!(operation, body = %body, "api response");
        Ok(body)
    }

    pub(crate) async fn fetch_workspaces(&self) -> Result<Vec<Workspace>, ProvisionError> {
        let body = self
            .send_json(GET_WORKSPACES, Method::GET, &self.url("workspaces"), None)
            .await?;
        let response: WorkspacesResponse = serde_json::from_value(body).map_err(|err| {
            ProvisionError::MalformedResponse(format!("invalid workspace listing: {err}"))
        })?;
        Ok(response.workspaces)
    }

    /// Fills in vault URL and cluster ID from the workspace. Best effort: the
    /// record keeps empty values when the lookup fails.
    async fn enrich_from_workspace(&self, record: &mut VaultRecord) {
        let workspaces = match self.fetch_workspaces().await {
            Ok(workspaces) => workspaces,
            Err(err) => {
                warn!(error = %err, "failed to fetch workspace details");
                return;
            }
        };
        let Some(workspace) = workspaces
            .into_iter()
            .find(|workspace| workspace.id == record.workspace_id)
        else {
            warn!(workspace = %record.workspace_id, "workspace not found in account");
            return;
        };
        let host = workspace
            .url
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        record.vault_url = format!("https://{host}");
        record.cluster_id = cluster_id_from_url(host).unwrap_or(host).to_string();
        info!(
            workspace = %workspace.display_name,
            vault_url = %record.vault_url,
            cluster_id = %record.cluster_id,
            "resolved vault endpoint"
        );
    }
}

fn default_description() -> String {
    format!(
        "Vault created with Sky CLI on {}",
        chrono::Utc::now().to_rfc3339()
    )
}

#[async_trait]
impl RemoteResourceClient for ManagementClient {
    async fn create_vault(&self, spec: &VaultSpec) -> Result<VaultRecord, ProvisionError> {
        if spec.workspace_id.trim().is_empty() {
            return Err(ProvisionError::local(
                "workspace ID is required for vault creation",
            ));
        }
        if spec.master_key.is_some() {
            warn!("master key is not accepted by the management API; ignoring");
        }
        let (template_id, vault_schema) = match &spec.source {
            VaultSource::Default => (None, None),
            VaultSource::Template(template) => (Some(template.clone()), None),
            VaultSource::Schema(schema) => (None, Some(schema.clone())),
        };
        let description = spec
            .description
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(default_description);
        let payload = CreateVaultRequest {
            name: spec.name.clone(),
            description: description.clone(),
            workspace_id: spec.workspace_id.clone(),
            template_id,
            vault_schema,
        };
        let payload = serde_json::to_value(&payload)
            .map_err(|err| ProvisionError::local(err.to_string()))?;

        let response = self
            .send(
                CREATE_VAULT,
                Method::POST,
                &self.url("vaults"),
                &self.auth.bearer_token,
                Some(payload),
            )
            .await?;
        let text = response
            .text()
            .await
            .map_err(|err| ProvisionError::transport(CREATE_VAULT, err))?;
        debug!(body = %text, "vault creation response");
        let body = serde_json::from_str::<Value>(&text)
            .unwrap_or_else(|_| Value::String(text.trim().to_string()));
        let vault_id = extract_vault_id(&body).ok_or(ProvisionError::VaultIdMissing)?;

        let mut record = VaultRecord {
            vault_id,
            name: spec.name.clone(),
            description,
            vault_url: String::new(),
            cluster_id: String::new(),
            workspace_id: spec.workspace_id.clone(),
        };
        self.enrich_from_workspace(&mut record).await;
        Ok(record)
    }

    async fn create_service_account(
        &self,
        name: &str,
    ) -> Result<ServiceAccountRecord, ProvisionError> {
        let vault_name = name
            .strip_suffix(sky_core::SERVICE_ACCOUNT_SUFFIX)
            .unwrap_or(name);
        let payload = CreateServiceAccountRequest {
            api_key_enabled: true,
            service_account: ServiceAccountDetails {
                name: name.to_string(),
                description: format!(
                    "Service account created with Sky CLI for {vault_name} vault"
                ),
            },
        };
        let payload = serde_json::to_value(&payload)
            .map_err(|err| ProvisionError::local(err.to_string()))?;
        let body = self
            .send_json(
                CREATE_SERVICE_ACCOUNT,
                Method::POST,
                &self.url("serviceAccounts"),
                Some(payload),
            )
            .await?;
        serde_json::from_value(body).map_err(|err| {
            ProvisionError::MalformedResponse(format!("invalid service account response: {err}"))
        })
    }

    async fn get_vault_roles(&self, vault_id: &str) -> Result<Vec<Role>, ProvisionError> {
        if vault_id.trim().is_empty() {
            return Err(ProvisionError::local(
                "vault ID is required to fetch roles",
            ));
        }
        let mut url = self.url("roles");
        append_params(
            &mut url,
            &[("resource.type", "VAULT"), ("resource.ID", vault_id)],
        );
        let body = self.send_json(GET_ROLES, Method::GET, &url, None).await?;
        let roles = match body.get("roles") {
            Some(Value::Array(roles)) => Value::Array(roles.clone()),
            _ => {
                return Err(ProvisionError::MalformedResponse(
                    "role listing has no roles collection".to_string(),
                ))
            }
        };
        let roles: Vec<Role> = serde_json::from_value(roles).map_err(|err| {
            ProvisionError::MalformedResponse(format!("invalid role entry: {err}"))
        })?;
        debug!(vault_id, count = roles.len(), "fetched vault roles");
        Ok(roles)
    }

    async fn assign_role(
        &self,
        role_id: &str,
        service_account_id: &str,
    ) -> Result<String, ProvisionError> {
        let payload = AssignRoleRequest {
            id: role_id.to_string(),
            members: vec![RoleMember {
                id: service_account_id.to_string(),
                kind: SERVICE_ACCOUNT_MEMBER.to_string(),
            }],
        };
        let payload = serde_json::to_value(&payload)
            .map_err(|err| ProvisionError::local(err.to_string()))?;
        let body = self
            .send_json(
                ASSIGN_ROLE,
                Method::POST,
                &self.url("roles/assign"),
                Some(payload),
            )
            .await?;
        Ok(body
            .get("ID")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    async fn verify_access(&self, vault_id: &str, api_key: &str) -> bool {
        let url = self.url(&format!("vaults/{vault_id}"));
        match self
            .send(VERIFY_ACCESS, Method::GET, &url, api_key, None)
            .await
        {
            Ok(_) => true,
            Err(err) => {
                debug!(vault_id, error = %err, "access probe failed");
                false
            }
        }
    }

    async fn create_connection(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<ConnectionResult, ProvisionError> {
        let route = if descriptor.is_egress() {
            "outboundRoutes"
        } else {
            "inboundRoutes"
        };
        let payload = serde_json::to_value(descriptor)
            .map_err(|err| ProvisionError::local(err.to_string()))?;
        let body = self
            .send_json(
                CREATE_CONNECTION,
                Method::POST,
                &self.url(&format!("gateway/{route}")),
                Some(payload),
            )
            .await?;
        serde_json::from_value(body).map_err(|err| {
            ProvisionError::MalformedResponse(format!("invalid connection response: {err}"))
        })
    }
}
