use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct CreateVaultRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,
    #[serde(rename = "templateID", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(rename = "vaultSchema", skip_serializing_if = "Option::is_none")]
    pub vault_schema: Option<Value>,
}

#[derive(Serialize)]
pub struct CreateServiceAccountRequest {
    #[serde(rename = "apiKeyEnabled")]
    pub api_key_enabled: bool,
    #[serde(rename = "serviceAccount")]
    pub service_account: ServiceAccountDetails,
}

#[derive(Serialize)]
pub struct ServiceAccountDetails {
    pub name: String,
    pub description: String,
}

#[derive(Serialize)]
pub struct AssignRoleRequest {
    #[serde(rename = "ID")]
    pub id: String,
    pub members: Vec<RoleMember>,
}

#[derive(Serialize)]
pub struct RoleMember {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize)]
pub struct WorkspacesResponse {
    pub workspaces: Vec<Workspace>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Workspace {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub url: String,
}
