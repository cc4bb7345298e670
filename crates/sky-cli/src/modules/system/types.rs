use serde::{Deserialize, Serialize};

/// Contents of `~/.skyflow/config.json`.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(
        rename = "workspaceID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_vault_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cluster_id: Option<String>,
}

/// Credentials for the management API, resolved once per command.
#[derive(Clone, Debug)]
pub struct ManagementAuth {
    pub bearer_token: String,
    pub account_id: String,
}

pub struct CommandContext<'a> {
    pub client: &'a reqwest::Client,
    pub api_url: &'a str,
    pub allow_insecure: bool,
    pub bearer_token: Option<String>,
    pub account_id: Option<String>,
    pub config: &'a mut SkyConfig,
    /// False when the stored config could not be parsed and is being bypassed.
    pub persist_config: bool,
}
