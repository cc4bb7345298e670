use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ProvisionError, VAULT_ID_FIELDS};

const NAME_ADJECTIVES: [&str; 8] = [
    "swift", "secure", "silent", "dynamic", "cosmic", "rapid", "stellar", "hidden",
];
const NAME_NOUNS: [&str; 8] = [
    "vault", "fortress", "bunker", "archive", "cache", "chamber", "keep", "locker",
];
const VAULT_HOST_MARKER: &str = ".vault.skyflowapis";

/// Where the vault's table layout comes from. The remote service applies its
/// own default when neither a template nor a schema is given.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VaultSource {
    #[default]
    Default,
    Template(String),
    Schema(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VaultSpec {
    pub name: String,
    pub source: VaultSource,
    pub description: Option<String>,
    pub master_key: Option<String>,
    pub workspace_id: String,
    pub create_service_account: bool,
}

impl VaultSpec {
    pub fn new(name: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: VaultSource::Default,
            description: None,
            master_key: None,
            workspace_id: workspace_id.into(),
            create_service_account: true,
        }
    }

    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.workspace_id.trim().is_empty() {
            return Err(ProvisionError::local(
                "workspace ID is required for vault creation",
            ));
        }
        if !is_valid_vault_name(&self.name) {
            return Err(ProvisionError::local(format!(
                "invalid vault name '{}': use letters, digits and hyphens only",
                self.name
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn service_account_name(&self) -> String {
        format!("{}{}", self.name, crate::SERVICE_ACCOUNT_SUFFIX)
    }
}

#[must_use]
pub fn is_valid_vault_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

/// Random `<adjective>-<noun>-<n>` name, always valid per [`is_valid_vault_name`].
#[must_use]
pub fn generate_vault_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = NAME_ADJECTIVES.choose(&mut rng).copied().unwrap_or("secure");
    let noun = NAME_NOUNS.choose(&mut rng).copied().unwrap_or("vault");
    format!("{adjective}-{noun}-{}", rng.gen_range(0..1000))
}

pub fn load_schema_document(path: &Path) -> Result<Value, ProvisionError> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        ProvisionError::local(format!(
            "failed to read schema file {}: {err}",
            path.display()
        ))
    })?;
    serde_json::from_str(&contents).map_err(|err| {
        ProvisionError::local(format!(
            "invalid JSON schema file {}: {err}",
            path.display()
        ))
    })
}

/// Pulls the vault ID out of a creation response. A bare JSON string is the ID
/// itself; objects are searched through [`VAULT_ID_FIELDS`] in order and the
/// first non-empty value wins.
#[must_use]
pub fn extract_vault_id(body: &Value) -> Option<String> {
    match body {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Object(map) => VAULT_ID_FIELDS.iter().find_map(|field| {
            match map.get(*field)? {
                Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            }
        }),
        _ => None,
    }
}

/// `https://abc123.vault.skyflowapis.com` -> `abc123`.
#[must_use]
pub fn cluster_id_from_url(url: &str) -> Option<&str> {
    let host = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let (cluster, _) = host.split_once(VAULT_HOST_MARKER)?;
    if cluster.is_empty() || cluster.contains('.') || cluster.contains('/') {
        return None;
    }
    Some(cluster)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VaultRecord {
    #[serde(rename = "vaultID")]
    pub vault_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "vaultURL", default)]
    pub vault_url: String,
    #[serde(rename = "clusterID", default)]
    pub cluster_id: String,
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountRecord {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientName", default)]
    pub client_name: String,
    #[serde(rename = "apiKeyID", default)]
    pub api_key_id: String,
    #[serde(rename = "apiKey", default)]
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "ID")]
    pub id: String,
    pub definition: RoleDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningOutcome {
    pub vault: VaultRecord,
    pub service_account: Option<ServiceAccountRecord>,
    pub role_assignment_id: Option<String>,
    pub access_verified: bool,
    pub warnings: Vec<String>,
}

impl ProvisioningOutcome {
    #[must_use]
    pub fn service_account_id(&self) -> Option<&str> {
        self.service_account
            .as_ref()
            .map(|account| account.client_id.as_str())
    }

    #[must_use]
    pub fn service_account_api_key(&self) -> Option<&str> {
        self.service_account
            .as_ref()
            .map(|account| account.api_key.as_str())
    }
}
