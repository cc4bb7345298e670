use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::EGRESS_MODE;

/// Server-managed fields stripped from a descriptor before it is submitted.
pub const SERVER_MANAGED_FIELDS: [&str; 2] = ["ID", "BasicAudit"];
/// Route fields assigned by the gateway, stripped before submission.
pub const SERVER_MANAGED_ROUTE_FIELDS: [&str; 1] = ["invocationURL"];

/// One connection as read from the configuration file, before validation.
/// Fields stay untyped here so a wrong type is reported per entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionEntry {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(rename = "vaultID", default)]
    pub vault_id: Option<Value>,
    #[serde(default)]
    pub routes: Option<Value>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ConnectionEntry {
    /// True when `vaultID` is absent, null or blank.
    #[must_use]
    pub fn lacks_vault_id(&self) -> bool {
        match &self.vault_id {
            None | Some(Value::Null) => true,
            Some(Value::String(id)) => id.trim().is_empty(),
            Some(_) => false,
        }
    }
}

/// Accepted top-level shapes of a connection configuration file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ConnectionConfigFile {
    List(Vec<ConnectionEntry>),
    Wrapped { connections: Vec<ConnectionEntry> },
}

impl ConnectionConfigFile {
    #[must_use]
    pub fn into_entries(self) -> Vec<ConnectionEntry> {
        match self {
            Self::List(entries) => entries,
            Self::Wrapped { connections } => connections,
        }
    }
}

/// A validated connection, ready to submit. Fields other than name, vault and
/// routes (auth mode, base URL, ...) pass through untouched in `settings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionDescriptor {
    pub name: String,
    #[serde(rename = "vaultID")]
    pub vault_id: String,
    pub routes: Vec<Map<String, Value>>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ConnectionDescriptor {
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.settings.get("mode").and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_egress(&self) -> bool {
        self.mode() == Some(EGRESS_MODE)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConnectionResult {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: String,
    #[serde(rename = "URL", alias = "url", default)]
    pub url: String,
    #[serde(default)]
    pub status: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub name: String,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn succeeded(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: BatchStatus::Success,
            id: Some(id.into()),
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: BatchStatus::Failed,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// Per-item outcomes in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchResult {
    pub items: Vec<BatchItem>,
}

impl BatchResult {
    pub fn successes(&self) -> impl Iterator<Item = &BatchItem> {
        self.items
            .iter()
            .filter(|item| item.status == BatchStatus::Success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchItem> {
        self.items
            .iter()
            .filter(|item| item.status == BatchStatus::Failed)
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    #[must_use]
    pub fn fail_count(&self) -> usize {
        self.failures().count()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.fail_count() == 0
    }
}
