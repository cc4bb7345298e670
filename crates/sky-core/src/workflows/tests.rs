use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::{
    ConnectionDescriptor, ConnectionResult, ProvisionError, RemoteResourceClient, Role,
    RoleDefinition, ServiceAccountRecord, VaultRecord, VaultSpec,
};

#[derive(Default)]
struct FakeClient {
    calls: Mutex<Vec<String>>,
    fail_create_vault: bool,
    fail_service_account: bool,
    fail_roles: bool,
    fail_assign: bool,
    roles: Vec<Role>,
    access: bool,
    failing_connections: HashSet<String>,
}

impl FakeClient {
    fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles,
            access: true,
            ..Self::default()
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("calls lock").push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl RemoteResourceClient for FakeClient {
    async fn create_vault(&self, spec: &VaultSpec) -> Result<VaultRecord, ProvisionError> {
        self.record("create_vault");
        if self.fail_create_vault {
            return Err(ProvisionError::remote("Vault creation", 500, "boom"));
        }
        Ok(VaultRecord {
            vault_id: "v-1".to_string(),
            name: spec.name.clone(),
            workspace_id: spec.workspace_id.clone(),
            ..VaultRecord::default()
        })
    }

    async fn create_service_account(
        &self,
        name: &str,
    ) -> Result<ServiceAccountRecord, ProvisionError> {
        self.record(format!("create_service_account:{name}"));
        if self.fail_service_account {
            return Err(ProvisionError::remote("Service account creation", 400, "quota"));
        }
        Ok(ServiceAccountRecord {
            client_id: "client-1".to_string(),
            client_name: name.to_string(),
            api_key_id: "key-id-1".to_string(),
            api_key: "api-key-1".to_string(),
        })
    }

    async fn get_vault_roles(&self, vault_id: &str) -> Result<Vec<Role>, ProvisionError> {
        self.record(format!("get_vault_roles:{vault_id}"));
        if self.fail_roles {
            return Err(ProvisionError::remote("Role fetch", 502, "upstream"));
        }
        Ok(self.roles.clone())
    }

    async fn assign_role(
        &self,
        role_id: &str,
        service_account_id: &str,
    ) -> Result<String, ProvisionError> {
        self.record(format!("assign_role:{role_id}:{service_account_id}"));
        if self.fail_assign {
            return Err(ProvisionError::remote("Role assignment", 403, "denied"));
        }
        Ok("assignment-1".to_string())
    }

    async fn verify_access(&self, vault_id: &str, api_key: &str) -> bool {
        self.record(format!("verify_access:{vault_id}:{api_key}"));
        self.access
    }

    async fn create_connection(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<ConnectionResult, ProvisionError> {
        self.record(format!("create_connection:{}", descriptor.name));
        if self.failing_connections.contains(&descriptor.name) {
            return Err(ProvisionError::remote("Connection creation", 400, "bad route"));
        }
        Ok(ConnectionResult {
            id: format!("id-{}", descriptor.name),
            ..ConnectionResult::default()
        })
    }
}

fn role(id: &str, name: &str) -> Role {
    Role {
        id: id.to_string(),
        definition: RoleDefinition {
            name: name.to_string(),
            display_name: String::new(),
            description: String::new(),
        },
    }
}

fn spec(create_service_account: bool) -> VaultSpec {
    VaultSpec {
        create_service_account,
        ..VaultSpec::new("demo-vault", "ws-1")
    }
}

#[tokio::test]
async fn provisioning_without_service_account_makes_one_call() {
    let client = FakeClient::with_roles(vec![role("r1", "VAULT_OWNER")]);

    let outcome = provision_vault(&client, &spec(false))
        .await
        .expect("provision");

    assert_eq!(client.calls(), vec!["create_vault"]);
    assert!(outcome.service_account.is_none());
    assert!(outcome.service_account_id().is_none());
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn provisioning_full_path_assigns_owner_and_verifies() {
    let client = FakeClient::with_roles(vec![role("r0", "VAULT_EDITOR"), role("r1", "VAULT_OWNER")]);

    let outcome = provision_vault(&client, &spec(true))
        .await
        .expect("provision");

    assert_eq!(
        client.calls(),
        vec![
            "create_vault",
            "create_service_account:demo-vault-service-account",
            "get_vault_roles:v-1",
            "assign_role:r1:client-1",
            "verify_access:v-1:api-key-1",
        ]
    );
    assert_eq!(outcome.service_account_id(), Some("client-1"));
    assert_eq!(outcome.service_account_api_key(), Some("api-key-1"));
    assert_eq!(outcome.role_assignment_id.as_deref(), Some("assignment-1"));
    assert!(outcome.access_verified);
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn missing_owner_role_warns_and_skips_assignment() {
    let client = FakeClient::with_roles(vec![role("r0", "VAULT_EDITOR")]);

    let outcome = provision_vault(&client, &spec(true))
        .await
        .expect("provision");

    assert!(outcome.service_account.is_some());
    assert!(outcome.role_assignment_id.is_none());
    assert_eq!(outcome.warnings, vec![OWNER_ROLE_MISSING_WARNING.to_string()]);
    assert!(!client
        .calls()
        .iter()
        .any(|call| call.starts_with("assign_role") || call.starts_with("verify_access")));
}

#[tokio::test]
async fn failed_access_probe_is_a_warning() {
    let client = FakeClient {
        access: false,
        ..FakeClient::with_roles(vec![role("r1", "VAULT_OWNER")])
    };

    let outcome = provision_vault(&client, &spec(true))
        .await
        .expect("provision");

    assert!(!outcome.access_verified);
    assert_eq!(outcome.warnings, vec![ACCESS_UNVERIFIED_WARNING.to_string()]);
    assert!(outcome.service_account.is_some());
}

#[tokio::test]
async fn vault_creation_failure_stops_everything() {
    let client = FakeClient {
        fail_create_vault: true,
        ..FakeClient::with_roles(vec![role("r1", "VAULT_OWNER")])
    };

    let err = provision_vault(&client, &spec(true))
        .await
        .expect_err("must fail");

    assert!(matches!(err, ProvisionError::Remote { status: 500, .. }));
    assert_eq!(client.calls(), vec!["create_vault"]);
}

#[tokio::test]
async fn service_account_failure_stops_before_roles() {
    let client = FakeClient {
        fail_service_account: true,
        ..FakeClient::with_roles(vec![role("r1", "VAULT_OWNER")])
    };

    let err = provision_vault(&client, &spec(true))
        .await
        .expect_err("must fail");

    assert_eq!(err.to_string(), "Service account creation failed: 400 - quota");
    assert_eq!(
        client.calls(),
        vec![
            "create_vault",
            "create_service_account:demo-vault-service-account",
        ]
    );
}

#[tokio::test]
async fn role_fetch_failure_stops_before_assignment() {
    let client = FakeClient {
        fail_roles: true,
        ..FakeClient::with_roles(vec![role("r1", "VAULT_OWNER")])
    };

    let err = provision_vault(&client, &spec(true))
        .await
        .expect_err("must fail");

    assert!(matches!(err, ProvisionError::Remote { status: 502, .. }));
    assert_eq!(
        client.calls(),
        vec![
            "create_vault",
            "create_service_account:demo-vault-service-account",
            "get_vault_roles:v-1",
        ]
    );
}

#[tokio::test]
async fn role_assignment_failure_is_fatal() {
    let client = FakeClient {
        fail_assign: true,
        ..FakeClient::with_roles(vec![role("r1", "VAULT_OWNER")])
    };

    let err = provision_vault(&client, &spec(true))
        .await
        .expect_err("must fail");

    assert_eq!(err.to_string(), "Role assignment failed: 403 - denied");
    assert!(!client
        .calls()
        .iter()
        .any(|call| call.starts_with("verify_access")));
}

#[tokio::test]
async fn invalid_spec_is_rejected_before_any_call() {
    let client = FakeClient::default();
    let bad_name = VaultSpec::new("bad name!", "ws-1");
    let no_workspace = VaultSpec::new("ok-name", " ");

    let err = provision_vault(&client, &bad_name).await.expect_err("name");
    assert!(err.is_local());
    let err = provision_vault(&client, &no_workspace)
        .await
        .expect_err("workspace");
    assert!(err.is_local());
    assert!(client.calls().is_empty());
}

#[test]
fn first_owner_role_wins() {
    let roles = vec![
        role("r1", "VAULT_OWNER"),
        role("r2", "VAULT_OWNER"),
    ];
    assert_eq!(find_owner_role(&roles).map(|role| role.id.as_str()), Some("r1"));
    assert!(find_owner_role(&[]).is_none());
}

#[test]
fn config_accepts_array_and_wrapped_shapes() {
    let bare = r#"[{"name":"a","vaultID":"v1","routes":[{"path":"/x"}]}]"#;
    let wrapped = r#"{"connections":[{"name":"a","vaultID":"v1","routes":[{"path":"/x"}]}]}"#;

    assert_eq!(parse_connection_config(bare).expect("bare").len(), 1);
    assert_eq!(parse_connection_config(wrapped).expect("wrapped").len(), 1);

    let err = parse_connection_config(r#"{"items":[]}"#).expect_err("shape");
    assert!(err.to_string().contains("\"connections\" property"));
    let err = parse_connection_config("{not json").expect_err("syntax");
    assert!(err.to_string().starts_with("invalid JSON in configuration file"));
}

#[test]
fn validation_rejects_empty_routes_naming_the_item() {
    let entries = parse_connection_config(
        r#"[{"name":"a","vaultID":"v1","routes":[{"path":"/x"}]},
            {"name":"b","vaultID":"v1","routes":[]}]"#,
    )
    .expect("parse");

    let err = validate_connections(&entries, None).expect_err("routes");

    let message = err.to_string();
    assert!(message.contains("\"b\""));
    assert!(message.contains("index 1"));
    assert!(message.contains("routes"));
    assert_eq!(validate_connections(&entries, None).expect_err("again"), err);
}

#[test]
fn validation_requires_name_and_vault() {
    let entries = parse_connection_config(r#"[{"vaultID":"v1","routes":[{}]}]"#).expect("parse");
    let err = validate_connections(&entries, None).expect_err("name");
    assert_eq!(
        err.to_string(),
        "connection at index 0 is missing required field: name"
    );

    let entries = parse_connection_config(r#"[{"name":"a","routes":[{}]}]"#).expect("parse");
    let err = validate_connections(&entries, None).expect_err("vault");
    assert!(err.to_string().contains("vaultID"));

    assert!(validate_connections(&[], Some("v1")).is_err());
}

#[test]
fn validation_reports_wrongly_typed_fields_per_entry() {
    let entries = parse_connection_config(
        r#"[{"name":"a","vaultID":"v1","routes":[{}]},
            {"name":5,"vaultID":"v1","routes":[{}]}]"#,
    )
    .expect("parse");
    let err = validate_connections(&entries, None).expect_err("name type");
    assert_eq!(
        err.to_string(),
        "connection at index 1 has an invalid field: name (expected a string)"
    );
    assert!(err.is_local());

    let entries =
        parse_connection_config(r#"[{"name":"a","vaultID":["v1"],"routes":[{}]}]"#).expect("parse");
    assert!(!entries[0].lacks_vault_id());
    let err = validate_connections(&entries, Some("v-default")).expect_err("vault type");
    assert!(err.to_string().contains("\"a\" (index 0)"));
    assert!(err.to_string().contains("vaultID (expected a string)"));

    let entries =
        parse_connection_config(r#"[{"name":"a","vaultID":null,"routes":[{}]}]"#).expect("parse");
    assert!(entries[0].lacks_vault_id());
    let descriptors = validate_connections(&entries, Some("v-default")).expect("null vault");
    assert_eq!(descriptors[0].vault_id, "v-default");
}

#[test]
fn validation_defaults_vault_and_strips_server_fields() {
    let entries = parse_connection_config(
        r#"[{"name":"a","ID":"old","BasicAudit":{},"mode":"EGRESS",
             "routes":[{"path":"/x","invocationURL":"https://old"}]},
            {"name":"b","vaultID":"own","routes":[{"path":"/y"}]}]"#,
    )
    .expect("parse");

    let descriptors = validate_connections(&entries, Some("v-default")).expect("valid");

    assert_eq!(descriptors[0].vault_id, "v-default");
    assert_eq!(descriptors[1].vault_id, "own");
    assert!(descriptors[0].is_egress());
    assert!(!descriptors[1].is_egress());
    let payload = serde_json::to_value(&descriptors[0]).expect("serialize");
    assert_eq!(
        payload,
        json!({
            "name": "a",
            "vaultID": "v-default",
            "mode": "EGRESS",
            "routes": [{"path": "/x"}]
        })
    );
}

#[tokio::test]
async fn batch_continues_past_failures_in_order() {
    let client = FakeClient {
        failing_connections: HashSet::from(["b".to_string()]),
        ..FakeClient::default()
    };
    let entries = parse_connection_config(
        r#"[{"name":"a","vaultID":"v1","routes":[{}]},
            {"name":"b","vaultID":"v1","routes":[{}]},
            {"name":"c","vaultID":"v1","routes":[{}]}]"#,
    )
    .expect("parse");
    let descriptors = validate_connections(&entries, None).expect("valid");
    let mut seen = Vec::new();

    let result = create_connections_with(&client, &descriptors, |progress| match progress {
        BatchProgress::Started {
            position,
            total,
            descriptor,
        } => {
            seen.push(format!("{position}/{total} start {}", descriptor.name));
        }
        BatchProgress::Finished {
            position,
            total,
            item,
        } => {
            seen.push(format!("{position}/{total} {:?}", item.status));
        }
    })
    .await;

    let names: Vec<_> = result.items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.fail_count(), 1);
    assert!(!result.is_success());
    assert_eq!(result.items[0].id.as_deref(), Some("id-a"));
    assert_eq!(
        result.items[1].error.as_deref(),
        Some("Connection creation failed: 400 - bad route")
    );
    assert_eq!(
        seen,
        vec![
            "1/3 start a",
            "1/3 Success",
            "2/3 start b",
            "2/3 Failed",
            "3/3 start c",
            "3/3 Success",
        ]
    );
}
