/// Role definition name that grants full control over a vault.
pub const VAULT_OWNER_ROLE: &str = "VAULT_OWNER";

/// Response fields that may carry the ID of a newly created vault, in priority order.
pub const VAULT_ID_FIELDS: [&str; 4] = ["id", "vaultID", "vault_id", "ID"];

pub const SERVICE_ACCOUNT_SUFFIX: &str = "-service-account";

/// Member type used when assigning a role to a service account.
pub const SERVICE_ACCOUNT_MEMBER: &str = "SERVICE_ACCOUNT";

pub const EGRESS_MODE: &str = "EGRESS";
