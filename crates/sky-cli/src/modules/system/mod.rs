pub(crate) mod args;
pub(crate) mod config;
pub(crate) mod http;
pub(crate) mod prompt;
pub(crate) mod types;

pub(crate) use config::{
    ensure_secure_addr, handle_configure, load_config, remember_vault_details,
    resolve_management_auth,
};
pub(crate) use types::{CommandContext, ManagementAuth, SkyConfig};
