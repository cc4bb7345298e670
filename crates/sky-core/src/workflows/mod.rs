mod batch;
mod provision;

pub use batch::{
    create_connections, create_connections_with, parse_connection_config, validate_connections,
    BatchProgress,
};
pub use provision::{
    find_owner_role, provision_vault, ACCESS_UNVERIFIED_WARNING, OWNER_ROLE_MISSING_WARNING,
};

#[cfg(test)]
mod tests;
