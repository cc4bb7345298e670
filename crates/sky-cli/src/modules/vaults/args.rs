use clap::{ArgAction, Args};
use std::path::PathBuf;

#[derive(Args)]
pub struct CreateVaultArgs {
    #[arg(long, help = "Vault name (letters, digits and hyphens)")]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "schema", help = "Template ID to create the vault from")]
    pub template: Option<String>,
    #[arg(long, value_name = "PATH", help = "Path to a JSON schema file for the vault")]
    pub schema: Option<PathBuf>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, help = "Master encryption key for the vault")]
    pub master_key: Option<String>,
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true",
        help = "Create a service account that owns the vault"
    )]
    pub create_service_account: bool,
    #[arg(long, env = "SKYFLOW_WORKSPACE_ID", help = "Workspace to create the vault in")]
    pub workspace_id: Option<String>,
}
