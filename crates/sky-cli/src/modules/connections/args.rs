use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct CreateConnectionArgs {
    #[arg(long, value_name = "PATH", help = "Path to the connection configuration file")]
    pub file_path: PathBuf,
    #[arg(
        long,
        env = "SKYFLOW_VAULT_ID",
        help = "Vault for connections that do not name their own vaultID"
    )]
    pub vault_id: Option<String>,
}
