use clap::Args;

#[derive(Args)]
pub struct ConfigureArgs {
    #[arg(long, help = "Default workspace ID for new vaults")]
    pub workspace_id: Option<String>,
}
