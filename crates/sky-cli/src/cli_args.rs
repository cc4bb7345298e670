use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::connections::args::*;
pub use crate::modules::data::args::*;
pub use crate::modules::system::args::*;
pub use crate::modules::vaults::args::*;

#[derive(Parser)]
#[command(name = "sky")]
#[command(about = "Skyflow CLI", version)]
pub struct Cli {
    #[arg(long, global = true, env = "SKYFLOW_API_URL", help = "Management API base URL")]
    pub api_url: Option<String>,
    #[arg(long, global = true, env = "SKYFLOW_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,
    #[arg(long, global = true, env = "SKYFLOW_ACCOUNT_ID")]
    pub account_id: Option<String>,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(long, global = true, help = "Allow http:// and invalid TLS certificates")]
    pub insecure: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Store management API credentials")]
    Configure(ConfigureArgs),
    #[command(about = "Create a vault, optionally with an owning service account")]
    CreateVault(CreateVaultArgs),
    #[command(about = "Create connections from a configuration file")]
    CreateConnection(CreateConnectionArgs),
    #[command(about = "Insert records into a vault table")]
    Insert(InsertArgs),
    #[command(about = "Detect and tokenize sensitive data in text")]
    Deidentify(DeidentifyArgs),
    #[command(about = "Restore original values in tokenized text")]
    Reidentify(ReidentifyArgs),
}
