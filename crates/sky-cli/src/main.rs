use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod cli_command;
mod modules;

use crate::cli_args::*;
use crate::cli_command::handle_command;
use crate::modules::data::credentials::has_env_credentials;
use crate::modules::system::prompt::non_empty;
use crate::modules::system::{
    ensure_secure_addr, handle_configure, load_config, CommandContext, SkyConfig,
};

pub(crate) const DEFAULT_API_URL: &str = "https://manage.skyflowapis.com";

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let command = match cli.command {
        Command::Configure(args) => {
            let mut config = load_config().unwrap_or_else(|err| {
                warn!("replacing unreadable configuration: {err:#}");
                SkyConfig::default()
            });
            return handle_configure(args, cli.bearer_token, cli.account_id, &mut config);
        }
        command => command,
    };

    let bearer_token = non_empty(cli.bearer_token);
    let account_id = non_empty(cli.account_id);
    let config_optional =
        credentials_without_config(&command, bearer_token.as_deref(), account_id.as_deref());
    let (mut config, persist_config) = match load_config() {
        Ok(config) => (config, true),
        Err(err) if config_optional => {
            warn!("ignoring unreadable configuration: {err:#}");
            (SkyConfig::default(), false)
        }
        Err(err) => return Err(err),
    };

    let api_url = cli
        .api_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    ensure_secure_addr(&api_url, cli.insecure)?;
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(cli.insecure)
        .build()?;

    let mut ctx = CommandContext {
        client: &client,
        api_url: &api_url,
        allow_insecure: cli.insecure,
        bearer_token,
        account_id,
        config: &mut config,
        persist_config,
    };
    handle_command(command, &mut ctx).await
}

/// Whether flags and environment values alone authenticate `command`.
fn credentials_without_config(
    command: &Command,
    bearer_token: Option<&str>,
    account_id: Option<&str>,
) -> bool {
    match command {
        Command::Insert(_) | Command::Deidentify(_) | Command::Reidentify(_) => {
            bearer_token.is_some() || has_env_credentials()
        }
        _ => bearer_token.is_some() && account_id.is_some(),
    }
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
