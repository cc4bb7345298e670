use crate::cli_args::*;
use crate::modules::connections::handle_create_connection;
use crate::modules::data::{handle_deidentify, handle_insert, handle_reidentify};
use crate::modules::system::CommandContext;
use crate::modules::vaults::handle_create_vault;

pub(crate) async fn handle_command(
    command: Command,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    match command {
        Command::CreateVault(args) => handle_create_vault(args, ctx).await?,
        Command::CreateConnection(args) => handle_create_connection(args, ctx).await?,
        Command::Insert(args) => handle_insert(args, ctx).await?,
        Command::Deidentify(args) => handle_deidentify(args, ctx).await?,
        Command::Reidentify(args) => handle_reidentify(args, ctx).await?,
        Command::Configure(_) => anyhow::bail!("configure is handled before dispatch"),
    }

    Ok(())
}
