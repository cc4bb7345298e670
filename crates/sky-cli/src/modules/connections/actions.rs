use std::fs;

use anyhow::Context;
use sky_core::{
    create_connections_with, parse_connection_config, validate_connections, BatchProgress,
    BatchResult, BatchStatus, ConnectionEntry,
};
use tracing::info;

use crate::cli_args::CreateConnectionArgs;
use crate::modules::management::ManagementClient;
use crate::modules::system::prompt::{is_interactive, non_empty, prompt_with_default};
use crate::modules::system::{resolve_management_auth, CommandContext};

pub(crate) async fn handle_create_connection(
    args: CreateConnectionArgs,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    let path = &args.file_path;
    if !path.exists() {
        anyhow::bail!("configuration file not found: {}", path.display());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let entries = parse_connection_config(&contents)?;
    info!(count = entries.len(), file = %path.display(), "loaded connection configuration");

    let default_vault_id = match non_empty(args.vault_id) {
        Some(id) => Some(id),
        None if needs_default_vault(&entries) && is_interactive() => Some(prompt_with_default(
            "Enter vault ID",
            ctx.config.last_vault_id.as_deref(),
        )?),
        None => None,
    };
    let descriptors = validate_connections(&entries, default_vault_id.as_deref())?;

    let auth = resolve_management_auth(ctx)?;
    let client = ManagementClient::new(ctx.client, ctx.api_url, auth);

    println!("\nCreating {} connection(s)...", descriptors.len());
    let result = create_connections_with(&client, &descriptors, print_progress).await;

    print_summary(&result);
    if !result.is_success() {
        anyhow::bail!(
            "{} of {} connection(s) failed",
            result.fail_count(),
            result.items.len()
        );
    }
    Ok(())
}

fn needs_default_vault(entries: &[ConnectionEntry]) -> bool {
    entries.iter().any(ConnectionEntry::lacks_vault_id)
}

fn print_progress(progress: BatchProgress<'_>) {
    let item = match progress {
        BatchProgress::Started {
            position,
            total,
            descriptor,
        } => {
            println!("\n[{position}/{total}] Creating connection: {}", descriptor.name);
            return;
        }
        BatchProgress::Finished { item, .. } => item,
    };
    match item.status {
        BatchStatus::Success => println!(
            "Successfully created connection \"{}\" (ID: {})",
            item.name,
            item.id.as_deref().unwrap_or_default()
        ),
        BatchStatus::Failed => println!(
            "Failed to create connection \"{}\": {}",
            item.name,
            item.error.as_deref().unwrap_or_default()
        ),
    }
}

fn print_summary(result: &BatchResult) {
    println!("\nSummary:");
    println!("Successfully created: {} connection(s)", result.success_count());
    for item in result.successes() {
        println!(
            "      - {} (ID: {})",
            item.name,
            item.id.as_deref().unwrap_or_default()
        );
    }
    if result.fail_count() > 0 {
        println!("Failed to create: {} connection(s)", result.fail_count());
        for item in result.failures() {
            println!(
                "      - {}: {}",
                item.name,
                item.error.as_deref().unwrap_or_default()
            );
        }
    }
}
