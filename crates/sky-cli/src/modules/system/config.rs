use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::prompt::{non_empty, prompt_password, prompt_required};
use super::types::{ManagementAuth, SkyConfig};
use crate::cli_args::ConfigureArgs;
use crate::modules::system::CommandContext;

pub(crate) fn handle_configure(
    args: ConfigureArgs,
    bearer_token: Option<String>,
    account_id: Option<String>,
    config: &mut SkyConfig,
) -> anyhow::Result<()> {
    let bearer_token = non_empty(bearer_token);
    let account_id = non_empty(account_id);
    let workspace_id = non_empty(args.workspace_id);
    if bearer_token.is_none() || account_id.is_none() || workspace_id.is_none() {
        println!("Please provide your Skyflow API credentials:");
    }

    let bearer_token = match bearer_token {
        Some(token) => token,
        None => prompt_password("Enter your Skyflow Bearer Token: ")?,
    };
    let account_id = match account_id {
        Some(id) => id,
        None => prompt_required("Enter your Skyflow Account ID: ", "account ID is required")?,
    };
    let workspace_id = match workspace_id {
        Some(id) => id,
        None => prompt_required(
            "Enter your Skyflow Workspace ID: ",
            "workspace ID is required",
        )?,
    };

    config.bearer_token = Some(bearer_token);
    config.account_id = Some(account_id);
    config.workspace_id = Some(workspace_id);
    save_config(config)?;

    println!("\nConfiguration saved successfully!");
    println!("\nYou can now use the Skyflow CLI. Try running:");
    println!("  sky create-vault --help");
    Ok(())
}

/// Flag or environment value first, stored config second.
pub(crate) fn resolve_management_auth(ctx: &CommandContext<'_>) -> anyhow::Result<ManagementAuth> {
    let bearer_token = non_empty(ctx.bearer_token.clone())
        .or_else(|| non_empty(ctx.config.bearer_token.clone()));
    let account_id =
        non_empty(ctx.account_id.clone()).or_else(|| non_empty(ctx.config.account_id.clone()));
    match (bearer_token, account_id) {
        (Some(bearer_token), Some(account_id)) => Ok(ManagementAuth {
            bearer_token,
            account_id,
        }),
        _ => anyhow::bail!(
            "Skyflow CLI is not configured. Set SKYFLOW_BEARER_TOKEN and SKYFLOW_ACCOUNT_ID, or run: sky configure"
        ),
    }
}

/// Records the vault a data-plane command ran against so later prompts can
/// offer it as the default.
pub(crate) fn remember_vault_details(
    config: &mut SkyConfig,
    vault_id: &str,
    cluster_id: Option<&str>,
) -> anyhow::Result<()> {
    let vault_changed = config.last_vault_id.as_deref() != Some(vault_id);
    let cluster_changed = cluster_id.is_some() && config.last_cluster_id.as_deref() != cluster_id;
    if !vault_changed && !cluster_changed {
        return Ok(());
    }
    config.last_vault_id = Some(vault_id.to_string());
    if let Some(cluster_id) = cluster_id {
        config.last_cluster_id = Some(cluster_id.to_string());
    }
    save_config(config)
}

pub(crate) fn config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(".skyflow").join("config.json"))
}

pub(crate) fn load_config() -> anyhow::Result<SkyConfig> {
    load_config_from(&config_path()?)
}

pub(crate) fn load_config_from(path: &Path) -> anyhow::Result<SkyConfig> {
    if !path.exists() {
        return Ok(SkyConfig::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| {
        format!(
            "invalid configuration {}; please run: sky configure",
            path.display()
        )
    })
}

pub(crate) fn save_config(config: &SkyConfig) -> anyhow::Result<()> {
    save_config_to(&config_path()?, config)
}

pub(crate) fn save_config_to(path: &Path, config: &SkyConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub(crate) fn ensure_secure_addr(addr: &str, allow_insecure: bool) -> anyhow::Result<()> {
    if addr.starts_with("http://") && !allow_insecure {
        anyhow::bail!("refusing to use http:// without --insecure");
    }
    Ok(())
}
