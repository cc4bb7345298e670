use std::path::PathBuf;

use sky_core::{
    generate_vault_name, load_schema_document, provision_vault, ProvisioningOutcome, VaultSource,
    VaultSpec,
};
use tracing::debug;

use crate::cli_args::CreateVaultArgs;
use crate::modules::management::ManagementClient;
use crate::modules::system::prompt::{
    is_interactive, non_empty, prompt_line, prompt_required, prompt_with_default,
};
use crate::modules::system::{resolve_management_auth, CommandContext};

pub(crate) async fn handle_create_vault(
    args: CreateVaultArgs,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    let auth = resolve_management_auth(ctx)?;

    let workspace_id = match non_empty(args.workspace_id)
        .or_else(|| non_empty(ctx.config.workspace_id.clone()))
    {
        Some(id) => id,
        None => prompt_required(
            "Enter your Skyflow Workspace ID: ",
            "workspace ID is required",
        )?,
    };
    let name = match non_empty(args.name) {
        Some(name) => name,
        None => resolve_vault_name()?,
    };
    let source = resolve_source(args.template, args.schema)?;

    let spec = VaultSpec {
        name,
        source,
        description: non_empty(args.description),
        master_key: non_empty(args.master_key),
        workspace_id,
        create_service_account: args.create_service_account,
    };
    spec.validate()?;
    debug!(
        name = %spec.name,
        workspace = %spec.workspace_id,
        create_service_account = spec.create_service_account,
        "vault spec resolved"
    );

    println!("Creating vault \"{}\"...", spec.name);
    if spec.create_service_account {
        println!("A service account owning the vault will be created as well.");
    }
    let client = ManagementClient::new(ctx.client, ctx.api_url, auth);
    let outcome = provision_vault(&client, &spec).await?;
    print_outcome(&outcome);
    Ok(())
}

fn resolve_vault_name() -> anyhow::Result<String> {
    let generated = generate_vault_name();
    if !is_interactive() {
        return Ok(generated);
    }
    prompt_with_default("Enter vault name (no special chars)", Some(&generated))
}

fn resolve_source(
    template: Option<String>,
    schema: Option<PathBuf>,
) -> anyhow::Result<VaultSource> {
    if let Some(path) = schema {
        return Ok(VaultSource::Schema(load_schema_document(&path)?));
    }
    if let Some(template) = non_empty(template) {
        return Ok(VaultSource::Template(template));
    }
    if !is_interactive() {
        return Ok(VaultSource::Default);
    }
    let method = prompt_line("Create the vault from a template, a schema file, or the default? (template/schema/default) [default]: ")?;
    match method.trim() {
        "" | "default" => Ok(VaultSource::Default),
        "template" => Ok(VaultSource::Template(prompt_required(
            "Enter template ID: ",
            "template ID is required",
        )?)),
        "schema" => {
            let path = prompt_required(
                "Enter path to schema JSON file: ",
                "schema path is required",
            )?;
            Ok(VaultSource::Schema(load_schema_document(&PathBuf::from(
                path,
            ))?))
        }
        other => anyhow::bail!("unknown vault source: {other}"),
    }
}

fn print_outcome(outcome: &ProvisioningOutcome) {
    let vault = &outcome.vault;
    for warning in &outcome.warnings {
        eprintln!("Warning: {warning}");
    }
    if vault.vault_url.is_empty() {
        eprintln!("Warning: vault URL and cluster ID could not be resolved from the workspace");
    }

    println!("\n=== Vault Created Successfully ===\n");
    println!("Name: {}", vault.name);
    println!("Description: {}", vault.description);
    println!("Vault URL: {}", vault.vault_url);
    println!("Cluster ID: {}", vault.cluster_id);
    println!("Vault ID: {}", vault.vault_id);
    if let (Some(id), Some(api_key)) = (
        outcome.service_account_id(),
        outcome.service_account_api_key(),
    ) {
        println!("Service Account ID: {id}");
        println!("Service Account API Key: {api_key}");
        if outcome.role_assignment_id.is_some() && outcome.access_verified {
            println!("Service account access verified successfully.");
        }
    }

    println!("\nEnvironment Variables:");
    println!("export SKYFLOW_VAULT_ID={}", vault.vault_id);
    println!("export SKYFLOW_CLUSTER_ID={}", vault.cluster_id);
    println!("export SKYFLOW_VAULT_URL={}", vault.vault_url);
    println!("export SKYFLOW_WORKSPACE_ID={}", vault.workspace_id);
    if let (Some(id), Some(api_key)) = (
        outcome.service_account_id(),
        outcome.service_account_api_key(),
    ) {
        println!("export SKYFLOW_SERVICE_ACCOUNT_ID={id}");
        println!("export SKYFLOW_API_KEY={api_key}");
    }
}
