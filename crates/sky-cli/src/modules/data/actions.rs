use serde_json::Value;
use sky_core::cluster_id_from_url;
use tracing::{debug, info};

use super::args::{
    DeidentifyArgs, InsertArgs, OutputFormat, ReidentifyArgs, TokenTypeArg, VaultTargetArgs,
};
use super::credentials::{bearer_token, resolve_credentials};
use super::entities::{parse_entity_list, DEFAULT_ENTITIES};
use super::http::{InsertOptions, VaultDataClient};
use super::types::{DeidentifyResponse, InsertOutcome, ReidentifyFormat};
use crate::modules::system::prompt::{
    is_interactive, non_empty, prompt_required, prompt_with_default, resolve_input,
};
use crate::modules::system::{
    ensure_secure_addr, remember_vault_details, CommandContext, SkyConfig,
};

const RULE_WIDTH: usize = 60;

/// Resolved data-plane endpoint for one command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VaultTarget {
    pub vault_id: String,
    pub vault_url: String,
    pub cluster_id: Option<String>,
}

pub(crate) fn environment_domain(environment: &str) -> &'static str {
    match environment.trim().to_uppercase().as_str() {
        "PROD" | "PRODUCTION" => "vault.skyflowapis.com",
        "SANDBOX" => "vault.skyflowapis-preview.com",
        "STAGE" | "STAGING" => "vault.skyflowapis.tech",
        "DEV" | "DEVELOPMENT" => "vault.skyflowapis.dev",
        other => {
            info!(environment = other, "unknown environment, defaulting to PROD");
            "vault.skyflowapis.com"
        }
    }
}

pub(crate) fn resolve_target(
    args: VaultTargetArgs,
    config: &SkyConfig,
) -> anyhow::Result<VaultTarget> {
    let vault_id = match non_empty(args.vault_id) {
        Some(id) => id,
        None if is_interactive() => {
            prompt_with_default("Enter vault ID", config.last_vault_id.as_deref())?
        }
        None => anyhow::bail!(
            "Vault ID not provided. Please provide --vault-id or set SKYFLOW_VAULT_ID environment variable"
        ),
    };

    if let Some(vault_url) = non_empty(args.vault_url) {
        let cluster_id = cluster_id_from_url(&vault_url)
            .map(str::to_string)
            .or_else(|| non_empty(args.cluster_id));
        debug!(vault_url = %vault_url, "using explicit vault URL");
        return Ok(VaultTarget {
            vault_id,
            vault_url,
            cluster_id,
        });
    }

    let cluster_id = match non_empty(args.cluster_id) {
        Some(id) => id,
        None if is_interactive() => {
            prompt_with_default("Enter cluster ID", config.last_cluster_id.as_deref())?
        }
        None => anyhow::bail!(
            "Cluster ID not provided. Please provide --cluster-id, or set SKYFLOW_CLUSTER_ID or SKYFLOW_VAULT_URL"
        ),
    };
    let vault_url = format!(
        "https://{cluster_id}.{}",
        environment_domain(&args.environment)
    );
    Ok(VaultTarget {
        vault_id,
        vault_url,
        cluster_id: Some(cluster_id),
    })
}

async fn connect(
    target_args: VaultTargetArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<VaultDataClient> {
    let target = resolve_target(target_args, ctx.config)?;
    ensure_secure_addr(&target.vault_url, ctx.allow_insecure)?;
    info!(
        vault_id = %target.vault_id,
        vault_url = %target.vault_url,
        "using vault"
    );
    if ctx.persist_config {
        remember_vault_details(ctx.config, &target.vault_id, target.cluster_id.as_deref())?;
    }

    let credentials = resolve_credentials(ctx.bearer_token.as_deref(), ctx.config)?;
    let token = bearer_token(ctx.client, &credentials, ctx.allow_insecure).await?;
    Ok(VaultDataClient::new(
        ctx.client,
        &target.vault_url,
        &target.vault_id,
        token,
    ))
}

/// A single object becomes a one-record batch.
pub(crate) fn parse_records(input: &str) -> anyhow::Result<Vec<Value>> {
    let parsed: Value =
        serde_json::from_str(input).map_err(|err| anyhow::anyhow!("invalid JSON data: {err}"))?;
    let records = match parsed {
        Value::Array(records) => records,
        other => vec![other],
    };
    if records.is_empty() {
        anyhow::bail!("no records to insert");
    }
    if let Some(index) = records.iter().position(|record| !record.is_object()) {
        anyhow::bail!("record at index {index} must be a JSON object");
    }
    Ok(records)
}

pub(crate) async fn handle_insert(
    args: InsertArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    let table = match non_empty(args.table) {
        Some(table) => table,
        None if is_interactive() => {
            prompt_required("Enter table name: ", "table name is required")?
        }
        None => anyhow::bail!("--table is required"),
    };
    let input = resolve_input(args.data, "Enter JSON data to insert: ", "data is required")?;
    let records = parse_records(&input)?;
    debug!(count = records.len(), table = %table, "parsed records");

    let options = InsertOptions {
        return_tokens: args.return_tokens,
        continue_on_error: args.continue_on_error,
        upsert_column: non_empty(args.upsert_column),
    };
    let client = connect(args.target, ctx).await?;
    let total = records.len();
    let outcome = client.insert(&table, records, &options).await?;
    print_insert_outcome(&outcome, total, options.return_tokens);
    Ok(())
}

fn print_insert_outcome(outcome: &InsertOutcome, total: usize, return_tokens: bool) {
    println!("\nInsert completed successfully!\n");
    if !outcome.inserted.is_empty() {
        println!("Inserted records:");
        for (index, record) in outcome.inserted.iter().enumerate() {
            println!("\nRecord {}:", index + 1);
            if !record.skyflow_id.is_empty() {
                println!("  Skyflow ID: {}", record.skyflow_id);
            }
            if !return_tokens {
                continue;
            }
            for (field, token) in record.tokens.iter().flatten() {
                match token {
                    Value::String(token) => println!("  {field}: {token}"),
                    other => println!("  {field}: {other}"),
                }
            }
        }
    }
    if !outcome.errors.is_empty() {
        println!("\nErrors:");
        for (index, error) in outcome.errors.iter().enumerate() {
            println!("\nError {}:", index + 1);
            let rendered =
                serde_json::to_string_pretty(error).unwrap_or_else(|_| error.to_string());
            println!("  {rendered}");
        }
    }
    println!("\nTotal records processed: {total}");
    println!("Successful: {}", outcome.inserted.len());
    println!("Failed: {}", outcome.errors.len());
}

pub(crate) fn token_type_name(token_type: TokenTypeArg) -> &'static str {
    match token_type {
        TokenTypeArg::VaultToken => "vault_token",
        TokenTypeArg::EntityOnly => "entity_only",
        TokenTypeArg::EntityUniqueCounter => "entity_unq_counter",
    }
}

pub(crate) async fn handle_deidentify(
    args: DeidentifyArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    let text = resolve_input(args.text, "Enter text to deidentify: ", "text is required")?;
    let entities = parse_entity_list(args.entities.as_deref())?
        .unwrap_or_else(|| DEFAULT_ENTITIES.to_vec());
    let token_type = token_type_name(args.token_type);
    debug!(entities = %entities.join(", "), token_type, "deidentify options");

    let client = connect(args.target, ctx).await?;
    let response = client.deidentify_text(&text, &entities, token_type).await?;
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => print_deidentified(&response),
    }
    Ok(())
}

fn print_deidentified(response: &DeidentifyResponse) {
    let rule = "─".repeat(RULE_WIDTH);
    println!("\nDeidentified Text:");
    println!("{rule}");
    println!("{}", response.processed_text);
    println!("{rule}");

    if response.entities.is_empty() {
        println!("\nNo sensitive entities detected.");
    } else {
        println!(
            "\nDetected {} sensitive entities:\n",
            response.entities.len()
        );
        for (index, entity) in response.entities.iter().enumerate() {
            println!("{}. {}", index + 1, entity.entity_type);
            println!("   Original: \"{}\"", entity.value);
            println!("   Token: {}", entity.token);
            if let Some(location) = &entity.location {
                println!(
                    "   Position: {}-{}",
                    location.start_index, location.end_index
                );
            }
            if let Some(confidence) = entity.confidence() {
                println!("   Confidence: {:.1}%", confidence * 100.0);
            }
            println!();
        }
    }
    if let Some(words) = response.word_count {
        println!("Word count: {words}");
    }
    if let Some(chars) = response.character_count {
        println!("Character count: {chars}");
    }
}

pub(crate) async fn handle_reidentify(
    args: ReidentifyArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    let text = resolve_input(
        args.text,
        "Enter tokenized text to reidentify: ",
        "text is required",
    )?;
    let to_names = |list: Option<Vec<&'static str>>| {
        list.unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    let format = ReidentifyFormat {
        plaintext: to_names(parse_entity_list(args.plain_text.as_deref())?),
        masked: to_names(parse_entity_list(args.masked.as_deref())?),
        redacted: to_names(parse_entity_list(args.redacted.as_deref())?),
    };
    if format.plaintext.is_empty() && format.masked.is_empty() && format.redacted.is_empty() {
        debug!("no entity options given, restoring everything as plain text");
    }

    let client = connect(args.target, ctx).await?;
    let response = client.reidentify_text(&text, format).await?;
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => {
            let rule = "─".repeat(RULE_WIDTH);
            println!("\nReidentified Text:");
            println!("{rule}");
            println!("{}", response.text);
            println!("{rule}");
            println!("\nOriginal sensitive data has been restored.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_args(vault_url: Option<&str>, cluster_id: Option<&str>) -> VaultTargetArgs {
        VaultTargetArgs {
            vault_id: Some("vault-1".to_string()),
            cluster_id: cluster_id.map(str::to_string),
            vault_url: vault_url.map(str::to_string),
            environment: "SANDBOX".to_string(),
        }
    }

    #[test]
    fn environments_map_to_vault_domains() {
        assert_eq!(environment_domain("prod"), "vault.skyflowapis.com");
        assert_eq!(environment_domain("SANDBOX"), "vault.skyflowapis-preview.com");
        assert_eq!(environment_domain("staging"), "vault.skyflowapis.tech");
        assert_eq!(environment_domain("DEV"), "vault.skyflowapis.dev");
        assert_eq!(environment_domain("mars"), "vault.skyflowapis.com");
    }

    #[test]
    fn cluster_id_builds_vault_url_for_environment() {
        let target = resolve_target(target_args(None, Some("abc123")), &SkyConfig::default())
            .expect("target");
        assert_eq!(target.vault_url, "https://abc123.vault.skyflowapis-preview.com");
        assert_eq!(target.cluster_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn explicit_vault_url_wins_and_yields_cluster_id() {
        let target = resolve_target(
            target_args(Some("https://xyz789.vault.skyflowapis.com"), Some("ignored")),
            &SkyConfig::default(),
        )
        .expect("target");
        assert_eq!(target.vault_url, "https://xyz789.vault.skyflowapis.com");
        assert_eq!(target.cluster_id.as_deref(), Some("xyz789"));
    }

    #[test]
    fn records_accept_object_or_array() {
        assert_eq!(parse_records(r#"{"name":"a"}"#).expect("object").len(), 1);
        assert_eq!(
            parse_records(r#"[{"name":"a"},{"name":"b"}]"#)
                .expect("array")
                .len(),
            2
        );
        assert!(parse_records("[]").is_err());
        assert!(parse_records(r#"[{"name":"a"}, 3]"#)
            .expect_err("scalar")
            .to_string()
            .contains("index 1"));
        assert!(parse_records("{oops")
            .expect_err("syntax")
            .to_string()
            .contains("invalid JSON data"));
    }

    #[test]
    fn token_types_use_api_names() {
        assert_eq!(token_type_name(TokenTypeArg::VaultToken), "vault_token");
        assert_eq!(
            token_type_name(TokenTypeArg::EntityUniqueCounter),
            "entity_unq_counter"
        );
    }
}
