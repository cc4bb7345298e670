use clap::{Args, ValueEnum};

/// Where data-plane requests go.
#[derive(Args, Clone, Debug)]
pub struct VaultTargetArgs {
    #[arg(long, env = "SKYFLOW_VAULT_ID")]
    pub vault_id: Option<String>,
    #[arg(long, env = "SKYFLOW_CLUSTER_ID")]
    pub cluster_id: Option<String>,
    #[arg(
        long,
        env = "SKYFLOW_VAULT_URL",
        help = "Full vault URL; overrides --cluster-id and --environment"
    )]
    pub vault_url: Option<String>,
    #[arg(long, default_value = "PROD", help = "PROD, SANDBOX, STAGE or DEV")]
    pub environment: String,
}

#[derive(Args)]
pub struct InsertArgs {
    #[arg(long, help = "Table to insert into")]
    pub table: Option<String>,
    #[arg(long, help = "JSON object or array of objects (or pipe from stdin)")]
    pub data: Option<String>,
    #[arg(long)]
    pub return_tokens: bool,
    #[arg(long)]
    pub continue_on_error: bool,
    #[arg(long, help = "Column used to upsert instead of insert")]
    pub upsert_column: Option<String>,
    #[command(flatten)]
    pub target: VaultTargetArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenTypeArg {
    #[default]
    #[value(name = "vault_token")]
    VaultToken,
    #[value(name = "entity_only")]
    EntityOnly,
    #[value(name = "entity_unique_counter")]
    EntityUniqueCounter,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct DeidentifyArgs {
    #[arg(long, help = "Text to deidentify (or pipe from stdin)")]
    pub text: Option<String>,
    #[arg(long, help = "Comma-separated entity types, e.g. SSN,CREDIT_CARD")]
    pub entities: Option<String>,
    #[arg(long, value_enum, default_value_t = TokenTypeArg::VaultToken)]
    pub token_type: TokenTypeArg,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
    #[command(flatten)]
    pub target: VaultTargetArgs,
}

#[derive(Args)]
pub struct ReidentifyArgs {
    #[arg(long, help = "Tokenized text to reidentify (or pipe from stdin)")]
    pub text: Option<String>,
    #[arg(long, help = "Entities to return as plain text")]
    pub plain_text: Option<String>,
    #[arg(long, help = "Entities to return masked")]
    pub masked: Option<String>,
    #[arg(long, help = "Entities to keep redacted")]
    pub redacted: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
    #[command(flatten)]
    pub target: VaultTargetArgs,
}
