use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::modules::system::{ensure_secure_addr, SkyConfig};

pub(crate) const API_KEY_ENV: &str = "SKYFLOW_API_KEY";
pub(crate) const CREDENTIALS_PATH_ENV: &str = "SKYFLOW_CREDENTIALS_PATH";
pub(crate) const CREDENTIALS_ENV: &str = "SKYFLOW_CREDENTIALS";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECS: i64 = 3600;

/// How a data-plane command authenticates, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DataCredentials {
    ApiKey(String),
    CredentialsFile(PathBuf),
    CredentialsJson(String),
    BearerToken(String),
}

/// Contents of a service-account credentials file.
#[derive(Deserialize, Debug)]
pub(crate) struct ServiceAccountCredentials {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "keyID")]
    pub key_id: String,
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    key: &'a str,
    aud: &'a str,
    sub: &'a str,
    exp: i64,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    assertion: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

/// Whether the environment alone names data-plane credentials.
pub(crate) fn has_env_credentials() -> bool {
    [API_KEY_ENV, CREDENTIALS_PATH_ENV, CREDENTIALS_ENV]
        .iter()
        .any(|name| std::env::var(name).is_ok_and(|value| !value.trim().is_empty()))
}

/// `bearer_token` is the `--bearer-token`/`SKYFLOW_BEARER_TOKEN` value; it
/// outranks the token stored by `sky configure`.
pub(crate) fn resolve_credentials(
    bearer_token: Option<&str>,
    config: &SkyConfig,
) -> anyhow::Result<DataCredentials> {
    resolve_credentials_with(|name| std::env::var(name).ok(), bearer_token, config)
}

pub(crate) fn resolve_credentials_with<F>(
    env: F,
    bearer_token: Option<&str>,
    config: &SkyConfig,
) -> anyhow::Result<DataCredentials>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());
    if let Some(api_key) = lookup(API_KEY_ENV) {
        return Ok(DataCredentials::ApiKey(api_key));
    }
    if let Some(path) = lookup(CREDENTIALS_PATH_ENV) {
        return Ok(DataCredentials::CredentialsFile(PathBuf::from(path)));
    }
    if let Some(json) = lookup(CREDENTIALS_ENV) {
        return Ok(DataCredentials::CredentialsJson(json));
    }
    let present = |token: &&str| !token.trim().is_empty();
    if let Some(token) = bearer_token
        .filter(present)
        .or_else(|| config.bearer_token.as_deref().filter(present))
    {
        return Ok(DataCredentials::BearerToken(token.to_string()));
    }
    anyhow::bail!(
        "No Skyflow credentials found. Please set one of:\n  - {API_KEY_ENV} environment variable\n  - {CREDENTIALS_PATH_ENV} environment variable\n  - {CREDENTIALS_ENV} environment variable\n  - Or run: sky configure"
    )
}

/// Turns credentials into the bearer token sent to the data plane, exchanging
/// service-account credentials when needed.
pub(crate) async fn bearer_token(
    client: &reqwest::Client,
    credentials: &DataCredentials,
    allow_insecure: bool,
) -> anyhow::Result<String> {
    match credentials {
        DataCredentials::ApiKey(token) | DataCredentials::BearerToken(token) => Ok(token.clone()),
        DataCredentials::CredentialsFile(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read credentials file {}", path.display()))?;
            let parsed = parse_service_account_credentials(&contents)?;
            exchange_service_account_token(client, &parsed, allow_insecure).await
        }
        DataCredentials::CredentialsJson(json) => {
            let parsed = parse_service_account_credentials(json)?;
            exchange_service_account_token(client, &parsed, allow_insecure).await
        }
    }
}

pub(crate) fn parse_service_account_credentials(
    contents: &str,
) -> anyhow::Result<ServiceAccountCredentials> {
    serde_json::from_str(contents).context(
        "invalid service account credentials; expected clientID, keyID, tokenURI and privateKey",
    )
}

pub(crate) fn sign_assertion(credentials: &ServiceAccountCredentials) -> anyhow::Result<String> {
    let claims = AssertionClaims {
        iss: &credentials.client_id,
        key: &credentials.key_id,
        aud: &credentials.token_uri,
        sub: &credentials.client_id,
        exp: chrono::Utc::now().timestamp() + ASSERTION_TTL_SECS,
    };
    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .context("invalid service account private key")?;
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
}

pub(crate) async fn exchange_service_account_token(
    client: &reqwest::Client,
    credentials: &ServiceAccountCredentials,
    allow_insecure: bool,
) -> anyhow::Result<String> {
    ensure_secure_addr(&credentials.token_uri, allow_insecure)?;
    let assertion = sign_assertion(credentials)?;
    let payload = TokenRequest {
        grant_type: JWT_BEARER_GRANT,
        assertion: &assertion,
    };
    debug!(token_uri = %credentials.token_uri, "exchanging service account credentials");
    let response = client
        .post(&credentials.token_uri)
        .json(&payload)
        .send()
        .await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Service account token exchange failed: {status} {body}");
    }
    Ok(response.json::<TokenResponse>().await?.access_token)
}
