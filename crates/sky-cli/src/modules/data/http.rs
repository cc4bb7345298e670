use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::types::{
    ApiError, DeidentifyRequest, DeidentifyResponse, InsertOutcome, InsertRecord, InsertRequest,
    InsertResponse, ReidentifyFormat, ReidentifyRequest, ReidentifyResponse, TokenTypeMapping,
};
use crate::modules::system::http::{auth_headers, send_request};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Options for a record insert.
#[derive(Debug, Clone, Default)]
pub(crate) struct InsertOptions {
    pub return_tokens: bool,
    pub continue_on_error: bool,
    pub upsert_column: Option<String>,
}

/// Client for one vault's data plane (record and detect APIs).
pub(crate) struct VaultDataClient {
    client: reqwest::Client,
    vault_url: String,
    vault_id: String,
    token: String,
}

impl VaultDataClient {
    pub(crate) fn new(
        client: &reqwest::Client,
        vault_url: &str,
        vault_id: &str,
        token: String,
    ) -> Self {
        Self {
            client: client.clone(),
            vault_url: vault_url.trim_end_matches('/').to_string(),
            vault_id: vault_id.to_string(),
            token,
        }
    }

    async fn post<P, R>(&self, path: &str, payload: &P) -> anyhow::Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/v1/{}", self.vault_url, path);
        let payload = serde_json::to_value(payload)?;
        let headers = auth_headers(&self.token, None)?;
        let response =
            send_request(&self.client, Method::POST, &url, headers, Some(&payload)).await?;
        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_body(status.as_u16(), &body, request_id).into());
        }
        debug!(
            path,
            request_id = request_id.as_deref().unwrap_or_default(),
            "data plane response"
        );
        let value: Value = if body.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&body)
                .map_err(|err| anyhow::anyhow!("invalid response from {path}: {err}"))?
        };
        serde_json::from_value(value)
            .map_err(|err| anyhow::anyhow!("unexpected response from {path}: {err}"))
    }

    pub(crate) async fn insert(
        &self,
        table: &str,
        records: Vec<Value>,
        options: &InsertOptions,
    ) -> anyhow::Result<InsertOutcome> {
        let payload = InsertRequest {
            records: records
                .into_iter()
                .map(|fields| InsertRecord { fields })
                .collect(),
            tokenization: options.return_tokens,
            continue_on_error: options.continue_on_error,
            upsert: options.upsert_column.clone(),
        };
        let path = format!(
            "vaults/{}/{}",
            urlencoding::encode(&self.vault_id),
            urlencoding::encode(table)
        );
        let response: InsertResponse = self.post(&path, &payload).await?;
        Ok(response.into())
    }

    pub(crate) async fn deidentify_text(
        &self,
        text: &str,
        entities: &[&str],
        token_type: &str,
    ) -> anyhow::Result<DeidentifyResponse> {
        let payload = DeidentifyRequest {
            vault_id: self.vault_id.clone(),
            text: text.to_string(),
            entity_types: entities.iter().map(|entity| entity.to_string()).collect(),
            token_type: TokenTypeMapping {
                default: token_type.to_string(),
            },
        };
        self.post("detect/deidentify/string", &payload).await
    }

    pub(crate) async fn reidentify_text(
        &self,
        text: &str,
        format: ReidentifyFormat,
    ) -> anyhow::Result<ReidentifyResponse> {
        let payload = ReidentifyRequest {
            vault_id: self.vault_id.clone(),
            text: text.to_string(),
            format,
        };
        self.post("detect/reidentify/string", &payload).await
    }
}
