use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Serialize)]
pub struct InsertRequest {
    pub records: Vec<InsertRecord>,
    pub tokenization: bool,
    #[serde(rename = "continueOnError")]
    pub continue_on_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upsert: Option<String>,
}

#[derive(Serialize)]
pub struct InsertRecord {
    pub fields: Value,
}

/// Plain inserts answer with `records`; `continueOnError` inserts answer with
/// one `responses` entry per record.
#[derive(Deserialize, Default)]
pub struct InsertResponse {
    #[serde(default)]
    pub records: Vec<InsertedRecord>,
    #[serde(default)]
    pub responses: Vec<RecordResponse>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct InsertedRecord {
    #[serde(default)]
    pub skyflow_id: String,
    #[serde(default)]
    pub tokens: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct RecordResponse {
    #[serde(rename = "Status", default)]
    pub status: u16,
    #[serde(rename = "Body", default)]
    pub body: Value,
}

#[derive(Debug, Default, PartialEq)]
pub struct InsertOutcome {
    pub inserted: Vec<InsertedRecord>,
    pub errors: Vec<Value>,
}

impl From<InsertResponse> for InsertOutcome {
    fn from(response: InsertResponse) -> Self {
        let mut outcome = InsertOutcome {
            inserted: response.records,
            errors: Vec::new(),
        };
        for entry in response.responses {
            let records = entry
                .body
                .get("records")
                .cloned()
                .and_then(|records| serde_json::from_value::<Vec<InsertedRecord>>(records).ok());
            match records {
                Some(records) if (200..300).contains(&entry.status) => {
                    outcome.inserted.extend(records)
                }
                _ => outcome.errors.push(entry.body),
            }
        }
        outcome
    }
}

#[derive(Serialize)]
pub struct DeidentifyRequest {
    pub vault_id: String,
    pub text: String,
    pub entity_types: Vec<String>,
    pub token_type: TokenTypeMapping,
}

#[derive(Serialize)]
pub struct TokenTypeMapping {
    pub default: String,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct DeidentifyResponse {
    #[serde(default)]
    pub processed_text: String,
    #[serde(default)]
    pub entities: Vec<DetectedEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_count: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct DetectedEntity {
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<EntityLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_scores: Option<Map<String, Value>>,
}

impl DetectedEntity {
    pub fn confidence(&self) -> Option<f64> {
        self.entity_scores
            .as_ref()?
            .values()
            .next()
            .and_then(Value::as_f64)
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct EntityLocation {
    #[serde(default)]
    pub start_index: u64,
    #[serde(default)]
    pub end_index: u64,
}

#[derive(Serialize)]
pub struct ReidentifyRequest {
    pub vault_id: String,
    pub text: String,
    pub format: ReidentifyFormat,
}

#[derive(Serialize, Default)]
pub struct ReidentifyFormat {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plaintext: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub masked: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub redacted: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ReidentifyResponse {
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub http_code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<Value>,
}

/// Failure reported by the vault data plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub http_code: u16,
    pub message: String,
    pub details: Vec<String>,
    pub request_id: Option<String>,
}

impl ApiError {
    /// Builds the error from a non-2xx response body, falling back to the raw
    /// body when it is not the structured error envelope.
    pub fn from_body(status: u16, body: &str, request_id: Option<String>) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => ApiError {
                http_code: envelope.error.http_code.unwrap_or(status),
                message: envelope.error.message,
                details: envelope
                    .error
                    .details
                    .iter()
                    .map(|detail| match detail {
                        Value::String(detail) => detail.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                request_id,
            },
            Err(_) => ApiError {
                http_code: status,
                message: body.trim().to_string(),
                details: Vec::new(),
                request_id,
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skyflow API error:\n  HTTP Code: {}", self.http_code)?;
        if !self.message.is_empty() {
            write!(f, "\n  Message: {}", self.message)?;
        }
        if !self.details.is_empty() {
            write!(f, "\n  Details: {}", self.details.join(", "))?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, "\n  Request ID: {request_id}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
