//! Client for the generative-language API.
//!
//! Upstream responses are not trusted: a 200 can carry a safety block instead
//! of an answer, and a failure can come back with an empty or non-JSON body.
//! Every call therefore reads the body as text, classifies it with
//! [`classify_body`], and only then looks for an answer.

use std::collections::HashMap;
use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Client;
use serde_json::Value;

use crate::config::{ApiKey, UpstreamConfig};
use crate::error::{Error, Result};
use crate::proxy::types::{
    CatalogModel, ChatRequest, GenerateContentRequest, ModelCatalog, ModelDescriptor,
};

/// Header carrying the API key on every upstream call.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Capability a catalog entry must advertise to be listed.
pub const GENERATE_CONTENT_METHOD: &str = "generateContent";

/// Finish reason reported when a blocked candidate carries none.
const NO_TEXT_REASON: &str = "NO_TEXT";

const FALLBACK_UPSTREAM_MESSAGE: &str = "Upstream API error";

/// Result of reading an upstream body before trusting it.
#[derive(Debug)]
pub enum UpstreamBody {
    /// Body was empty or whitespace.
    Empty,
    /// Body was not valid JSON. `raw` is for logs only.
    Malformed {
        raw: String,
        error: serde_json::Error,
    },
    Parsed(Value),
}

/// Classify a raw upstream body.
pub fn classify_body(raw: String) -> UpstreamBody {
    if raw.trim().is_empty() {
        return UpstreamBody::Empty;
    }
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => UpstreamBody::Parsed(value),
        Err(error) => UpstreamBody::Malformed { raw, error },
    }
}

/// Strip the `models/` resource prefix the catalog uses in its names.
pub fn normalize_model_id(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

/// Whether `model` (after normalization) is safe to splice into a URL path.
pub fn is_valid_model_id(model: &str) -> bool {
    let id = normalize_model_id(model);
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Pull the upstream-provided message out of an `error` value.
fn error_message(error: &Value) -> Option<&str> {
    match error {
        Value::String(message) => Some(message.as_str()),
        other => other.get("message").and_then(Value::as_str),
    }
}

/// Extract the reply text from a parsed `generateContent` body.
///
/// Checks run in a fixed order: upstream error, missing candidate, candidate
/// without text. Text parts flagged as `thought` are skipped.
pub fn extract_reply(status: StatusCode, body: &Value) -> Result<String> {
    let error = body.get("error").filter(|e| !e.is_null());
    if !status.is_success() || error.is_some() {
        let message = error
            .and_then(error_message)
            .unwrap_or(FALLBACK_UPSTREAM_MESSAGE);
        tracing::error!(status = %status, error = ?error, "Upstream API reported an error");
        return Err(Error::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        });
    }

    let candidate = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .ok_or_else(|| {
            Error::UpstreamBlocked(
                "Upstream returned no answer (likely a safety block)".to_string(),
            )
        })?;

    let text: String = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter(|part| part.get("thought").and_then(Value::as_bool) != Some(true))
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .unwrap_or(NO_TEXT_REASON);
        return Err(Error::UpstreamBlocked(format!(
            "Response blocked. Reason: {}",
            reason
        )));
    }

    Ok(text)
}

/// Build the error for a failed catalog call from its raw body.
///
/// Uses `error.code` as the status when it is a 4xx/5xx code, else 500.
pub fn catalog_error(raw: &str) -> Error {
    let error = serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|body| body.get("error").cloned());

    let status = error
        .as_ref()
        .and_then(|e| e.get("code"))
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(|code| code.is_client_error() || code.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = error
        .as_ref()
        .and_then(error_message)
        .unwrap_or(FALLBACK_UPSTREAM_MESSAGE)
        .to_string();

    Error::Upstream { status, message }
}

/// Reduce the catalog to one descriptor per base model.
///
/// Entries without `generateContent` (or with no method list at all) are
/// dropped. Entries sharing a `baseModelId` collapse into one; the later
/// entry's display name wins and the key keeps the position where it was
/// first seen.
pub fn collapse_catalog(entries: Vec<CatalogModel>) -> Vec<ModelDescriptor> {
    let mut descriptors: Vec<ModelDescriptor> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for model in entries {
        let generates = model
            .supported_generation_methods
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|method| method == GENERATE_CONTENT_METHOD);
        if !generates {
            continue;
        }

        let id = match model.base_model_id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => normalize_model_id(model.name.as_deref().unwrap_or_default()).to_string(),
        };
        if id.is_empty() {
            continue;
        }
        let name = model
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.clone());

        match positions.get(&id) {
            Some(&index) => descriptors[index].name = name,
            None => {
                positions.insert(id.clone(), descriptors.len());
                descriptors.push(ModelDescriptor { id, name });
            }
        }
    }

    descriptors
}

/// Thin client over the two upstream endpoints this service uses.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    api_key: Option<ApiKey>,
}

impl UpstreamClient {
    /// Build a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_client(http: Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key.expose_secret()),
            None => request,
        }
    }

    /// Send the conversation to `models/{model}:generateContent` and return
    /// the reply text.
    pub async fn generate(&self, request: &ChatRequest) -> Result<String> {
        let model = normalize_model_id(&request.model);
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = GenerateContentRequest::from_history(&request.history);

        tracing::debug!(model = %model, turns = request.history.len(), "Calling generateContent");

        let response = self.authorize(self.http.post(&url).json(&body)).send().await?;
        let status = response.status();
        let raw = response.text().await?;

        match classify_body(raw) {
            UpstreamBody::Empty => {
                tracing::error!(
                    status = %status,
                    model = %model,
                    "Upstream returned an empty response"
                );
                Err(Error::UpstreamEmptyResponse)
            }
            UpstreamBody::Malformed { raw, error } => {
                tracing::error!(
                    status = %status,
                    model = %model,
                    error = %error,
                    body = %raw,
                    "Failed to parse upstream response"
                );
                Err(Error::UpstreamMalformedResponse)
            }
            UpstreamBody::Parsed(value) => extract_reply(status, &value).inspect_err(|e| {
                if let Error::UpstreamBlocked(_) = e {
                    tracing::warn!(model = %model, body = %value, "Upstream produced no text");
                }
            }),
        }
    }

    /// Fetch the model catalog and collapse it to one entry per base model.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .authorize(self.http.get(&url).query(&[("pageSize", "1000")]))
            .send()
            .await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %raw, "Upstream catalog request failed");
            return Err(catalog_error(&raw));
        }

        let catalog: ModelCatalog = match classify_body(raw) {
            UpstreamBody::Empty => return Err(Error::UpstreamEmptyResponse),
            UpstreamBody::Malformed { raw, error } => {
                tracing::error!(error = %error, body = %raw, "Failed to parse model catalog");
                return Err(Error::UpstreamMalformedResponse);
            }
            UpstreamBody::Parsed(value) => serde_json::from_value(value).map_err(|e| {
                tracing::error!(error = %e, "Model catalog has an unexpected shape");
                Error::UpstreamMalformedResponse
            })?,
        };

        let entries = catalog.models.ok_or_else(|| {
            tracing::error!("Model catalog has no models array");
            Error::UpstreamMalformedResponse
        })?;

        let total = entries.len();
        let models = collapse_catalog(entries);
        tracing::debug!(total, listed = models.len(), "Collapsed model catalog");

        Ok(models)
    }
}
