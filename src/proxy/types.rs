//! Caller-facing request/response types and the upstream wire format.

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One prior turn, as sent by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub text: String,
}

/// Chat request body before validation.
///
/// Fields are loose so that a missing or mistyped field is reported as a
/// 400 by the handler rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub model: Option<serde_json::Value>,
    #[serde(default)]
    pub history: Option<serde_json::Value>,
}

/// Validated chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub history: Vec<ConversationMessage>,
    pub model: String,
}

/// Successful chat response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// One entry of the simplified model list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
}

// ── Upstream generateContent ──

/// Body of a `models/{model}:generateContent` call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<&ConversationMessage> for Content {
    fn from(message: &ConversationMessage) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Content {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: Some(message.text.clone()),
            }],
        }
    }
}

impl GenerateContentRequest {
    pub fn from_history(history: &[ConversationMessage]) -> Self {
        Self {
            contents: history.iter().map(Content::from).collect(),
        }
    }
}

// ── Upstream model catalog ──

/// Catalog response. `models` is `None` when the field is missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCatalog {
    #[serde(default)]
    pub models: Option<Vec<CatalogModel>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogModel {
    /// Full resource name, e.g. "models/gemini-2.5-pro"
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base_model_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Option<Vec<String>>,
}
