//! HTTP request handlers.

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use super::server::{AppState, RequestId};
use super::types::{ChatPayload, ChatRequest, ChatResponse, ConversationMessage, ModelDescriptor};
use crate::error::{Error, Result};
use crate::upstream::is_valid_model_id;

/// Turn a loosely-typed chat body into a [`ChatRequest`].
///
/// `model` must be a non-empty string usable as an upstream model id.
/// `history` must be a non-empty array of `{role, text}` with role `user`
/// or `model`.
pub fn validate_chat_payload(payload: ChatPayload) -> Result<ChatRequest> {
    let model = match payload.model {
        Some(Value::String(model)) if !model.trim().is_empty() => model,
        _ => return Err(Error::InvalidInput("model is required".to_string())),
    };
    if !is_valid_model_id(&model) {
        return Err(Error::InvalidInput(format!(
            "Invalid model identifier '{}'",
            model
        )));
    }

    let items = match payload.history {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            return Err(Error::InvalidInput(
                "history must be a non-empty array".to_string(),
            ))
        }
    };

    let history = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<ConversationMessage>(item).map_err(|e| {
                Error::InvalidInput(format!(
                    "history[{}] must be {{\"role\": \"user\"|\"model\", \"text\": string}}: {}",
                    index, e
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ChatRequest { history, model })
}

/// Handle POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: std::result::Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(request_id = %request_id.0, rejection = %rejection, "Rejected chat body");
        Error::InvalidInput(rejection.body_text())
    })?;
    let request = validate_chat_payload(payload)?;

    tracing::info!(
        request_id = %request_id.0,
        model = %request.model,
        turns = request.history.len(),
        "Received chat request"
    );

    match state.upstream.generate(&request).await {
        Ok(reply) => {
            tracing::info!(
                request_id = %request_id.0,
                reply_len = reply.len(),
                "Chat request completed"
            );
            Ok(Json(ChatResponse { reply }))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id.0, error = %e, "Chat request failed");
            Err(e)
        }
    }
}

/// Handle GET /api/getModels
pub async fn get_models(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<Vec<ModelDescriptor>>> {
    match state.upstream.list_models().await {
        Ok(models) => {
            tracing::info!(request_id = %request_id.0, count = models.len(), "Listed models");
            Ok(Json(models))
        }
        Err(e @ Error::Upstream { .. }) => {
            tracing::error!(
                request_id = %request_id.0,
                error = %e,
                "Upstream rejected model listing"
            );
            Err(e)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id.0, error = %e, "Failed to list models");
            Err(Error::Internal("Failed to list models".to_string()))
        }
    }
}

/// Fallback for unsupported methods on a known path.
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

/// Handle GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sealradio"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::types::Role;
    use serde_json::json;

    fn payload(value: Value) -> ChatPayload {
        serde_json::from_value(value).unwrap()
    }

    fn assert_invalid(result: Result<ChatRequest>, needle: &str) {
        match result {
            Err(Error::InvalidInput(message)) => {
                assert!(message.contains(needle), "unexpected message: {}", message)
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_payload() {
        let request = validate_chat_payload(payload(json!({
            "model": "gemini-2.5-flash",
            "history": [
                {"role": "user", "text": "Who is the seal?"},
                {"role": "model", "text": "A radio host."},
                {"role": "user", "text": "Play something"}
            ]
        })))
        .unwrap();
        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.history.len(), 3);
        assert_eq!(request.history[1].role, Role::Model);
    }

    #[test]
    fn test_missing_model() {
        let result = validate_chat_payload(payload(json!({
            "history": [{"role": "user", "text": "hi"}]
        })));
        assert_invalid(result, "model is required");
    }

    #[test]
    fn test_blank_or_non_string_model() {
        for model in [json!("  "), json!(42)] {
            let result = validate_chat_payload(payload(json!({
                "model": model,
                "history": [{"role": "user", "text": "hi"}]
            })));
            assert_invalid(result, "model is required");
        }
    }

    #[test]
    fn test_model_with_path_characters_rejected() {
        let result = validate_chat_payload(payload(json!({
            "model": "gemini/../../v1/files",
            "history": [{"role": "user", "text": "hi"}]
        })));
        assert_invalid(result, "Invalid model identifier");
    }

    #[test]
    fn test_missing_empty_or_non_array_history() {
        for history in [Value::Null, json!([]), json!("hello"), json!({"role": "user"})] {
            let result = validate_chat_payload(payload(json!({
                "model": "gemini-2.5-flash",
                "history": history
            })));
            assert_invalid(result, "non-empty array");
        }
        let result = validate_chat_payload(payload(json!({"model": "gemini-2.5-flash"})));
        assert_invalid(result, "non-empty array");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = validate_chat_payload(payload(json!({
            "model": "gemini-2.5-flash",
            "history": [
                {"role": "user", "text": "hi"},
                {"role": "system", "text": "be a seal"}
            ]
        })));
        assert_invalid(result, "history[1]");
    }

    #[test]
    fn test_message_without_text_rejected() {
        let result = validate_chat_payload(payload(json!({
            "model": "gemini-2.5-flash",
            "history": [{"role": "user"}]
        })));
        assert_invalid(result, "history[0]");
    }
}
