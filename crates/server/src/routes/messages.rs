use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;

use service::messages::{parse_message_id, Message, NewMessage};

use super::AppState;
use crate::errors::ApiError;

/// GET /api/messages
pub async fn list_messages(State(state): State<AppState>) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.messages.list().await.map_err(ApiError::ListFailed)?;
    Ok(Json(messages))
}

/// POST /api/messages
///
/// The body is not validated: missing fields, odd types and non-JSON content
/// types all produce a message. A JSON body is rejected only when it fails to
/// parse or its top level is not an object or array.
pub async fn create_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let input = parse_new_message(&headers, &body)?;
    let created = state.messages.create(input).await.map_err(ApiError::CreateFailed)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/messages/:id
pub async fn delete_message(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_message_id(&raw_id);
    state.messages.delete(id).await.map_err(ApiError::delete)?;
    Ok(StatusCode::NO_CONTENT)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn parse_new_message(headers: &HeaderMap, body: &[u8]) -> Result<NewMessage, ApiError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(NewMessage::default());
    }
    let payload: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    if !(payload.is_object() || payload.is_array()) {
        return Err(ApiError::InvalidBody("top-level JSON must be an object or array".into()));
    }
    Ok(NewMessage::from_payload(payload))
}
