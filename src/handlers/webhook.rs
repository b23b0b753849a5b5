use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::app::state::AppState;
use crate::error::ApiError;
use crate::services::ServiceError;

/// Gateway callbacks. Anything other than a token mismatch answers 200 so the
/// gateway does not keep redelivering a payload we cannot process.
pub async fn receive(State(service): State<AppState>, body: Bytes) -> Response {
    match service.handle_webhook(&body) {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(ServiceError::InvalidWebhookToken) => {
            ApiError::Unauthorized(ServiceError::InvalidWebhookToken.to_string()).into_response()
        }
        Err(e) => {
            error!("Webhook could not be processed: {}", e);
            (StatusCode::OK, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
