use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::app::state::AppState;
use crate::error::ApiError;
use crate::models::checkout::{ChargeCreated, CheckoutRequest};
use crate::services::ServiceError;

pub async fn create_charge(
    State(service): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChargeCreated>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Unreadable checkout body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    let request: CheckoutRequest = match serde_json::from_value(payload) {
        Ok(req) => req,
        Err(e) => {
            warn!("Invalid checkout payload: {}", e);
            return Err(ApiError::BadRequest(format!("invalid checkout payload: {}", e)));
        }
    };

    match service.create_charge(request).await {
        Ok(created) => {
            info!(order_id = %created.order_id, "PIX charge issued");
            Ok(Json(created))
        }
        Err(ServiceError::Validation(message)) => {
            warn!("Checkout rejected: {}", message);
            Err(ApiError::BadRequest(message))
        }
        Err(ServiceError::Gateway(e)) => {
            error!("Gateway refused checkout: {}", e);
            Err(ApiError::BadRequest(e.to_string()))
        }
        Err(e) => {
            error!("Failed to create charge: {:?}", e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}
