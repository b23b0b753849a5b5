use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::app::state::AppState;
use crate::error::ApiError;
use crate::models::checkout::TransactionStatusView;
use crate::services::ServiceError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    transaction_id: Option<String>,
    order_id: Option<String>,
}

pub async fn get_status(
    State(service): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<TransactionStatusView>, ApiError> {
    match service
        .transaction_status(query.transaction_id, query.order_id)
        .await
    {
        Ok(view) => Ok(Json(view)),
        Err(ServiceError::MissingLookup) => {
            Err(ApiError::BadRequest(ServiceError::MissingLookup.to_string()))
        }
        Err(e) => {
            warn!("Transaction lookup failed: {}", e);
            Err(ApiError::NotFound(e.to_string()))
        }
    }
}
