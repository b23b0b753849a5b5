use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::app::state::AppState;
use crate::handlers::{charge, status, webhook};

pub const CHARGE_PATH: &str = "/api/pix/charge";
pub const STATUS_PATH: &str = "/api/pix/status";
pub const WEBHOOK_PATH: &str = "/api/webhooks/gateway";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(CHARGE_PATH, post(charge::create_charge))
        .route(STATUS_PATH, get(status::get_status))
        .route(WEBHOOK_PATH, post(webhook::receive))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> StatusCode {
    StatusCode::OK
}
