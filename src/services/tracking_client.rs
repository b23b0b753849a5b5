use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::app::config::TrackingConfig;
use crate::models::tracking::{AttributionReport, TrackedOrder};

const API_TOKEN_HEADER: &str = "x-api-token";

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking api token is not configured")]
    MissingCredentials,
    #[error("tracking service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result of one report. Non-2xx answers are not errors; the raw body is kept
/// either way so callers can log it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingOutcome {
    pub success: bool,
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait TrackingSink: Send + Sync {
    async fn send_order(&self, order: &TrackedOrder) -> Result<TrackingOutcome, TrackingError>;
}

pub struct TrackingClient {
    client: Client,
    config: TrackingConfig,
}

impl TrackingClient {
    pub fn new(config: &TrackingConfig) -> Result<Self, TrackingError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl TrackingSink for TrackingClient {
    async fn send_order(&self, order: &TrackedOrder) -> Result<TrackingOutcome, TrackingError> {
        let token = self
            .config
            .api_token
            .as_deref()
            .ok_or(TrackingError::MissingCredentials)?;

        let report = AttributionReport::from_order(order, &self.config.platform);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(API_TOKEN_HEADER, token)
            .json(&report)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            info!(order_id = %order.order_id, status = report.status.as_str(), "Order reported to tracking");
        } else {
            warn!(
                order_id = %order.order_id,
                http_status = status.as_u16(),
                "Tracking service rejected order report: {}",
                body
            );
        }

        Ok(TrackingOutcome {
            success: status.is_success(),
            status: status.as_u16(),
            body,
        })
    }
}
