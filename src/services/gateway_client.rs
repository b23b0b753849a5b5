use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::app::config::GatewayConfig;
use crate::models::gateway::{
    extract_error, ChargeRequest, ChargeResponse, Transaction, TransactionLookup,
};

const PUBLIC_KEY_HEADER: &str = "x-public-key";
const SECRET_KEY_HEADER: &str = "x-secret-key";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway credentials are not configured")]
    MissingCredentials,
    #[error("payment gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("unexpected payment gateway response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError>;

    async fn get_transaction(
        &self,
        lookup: &TransactionLookup,
    ) -> Result<Transaction, GatewayError>;
}

/// HTTP client for the PIX gateway. One request per call, never retried.
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn credentials(&self) -> Result<(&str, &str), GatewayError> {
        match (
            self.config.public_key.as_deref(),
            self.config.secret_key.as_deref(),
        ) {
            (Some(public), Some(secret)) => Ok((public, secret)),
            _ => {
                error!("Gateway public/secret keys are missing from configuration");
                Err(GatewayError::MissingCredentials)
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let (code, message) = extract_error(&body);
            let message = message.unwrap_or_else(|| format!("HTTP {}", status));
            warn!(status = status.as_u16(), code = ?code, "Gateway rejected request: {}", message);
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to decode gateway response: {} (body: {})", e, body);
            GatewayError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, GatewayError> {
        let (public_key, secret_key) = self.credentials()?;

        debug!(order_id = %request.identifier, amount = request.amount, "Creating PIX charge");

        let response = self
            .client
            .post(self.endpoint("gateway/pix/receive"))
            .header(PUBLIC_KEY_HEADER, public_key)
            .header(SECRET_KEY_HEADER, secret_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(order_id = %request.identifier, "Gateway request failed: {}", e);
                GatewayError::from(e)
            })?;

        let charge: ChargeResponse = Self::read_response(response).await?;
        info!(
            order_id = %request.identifier,
            transaction_id = %charge.transaction_id,
            "PIX charge created with status {}",
            charge.status
        );
        Ok(charge)
    }

    async fn get_transaction(
        &self,
        lookup: &TransactionLookup,
    ) -> Result<Transaction, GatewayError> {
        let (public_key, secret_key) = self.credentials()?;
        let (param, value) = lookup.query_pair();

        let response = self
            .client
            .get(self.endpoint("gateway/transactions"))
            .query(&[(param, value)])
            .header(PUBLIC_KEY_HEADER, public_key)
            .header(SECRET_KEY_HEADER, secret_key)
            .send()
            .await
            .map_err(|e| {
                error!("Gateway lookup by {}={} failed: {}", param, value, e);
                GatewayError::from(e)
            })?;

        Self::read_response(response).await
    }
}

/// Webhook authenticity check. With no expected token configured every
/// webhook is accepted.
pub fn verify_webhook_token(expected: Option<&str>, received: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => received == Some(expected),
    }
}
