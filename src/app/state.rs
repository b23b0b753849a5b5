use anyhow::Context;
use std::sync::Arc;
use tracing::warn;

use crate::app::config::Config;
use crate::app::routes::WEBHOOK_PATH;
use crate::services::checkout_service::build_callback_url;
use crate::services::{CheckoutService, GatewayClient, TrackingClient, TrackingDispatcher};

pub type AppState = Arc<CheckoutService>;

/// Wires the real HTTP collaborators from configuration.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let gateway = GatewayClient::new(&config.gateway).context("building gateway client")?;
    let tracking = TrackingClient::new(&config.tracking).context("building tracking client")?;

    let callback_url = config
        .public_base_url
        .as_deref()
        .map(|base| build_callback_url(base, WEBHOOK_PATH))
        .transpose()
        .context("PUBLIC_BASE_URL is not a valid URL")?;

    if callback_url.is_none() {
        warn!("No public base URL configured, charges will be created without a callback URL");
    }
    if config.gateway.public_key.is_none() || config.gateway.secret_key.is_none() {
        warn!("Gateway credentials missing, every charge request will fail");
    }
    if config.tracking.api_token.is_none() {
        warn!("Tracking api token missing, order reports will be dropped");
    }
    if config.gateway.webhook_token.is_none() {
        warn!("No webhook token configured, gateway webhooks are accepted WITHOUT verification");
    }

    Ok(Arc::new(CheckoutService::new(
        Arc::new(gateway),
        TrackingDispatcher::new(Arc::new(tracking)),
        config.gateway.webhook_token.clone(),
        callback_url,
    )))
}
