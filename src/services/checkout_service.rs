use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::checkout::{
    AddressInput, CartItem, ChargeCreated, CheckoutRequest, CustomerInput, OrderSummary,
    PixInstructions, TransactionStatusView, WebhookAck,
};
use crate::models::gateway::{
    map_gateway_status, status_label, ChargeRequest, GatewayAddress, GatewayCustomer,
    GatewayProduct, TransactionLookup, WebhookEvent, WebhookEventKind,
};
use crate::models::tracking::{
    Commission, OrderStatus, TrackedCustomer, TrackedOrder, TrackedProduct, TrackingParameters,
};
use crate::services::gateway_client::{verify_webhook_token, GatewayError, PaymentGateway};
use crate::services::tracking_dispatcher::TrackingDispatcher;
use crate::utils::dates::{format_raw_tracking_date, format_tracking_date};
use crate::utils::money::{cart_total_cents, format_currency, from_cents, to_cents};
use crate::utils::normalize::{
    digits_only, normalize_document, normalize_phone, normalize_zip_code,
};
use crate::utils::order_id::generate_order_id;

pub const METADATA_SOURCE: &str = "pix-checkout";
const DEFAULT_COUNTRY: &str = "BR";
const DEFAULT_CURRENCY: &str = "BRL";
const PAYMENT_METHOD: &str = "pix";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("transactionId or orderId is required")]
    MissingLookup,
    #[error("invalid webhook token")]
    InvalidWebhookToken,
    #[error("malformed webhook payload: {0}")]
    MalformedWebhook(String),
}

/// Builds `<base>/api/webhooks/gateway`, keeping any path prefix of `base`.
pub fn build_callback_url(base: &str, webhook_path: &str) -> Result<String, url::ParseError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(webhook_path.trim_start_matches('/'))?.to_string())
}

fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, ServiceError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::Validation(message.to_string()))
}

struct ValidCustomer<'a> {
    name: &'a str,
    email: &'a str,
    document: &'a str,
    phone: &'a str,
}

fn validate_customer(customer: Option<&CustomerInput>) -> Result<ValidCustomer<'_>, ServiceError> {
    let customer = customer
        .ok_or_else(|| ServiceError::Validation("customer data is required".to_string()))?;

    Ok(ValidCustomer {
        name: required(&customer.name, "customer name is required")?,
        email: required(&customer.email, "customer email is required")?,
        document: required(&customer.document, "customer document is required")?,
        phone: required(&customer.phone, "customer phone is required")?,
    })
}

fn validate_items(items: &[CartItem]) -> Result<(), ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::Validation("cart has no items".to_string()));
    }
    for item in items {
        if item.quantity < 1 || item.quantity > i64::from(u32::MAX) {
            return Err(ServiceError::Validation(format!(
                "item {} has an invalid quantity",
                item.id
            )));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(ServiceError::Validation(format!(
                "item {} has an invalid price",
                item.id
            )));
        }
    }
    Ok(())
}

fn gateway_address(address: &AddressInput) -> GatewayAddress {
    let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();
    GatewayAddress {
        country: address
            .country
            .clone()
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        zip_code: normalize_zip_code(address.zip_code.as_deref().unwrap_or_default()),
        state: field(&address.state),
        city: field(&address.city),
        neighborhood: field(&address.neighborhood),
        street: field(&address.street),
        number: field(&address.number),
        complement: address.complement.clone().filter(|c| !c.trim().is_empty()),
    }
}

fn charge_metadata(params: Option<&TrackingParameters>) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("source".to_string(), Value::from(METADATA_SOURCE));
    if let Some(params) = params {
        for (name, value) in params.present() {
            metadata.insert(name.to_string(), Value::from(value));
        }
    }
    metadata
}

fn tracked_order_from_event(event: &WebhookEvent, status: &str) -> TrackedOrder {
    let tx = &event.transaction;
    let client = &event.client;

    TrackedOrder {
        order_id: tx.identifier.clone(),
        status: status.to_string(),
        payment_method: PAYMENT_METHOD.to_string(),
        customer: TrackedCustomer {
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.as_deref().map(normalize_phone),
            document: client
                .cpf
                .as_deref()
                .or(client.cnpj.as_deref())
                .map(digits_only),
            country: client
                .address
                .as_ref()
                .and_then(|a| a.country.clone())
                .or_else(|| Some(DEFAULT_COUNTRY.to_string())),
        },
        products: event
            .order_items
            .iter()
            .map(|item| TrackedProduct {
                id: item.product.id.clone(),
                name: item.product.name.clone(),
                plan_id: None,
                plan_name: None,
                quantity: item.quantity,
                price_in_cents: to_cents(item.price),
            })
            .collect(),
        commission: Commission::from_cents(
            to_cents(tx.amount),
            to_cents(tx.fee.unwrap_or_default()),
            tx.currency.clone(),
        ),
        tracking_parameters: event.track_props.clone(),
        created_at: format_raw_tracking_date(tx.created_at.as_deref()),
        approved_at: None,
        refunded_at: None,
    }
}

/// Orchestrates the three checkout flows: charge creation, status lookup and
/// gateway webhooks.
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    tracking: TrackingDispatcher,
    webhook_token: Option<String>,
    callback_url: Option<String>,
}

impl CheckoutService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        tracking: TrackingDispatcher,
        webhook_token: Option<String>,
        callback_url: Option<String>,
    ) -> Self {
        Self {
            gateway,
            tracking,
            webhook_token,
            callback_url,
        }
    }

    pub fn tracking(&self) -> &TrackingDispatcher {
        &self.tracking
    }

    pub async fn create_charge(&self, request: CheckoutRequest) -> Result<ChargeCreated, ServiceError> {
        let customer = validate_customer(request.customer.as_ref())?;
        validate_items(&request.items)?;

        let order_id = generate_order_id();

        let shipping_fee = request.shipping.as_ref().map(|s| s.price).unwrap_or_default();
        if !shipping_fee.is_finite() || shipping_fee < 0.0 {
            return Err(ServiceError::Validation("invalid shipping price".to_string()));
        }
        let amount_cents = cart_total_cents(
            request
                .items
                .iter()
                .map(|item| (item.price, item.quantity as u32)),
            shipping_fee,
        )
        .ok_or_else(|| ServiceError::Validation("cart total is too large".to_string()))?;
        if let Some(client_total) = request.total {
            if to_cents(client_total) != amount_cents {
                warn!(
                    order_id = %order_id,
                    client_total = %format_currency(to_cents(client_total)),
                    computed = %format_currency(amount_cents),
                    "Client total differs from cart, charging computed amount"
                );
            }
        }

        let document = normalize_document(customer.document).ok_or_else(|| {
            ServiceError::Validation("customer document must be a CPF with 11 digits".to_string())
        })?;
        let phone = normalize_phone(customer.phone);

        let charge_request = ChargeRequest {
            identifier: order_id.clone(),
            amount: from_cents(amount_cents),
            shipping_fee: (shipping_fee > 0.0).then_some(shipping_fee),
            extra_fee: None,
            discount: None,
            client: GatewayCustomer {
                name: customer.name.to_string(),
                email: customer.email.to_string(),
                phone: phone.clone(),
                cpf: document.clone(),
                address: request.address.as_ref().map(gateway_address),
            },
            products: request
                .items
                .iter()
                .map(|item| GatewayProduct {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity as u32,
                    price: item.price,
                })
                .collect(),
            metadata: Some(charge_metadata(request.tracking_params.as_ref())),
            callback_url: self.callback_url.clone(),
        };

        let charge = self.gateway.create_charge(&charge_request).await?;

        info!(
            order_id = %order_id,
            transaction_id = %charge.transaction_id,
            amount_cents,
            "Checkout charge created"
        );

        let currency = charge
            .order
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        // Charge already exists at the gateway; the report must not hold up the response.
        self.tracking.dispatch(TrackedOrder {
            order_id: order_id.clone(),
            status: OrderStatus::WaitingPayment.as_str().to_string(),
            payment_method: PAYMENT_METHOD.to_string(),
            customer: TrackedCustomer {
                name: customer.name.to_string(),
                email: customer.email.to_string(),
                phone: Some(phone),
                document: Some(document),
                country: request
                    .address
                    .as_ref()
                    .and_then(|a| a.country.clone())
                    .or_else(|| Some(DEFAULT_COUNTRY.to_string())),
            },
            products: request
                .items
                .iter()
                .map(|item| TrackedProduct {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    plan_id: None,
                    plan_name: None,
                    quantity: item.quantity as u32,
                    price_in_cents: to_cents(item.price),
                })
                .collect(),
            commission: Commission::from_cents(amount_cents, to_cents(charge.fee), currency),
            tracking_parameters: request.tracking_params.clone(),
            created_at: format_tracking_date(Some(Utc::now())),
            approved_at: None,
            refunded_at: None,
        });

        Ok(ChargeCreated {
            success: true,
            transaction_id: charge.transaction_id,
            order_id: order_id.clone(),
            pix: PixInstructions {
                qrcode: charge.pix.code,
                expires_at: charge.pix.expires_at,
            },
            order: OrderSummary {
                id: order_id,
                amount: from_cents(amount_cents),
            },
        })
    }

    pub async fn transaction_status(
        &self,
        transaction_id: Option<String>,
        order_id: Option<String>,
    ) -> Result<TransactionStatusView, ServiceError> {
        let lookup =
            TransactionLookup::from_parts(transaction_id, order_id).ok_or(ServiceError::MissingLookup)?;

        let tx = self.gateway.get_transaction(&lookup).await?;
        debug!(transaction_id = %tx.id, "Gateway status {}", tx.status);

        Ok(TransactionStatusView {
            status: status_label(&tx.status),
            transaction_id: tx.id,
            order_id: tx.client_identifier,
            payment_method: tx.payment_method,
            amount: tx.amount,
            currency: tx.currency,
            created_at: tx.created_at,
            paid_at: tx.payed_at,
            pix_info: tx.pix_information,
        })
    }

    pub fn handle_webhook(&self, body: &[u8]) -> Result<WebhookAck, ServiceError> {
        let raw: Value = serde_json::from_slice(body)
            .map_err(|e| ServiceError::MalformedWebhook(e.to_string()))?;

        // Token first: a forged payload is refused whatever its shape.
        let token = raw.get("token").and_then(Value::as_str);
        if !verify_webhook_token(self.webhook_token.as_deref(), token) {
            warn!(
                event = raw.get("event").and_then(serde_json::Value::as_str).unwrap_or("unknown"),
                "Webhook rejected: token mismatch"
            );
            return Err(ServiceError::InvalidWebhookToken);
        }

        let event: WebhookEvent = serde_json::from_value(raw)
            .map_err(|e| ServiceError::MalformedWebhook(e.to_string()))?;
        if self.webhook_token.is_none() {
            debug!("Webhook accepted without verification, no token configured");
        }

        let order_id = event.transaction.identifier.clone();
        info!(order_id = %order_id, event = %event.event, "Gateway webhook received");

        let reported = match event.kind() {
            WebhookEventKind::Paid => {
                let mut order = tracked_order_from_event(&event, "approved");
                order.approved_at = format_raw_tracking_date(event.transaction.payed_at.as_deref())
                    .or_else(|| format_tracking_date(Some(Utc::now())));
                Some(order)
            }
            WebhookEventKind::Canceled => Some(tracked_order_from_event(&event, "refused")),
            WebhookEventKind::Refunded => {
                let mut order = tracked_order_from_event(&event, "refunded");
                order.approved_at = format_raw_tracking_date(event.transaction.payed_at.as_deref());
                order.refunded_at = format_tracking_date(Some(Utc::now()));
                Some(order)
            }
            WebhookEventKind::Created => None,
            WebhookEventKind::Unknown => {
                info!(order_id = %order_id, "Ignoring unhandled webhook event {}", event.event);
                None
            }
        };

        let status = match reported {
            Some(order) => {
                let status = OrderStatus::from_alias(&order.status);
                self.tracking.dispatch(order);
                status
            }
            None => map_gateway_status(&event.transaction.status),
        };

        Ok(WebhookAck {
            success: true,
            event: event.event,
            order_id,
            status: status.as_str().to_string(),
        })
    }
}
