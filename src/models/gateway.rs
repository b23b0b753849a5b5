//! Wire shapes of the PIX payment gateway: charge creation, transaction
//! lookup and the webhook event it posts back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::tracking::{OrderStatus, TrackingParameters};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayAddress {
    pub country: String,
    pub zip_code: String,
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    pub street: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Individual taxpayer id, digits only.
    pub cpf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<GatewayAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayProduct {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    pub identifier: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub client: GatewayCustomer,
    pub products: Vec<GatewayProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeOrder {
    pub id: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixData {
    pub code: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeResponse {
    pub transaction_id: String,
    pub status: String,
    #[serde(default)]
    pub fee: f64,
    #[serde(default)]
    pub order: ChargeOrder,
    pub pix: PixData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixInformation {
    #[serde(default)]
    pub end_to_end_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub client_identifier: Option<String>,
    pub status: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub payed_at: Option<String>,
    #[serde(default)]
    pub pix_information: Option<PixInformation>,
}

/// Which identifier a transaction lookup goes by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionLookup {
    TransactionId(String),
    OrderId(String),
}

impl TransactionLookup {
    /// Prefers the gateway transaction id when both are given. Blank values count as absent.
    pub fn from_parts(transaction_id: Option<String>, order_id: Option<String>) -> Option<Self> {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        non_blank(transaction_id)
            .map(TransactionLookup::TransactionId)
            .or_else(|| non_blank(order_id).map(TransactionLookup::OrderId))
    }

    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            TransactionLookup::TransactionId(id) => ("id", id),
            TransactionLookup::OrderId(id) => ("clientIdentifier", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventKind {
    Created,
    Paid,
    Canceled,
    Refunded,
    Unknown,
}

impl WebhookEventKind {
    pub fn parse(event: &str) -> Self {
        let event = event.trim().to_ascii_uppercase();
        match event.strip_prefix("TRANSACTION_").unwrap_or(event.as_str()) {
            "CREATED" => WebhookEventKind::Created,
            "PAID" => WebhookEventKind::Paid,
            "CANCELED" | "CANCELLED" => WebhookEventKind::Canceled,
            "REFUNDED" => WebhookEventKind::Refunded,
            _ => WebhookEventKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebhookAddress {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookClient {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub address: Option<WebhookAddress>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookTransaction {
    pub id: String,
    pub identifier: String,
    pub status: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub amount: f64,
    #[serde(default)]
    pub fee: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub payed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookProduct {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookOrderItem {
    #[serde(default)]
    pub id: Option<String>,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub product: WebhookProduct,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub token: Option<String>,
    pub client: WebhookClient,
    pub transaction: WebhookTransaction,
    #[serde(default)]
    pub order_items: Vec<WebhookOrderItem>,
    #[serde(default)]
    pub track_props: Option<TrackingParameters>,
}

impl WebhookEvent {
    pub fn kind(&self) -> WebhookEventKind {
        WebhookEventKind::parse(&self.event)
    }
}

fn default_payment_method() -> String {
    "PIX".to_string()
}

fn default_currency() -> String {
    "BRL".to_string()
}

fn default_quantity() -> u32 {
    1
}

/// Gateway status vocabulary mapped onto [`OrderStatus`]. Unknown values stay
/// `WaitingPayment`.
pub fn map_gateway_status(status: &str) -> OrderStatus {
    match status.trim().to_ascii_uppercase().as_str() {
        "COMPLETED" => OrderStatus::Paid,
        "PENDING" => OrderStatus::WaitingPayment,
        "FAILED" | "REJECTED" | "CANCELED" => OrderStatus::Refused,
        "REFUNDED" => OrderStatus::Refunded,
        "CHARGED_BACK" => OrderStatus::Chargedback,
        _ => OrderStatus::WaitingPayment,
    }
}

/// Status label returned by the status endpoint: `paid` for settled
/// transactions, the gateway's own status lower-cased otherwise.
pub fn status_label(status: &str) -> String {
    match map_gateway_status(status) {
        OrderStatus::Paid => OrderStatus::Paid.as_str().to_string(),
        _ => status.to_ascii_lowercase(),
    }
}

/// Pulls `(code, message)` out of a gateway error body. `message` may be a
/// string or a list of strings.
pub fn extract_error(body: &str) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return (None, None);
    };

    let code = value
        .get("errorCode")
        .or_else(|| value.get("code"))
        .and_then(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    let message = match value.get("message").or_else(|| value.get("error")) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(parts)) => {
            let joined = parts
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    };

    (code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_gateway_status_mapping() {
        assert_eq!(map_gateway_status("COMPLETED"), OrderStatus::Paid);
        assert_eq!(map_gateway_status("PENDING"), OrderStatus::WaitingPayment);
        assert_eq!(map_gateway_status("FAILED"), OrderStatus::Refused);
        assert_eq!(map_gateway_status("REJECTED"), OrderStatus::Refused);
        assert_eq!(map_gateway_status("CANCELED"), OrderStatus::Refused);
        assert_eq!(map_gateway_status("REFUNDED"), OrderStatus::Refunded);
        assert_eq!(map_gateway_status("CHARGED_BACK"), OrderStatus::Chargedback);
        assert_eq!(map_gateway_status("SOMETHING_NEW"), OrderStatus::WaitingPayment);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label("COMPLETED"), "paid");
        assert_eq!(status_label("PENDING"), "pending");
        assert_eq!(status_label("CHARGED_BACK"), "charged_back");
    }

    #[test]
    fn test_customer_serializes_cpf() {
        let customer = GatewayCustomer {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            phone: "11987654321".to_string(),
            cpf: "12345678901".to_string(),
            address: None,
        };
        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["cpf"], "12345678901");
        assert!(value.get("document").is_none());
        assert!(value.get("address").is_none());
    }

    #[test]
    fn test_lookup_prefers_transaction_id() {
        assert_eq!(
            TransactionLookup::from_parts(Some("tx".into()), Some("ord".into())),
            Some(TransactionLookup::TransactionId("tx".into()))
        );
        assert_eq!(
            TransactionLookup::from_parts(Some("  ".into()), Some("ord".into())),
            Some(TransactionLookup::OrderId("ord".into()))
        );
        assert_eq!(TransactionLookup::from_parts(None, None), None);
        assert_eq!(
            TransactionLookup::OrderId("ORD-1".into()).query_pair(),
            ("clientIdentifier", "ORD-1")
        );
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(WebhookEventKind::parse("TRANSACTION_PAID"), WebhookEventKind::Paid);
        assert_eq!(WebhookEventKind::parse("paid"), WebhookEventKind::Paid);
        assert_eq!(WebhookEventKind::parse("TRANSACTION_CANCELED"), WebhookEventKind::Canceled);
        assert_eq!(WebhookEventKind::parse("TRANSACTION_REFUNDED"), WebhookEventKind::Refunded);
        assert_eq!(WebhookEventKind::parse("TRANSACTION_CREATED"), WebhookEventKind::Created);
        assert_eq!(WebhookEventKind::parse("TRANSACTION_DISPUTED"), WebhookEventKind::Unknown);
    }

    #[test]
    fn test_extract_error() {
        let body = json!({"statusCode": 400, "errorCode": "INVALID_CPF", "message": "CPF inválido"});
        assert_eq!(
            extract_error(&body.to_string()),
            (Some("INVALID_CPF".to_string()), Some("CPF inválido".to_string()))
        );

        let body = json!({"message": ["amount must be positive", "client.email is required"]});
        assert_eq!(
            extract_error(&body.to_string()).1.as_deref(),
            Some("amount must be positive; client.email is required")
        );

        assert_eq!(extract_error("<html>502</html>"), (None, None));
    }

    #[test]
    fn test_webhook_event_defaults() {
        let event: WebhookEvent = serde_json::from_value(json!({
            "event": "TRANSACTION_PAID",
            "client": {"name": "Maria", "email": "maria@example.com"},
            "transaction": {
                "id": "tx_1",
                "identifier": "ORD-1",
                "status": "COMPLETED",
                "amount": 25.0
            }
        }))
        .unwrap();

        assert_eq!(event.kind(), WebhookEventKind::Paid);
        assert_eq!(event.transaction.currency, "BRL");
        assert_eq!(event.transaction.payment_method, "PIX");
        assert!(event.order_items.is_empty());
        assert!(event.token.is_none());
    }

    proptest! {
        #[test]
        fn gateway_status_mapping_is_total(status in ".*") {
            let _ = map_gateway_status(&status);
            prop_assert!(!status_label(&status).is_empty() || status.is_empty());
        }
    }
}
