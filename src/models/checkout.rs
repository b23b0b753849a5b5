use serde::{Deserialize, Serialize};

use crate::models::gateway::PixInformation;
use crate::models::tracking::TrackingParameters;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, alias = "zip", alias = "cep")]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub complement: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingInput {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub price: f64,
}

/// Body of `POST /api/pix/charge`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    #[serde(default)]
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Client-side total. Informational only, the charged amount is recomputed.
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub shipping: Option<ShippingInput>,
    #[serde(default)]
    pub tracking_params: Option<TrackingParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixInstructions {
    pub qrcode: String,
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeCreated {
    pub success: bool,
    pub transaction_id: String,
    pub order_id: String,
    pub pix: PixInstructions,
    pub order: OrderSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusView {
    pub transaction_id: String,
    pub order_id: Option<String>,
    pub status: String,
    pub payment_method: String,
    pub amount: f64,
    pub currency: String,
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_info: Option<PixInformation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub success: bool,
    pub event: String,
    pub order_id: String,
    pub status: String,
}
