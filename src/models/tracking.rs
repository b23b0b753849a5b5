use serde::{Deserialize, Serialize};

/// Canonical order status understood by the tracking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    WaitingPayment,
    Paid,
    Refused,
    Refunded,
    Chargedback,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::WaitingPayment => "waiting_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Refused => "refused",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Chargedback => "chargedback",
        }
    }

    /// Accepts every spelling seen from callers, including legacy aliases.
    /// Unknown values fall back to `WaitingPayment`.
    pub fn from_alias(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "paid" | "approved" | "completed" => OrderStatus::Paid,
            "refused" | "canceled" | "cancelled" | "failed" | "rejected" => OrderStatus::Refused,
            "refunded" => OrderStatus::Refunded,
            "chargedback" | "chargeback" | "charged_back" => OrderStatus::Chargedback,
            _ => OrderStatus::WaitingPayment,
        }
    }
}

/// Marketing attribution fields forwarded from the storefront.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingParameters {
    pub src: Option<String>,
    pub sck: Option<String>,
    pub utm_source: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
}

impl TrackingParameters {
    /// Present fields as `(name, value)` pairs, in declaration order.
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("src", &self.src),
            ("sck", &self.sck),
            ("utm_source", &self.utm_source),
            ("utm_campaign", &self.utm_campaign),
            ("utm_medium", &self.utm_medium),
            ("utm_content", &self.utm_content),
            ("utm_term", &self.utm_term),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub document: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedProduct {
    pub id: String,
    pub name: String,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub quantity: u32,
    pub price_in_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub total_price_in_cents: i64,
    pub gateway_fee_in_cents: i64,
    pub user_commission_in_cents: i64,
    pub currency: String,
}

impl Commission {
    pub fn from_cents(total: i64, fee: i64, currency: impl Into<String>) -> Self {
        Self {
            total_price_in_cents: total,
            gateway_fee_in_cents: fee,
            user_commission_in_cents: (total - fee).max(0),
            currency: currency.into(),
        }
    }
}

/// What a caller hands the tracking client. `status` may be any alias
/// accepted by [`OrderStatus::from_alias`].
#[derive(Debug, Clone)]
pub struct TrackedOrder {
    pub order_id: String,
    pub status: String,
    pub payment_method: String,
    pub customer: TrackedCustomer,
    pub products: Vec<TrackedProduct>,
    pub commission: Commission,
    pub tracking_parameters: Option<TrackingParameters>,
    pub created_at: Option<String>,
    pub approved_at: Option<String>,
    pub refunded_at: Option<String>,
}

/// Wire shape posted to the tracking service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionReport {
    pub order_id: String,
    pub platform: String,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: Option<String>,
    pub approved_date: Option<String>,
    pub refunded_at: Option<String>,
    pub customer: TrackedCustomer,
    pub products: Vec<TrackedProduct>,
    pub tracking_parameters: TrackingParameters,
    pub commission: Commission,
    pub is_test: bool,
}

impl AttributionReport {
    pub fn from_order(order: &TrackedOrder, platform: &str) -> Self {
        Self {
            order_id: order.order_id.clone(),
            platform: platform.to_string(),
            payment_method: order.payment_method.clone(),
            status: OrderStatus::from_alias(&order.status),
            created_at: order.created_at.clone(),
            approved_date: order.approved_at.clone(),
            refunded_at: order.refunded_at.clone(),
            customer: order.customer.clone(),
            products: order.products.clone(),
            tracking_parameters: order.tracking_parameters.clone().unwrap_or_default(),
            commission: order.commission.clone(),
            is_test: false,
        }
    }
}
