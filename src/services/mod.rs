pub mod checkout_service;
pub mod gateway_client;
pub mod tracking_client;
pub mod tracking_dispatcher;

pub use checkout_service::{CheckoutService, ServiceError};
pub use gateway_client::{GatewayClient, GatewayError, PaymentGateway};
pub use tracking_client::{TrackingClient, TrackingError, TrackingOutcome, TrackingSink};
pub use tracking_dispatcher::TrackingDispatcher;
