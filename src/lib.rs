//! PIX checkout backend: creates charges at the payment gateway, exposes
//! their status and relays gateway webhooks to the tracking service.

pub mod app;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;
