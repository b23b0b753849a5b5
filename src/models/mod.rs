pub mod checkout;
pub mod gateway;
pub mod tracking;
