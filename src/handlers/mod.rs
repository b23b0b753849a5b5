pub mod charge;
pub mod status;
pub mod webhook;
