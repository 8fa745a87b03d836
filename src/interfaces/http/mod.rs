//! Inbound HTTP: storefront checkout and the gateway's return/notification callbacks.

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, router, serve};
