//! Domain types and the ports the application layer talks through.

pub mod address;
pub mod gateway;
pub mod locale;
pub mod money;
pub mod notification;
pub mod order;
pub mod ports;
pub mod transaction;
pub mod variant;
