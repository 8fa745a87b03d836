//! Adapters behind the domain ports: transaction stores and the gateway HTTP client.

pub mod http_gateway;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
