//! Application layer: checkout initiation, return handling and reconciliation.
//!
//! Every payment method runs through the same [`processor::Processor`]; the
//! [`registry::ProcessorRegistry`] builds one per catalog entry over a shared
//! transaction store.

pub mod payload;
pub mod processor;
pub mod reconciler;
pub mod registry;
pub mod replay;
