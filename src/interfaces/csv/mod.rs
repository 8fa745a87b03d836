//! CSV adapters for the `replay` and `variants` commands.

pub mod ledger_reader;
pub mod report_writer;
