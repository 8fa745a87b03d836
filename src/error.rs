use crate::domain::transaction::TransactionState;
use thiserror::Error;

/// Shown to customers whenever the gateway could not take the order.
pub const GENERIC_CUSTOMER_MESSAGE: &str = "An error occurred processing your transaction request, please try again using another payment method.";

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("Payment gateway rejected the request ({code}): {message}")]
    GatewayRejected { code: i64, message: String },
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),
    #[error("Transaction already exists: {0}")]
    DuplicateTransaction(String),
    #[error("Invalid transition for {public_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        public_id: String,
        from: TransactionState,
        to: TransactionState,
    },
    #[error("Payment method {0} is not configured")]
    NotConfigured(String),
    #[error("Unknown payment method: {0}")]
    UnknownVariant(String),
    #[error("{0} field is required")]
    MissingInput(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

impl CheckoutError {
    /// Text that is safe to show a customer. Internal details never leave this crate.
    pub fn customer_message(&self) -> String {
        match self {
            Self::GatewayUnavailable(_) | Self::GatewayRejected { .. } => {
                GENERIC_CUSTOMER_MESSAGE.to_string()
            }
            Self::MissingInput(_)
            | Self::ValidationError(_)
            | Self::NotConfigured(_)
            | Self::UnknownVariant(_)
            | Self::DuplicateTransaction(_) => self.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}
