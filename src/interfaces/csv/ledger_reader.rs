use crate::application::replay::LedgerEvent;
use crate::domain::money::{Currency, Money, to_minor_units};
use crate::domain::notification::{ClaimedStatus, GatewayNotification};
use crate::domain::transaction::Transaction;
use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum RecordType {
    Created,
    Notification,
}

/// One raw ledger line, before validation.
#[derive(Debug, Deserialize)]
struct LedgerRecord {
    r#type: RecordType,
    public_id: String,
    #[serde(default)]
    variant: Option<String>,
    /// Kept as text so the decimal scale survives, `12.50` stays `12.50`.
    amount: String,
    currency: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    gateway_transaction_id: Option<String>,
}

impl TryFrom<LedgerRecord> for LedgerEvent {
    type Error = CheckoutError;

    fn try_from(record: LedgerRecord) -> Result<Self> {
        if record.public_id.is_empty() {
            return Err(CheckoutError::ValidationError(
                "public_id is required".to_string(),
            ));
        }
        let currency = Currency::new(&record.currency)?;
        let amount = Decimal::from_str(&record.amount).map_err(|_| {
            CheckoutError::ValidationError(format!("Invalid amount: {:?}", record.amount))
        })?;

        match record.r#type {
            RecordType::Created => {
                let variant = record
                    .variant
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| CheckoutError::MissingInput("variant".to_string()))?;
                let amount = Money::new(amount, currency)?;
                Ok(Self::Created(Transaction::pending(
                    record.public_id,
                    variant.to_ascii_uppercase(),
                    amount,
                )))
            }
            RecordType::Notification => {
                let status = record
                    .status
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| CheckoutError::MissingInput("status".to_string()))?;
                let gateway_transaction_id = record
                    .gateway_transaction_id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| record.public_id.clone());
                Ok(Self::Notification {
                    notification: GatewayNotification {
                        status: ClaimedStatus::from_gateway(&status),
                        amount_minor: to_minor_units(amount)?,
                        currency,
                        gateway_transaction_id,
                    },
                    public_id: record.public_id,
                })
            }
        }
    }
}

/// Reads ledger events from a CSV source.
///
/// Whitespace around fields is trimmed and short rows are accepted, so optional trailing
/// columns may be left off.
pub struct LedgerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LedgerReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and validates events; a bad row yields an error and reading continues.
    pub fn events(self) -> impl Iterator<Item = Result<LedgerEvent>> {
        self.reader.into_deserialize::<LedgerRecord>().map(|result| {
            result
                .map_err(CheckoutError::from)
                .and_then(LedgerEvent::try_from)
        })
    }
}
