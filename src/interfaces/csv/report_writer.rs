use crate::application::processor::Processor;
use crate::domain::transaction::{Transaction, TransactionState};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct TransactionRow<'a> {
    public_id: &'a str,
    variant: &'a str,
    amount: Decimal,
    currency: &'a str,
    state: TransactionState,
    gateway_transaction_id: &'a str,
    needs_review: bool,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            public_id: &tx.public_id,
            variant: &tx.variant,
            amount: tx.amount.amount(),
            currency: tx.amount.currency().as_str(),
            state: tx.state,
            gateway_transaction_id: tx.gateway_transaction_id.as_deref().unwrap_or_default(),
            needs_review: tx.needs_review,
        }
    }
}

#[derive(Debug, Serialize)]
struct VariantRow<'a> {
    slug: String,
    display_name: &'a str,
    gateway_code: &'a str,
    icon: &'a str,
    always_configured: bool,
    direct_debit: bool,
    configured: bool,
}

/// Writes CSV reports to any `Write` sink, usually stdout.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// One row per transaction: `public_id,variant,amount,currency,state,gateway_transaction_id,needs_review`.
    pub fn write_transactions(&mut self, transactions: &[Transaction]) -> Result<()> {
        if transactions.is_empty() {
            self.writer.write_record([
                "public_id",
                "variant",
                "amount",
                "currency",
                "state",
                "gateway_transaction_id",
                "needs_review",
            ])?;
        }
        for tx in transactions {
            self.writer.serialize(TransactionRow::from(tx))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// One row per payment method, with whether its settings make it usable.
    pub fn write_variants<'a>(
        &mut self,
        processors: impl IntoIterator<Item = &'a Arc<Processor>>,
    ) -> Result<()> {
        for processor in processors {
            let variant = processor.variant();
            self.writer.serialize(VariantRow {
                slug: variant.slug(),
                display_name: &variant.display_name,
                gateway_code: &variant.gateway_code,
                icon: &variant.icon_asset,
                always_configured: variant.always_configured,
                direct_debit: variant.direct_debit,
                configured: processor.is_configured(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Currency, Money};
    use crate::domain::transaction::Resolution;
    use rust_decimal_macros::dec;

    fn render(transactions: &[Transaction]) -> String {
        let mut out = Vec::new();
        ReportWriter::new(&mut out).write_transactions(transactions).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_transactions() {
        let amount = Money::new(dec!(12.50), Currency::new("EUR").unwrap()).unwrap();
        let mut resolved = Transaction::pending("1001", "FIETSENBON", amount.clone());
        resolved
            .resolve(&Resolution::flagged_failure("4051823"))
            .unwrap();
        let open = Transaction::pending("1002", "IDEALQR", amount);

        let output = render(&[resolved, open]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "public_id,variant,amount,currency,state,gateway_transaction_id,needs_review",
                "1001,FIETSENBON,12.50,EUR,failed,4051823,true",
                "1002,IDEALQR,12.50,EUR,pending,,false",
            ]
        );
    }

    #[test]
    fn test_empty_report_keeps_header() {
        assert_eq!(
            render(&[]).trim_end(),
            "public_id,variant,amount,currency,state,gateway_transaction_id,needs_review"
        );
    }
}
