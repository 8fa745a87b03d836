use super::money::Money;
use crate::error::{CheckoutError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    #[default]
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The outcome a reconciliation wants to apply to a pending transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub state: TransactionState,
    pub gateway_transaction_id: Option<String>,
    pub needs_review: bool,
}

impl Resolution {
    pub fn new(state: TransactionState, gateway_transaction_id: impl Into<String>) -> Self {
        Self {
            state,
            gateway_transaction_id: Some(gateway_transaction_id.into()),
            needs_review: false,
        }
    }

    /// Forced failure that an operator has to look at.
    pub fn flagged_failure(gateway_transaction_id: impl Into<String>) -> Self {
        Self {
            state: TransactionState::Failed,
            gateway_transaction_id: Some(gateway_transaction_id.into()),
            needs_review: true,
        }
    }
}

/// One payment attempt, keyed by its public id.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub public_id: String,
    /// Gateway code of the payment method that created it.
    pub variant: String,
    pub amount: Money,
    pub state: TransactionState,
    pub gateway_transaction_id: Option<String>,
    #[serde(default)]
    pub needs_review: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn pending(public_id: impl Into<String>, variant: impl Into<String>, amount: Money) -> Self {
        Self {
            public_id: public_id.into(),
            variant: variant.into(),
            amount,
            state: TransactionState::Pending,
            gateway_transaction_id: None,
            needs_review: false,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Moves a pending transaction to a terminal state. Terminal transactions never move again.
    pub fn resolve(&mut self, resolution: &Resolution) -> Result<()> {
        if self.state.is_terminal() || !resolution.state.is_terminal() {
            return Err(CheckoutError::InvalidTransition {
                public_id: self.public_id.clone(),
                from: self.state,
                to: resolution.state,
            });
        }
        self.state = resolution.state;
        self.gateway_transaction_id = resolution.gateway_transaction_id.clone();
        self.needs_review = resolution.needs_review;
        self.resolved_at = Some(Utc::now());
        Ok(())
    }
}
