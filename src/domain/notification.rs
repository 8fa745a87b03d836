use super::money::Currency;
use serde::{Deserialize, Serialize};

/// Status the gateway claims for an order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ClaimedStatus {
    Completed,
    Failed,
    Cancelled,
    Pending,
}

impl ClaimedStatus {
    /// Maps a raw gateway order status. Anything not final stays pending.
    pub fn from_gateway(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" | "shipped" => Self::Completed,
            "declined" | "void" | "expired" | "chargedback" => Self::Failed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

/// A verified status report for one gateway order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayNotification {
    pub status: ClaimedStatus,
    pub amount_minor: i64,
    pub currency: Currency,
    pub gateway_transaction_id: String,
}

/// Which callback delivered the notification.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NotificationKind {
    /// Server-to-server notification (`type=initial`).
    Initial,
    /// Customer's browser coming back from the hosted page (`redirect=true`).
    Redirect,
}

impl NotificationKind {
    pub fn from_query(kind: Option<&str>, redirect: Option<&str>) -> Self {
        match (kind, redirect) {
            (_, Some(flag)) if flag.eq_ignore_ascii_case("true") || flag == "1" => Self::Redirect,
            (Some(kind), _) if kind.eq_ignore_ascii_case("redirect") => Self::Redirect,
            _ => Self::Initial,
        }
    }
}
