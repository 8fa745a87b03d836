use super::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    /// Free-text street line, house number included.
    pub street: String,
    pub zip_code: String,
    pub city: String,
    /// ISO 3166-1 alpha-2.
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    /// Two-letter language code of the storefront session.
    pub language: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub forwarded_ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    pub billing: Address,
    pub shipping: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub merchant_item_id: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Fraction, e.g. `0.21`.
    #[serde(default)]
    pub tax_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub public_id: String,
    pub total: Money,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Customer input collected on the checkout page for direct-debit payments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutInput {
    #[serde(default)]
    pub bank_account: Option<String>,
    /// As entered, `dd-mm-yyyy`.
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

impl CheckoutInput {
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "bank_account" => self.bank_account.as_deref(),
            "date_of_birth" => self.date_of_birth.as_deref(),
            _ => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Where the caller must send the customer next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    pub url: String,
}
