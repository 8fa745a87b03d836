use crate::error::{CheckoutError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 4217 currency code, always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(CheckoutError::ValidationError(format!(
                "Invalid currency code: {code:?}"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CheckoutError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts a major-unit amount to the integer minor units used on the wire.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| CheckoutError::ValidationError(format!("Amount out of range: {amount}")))
}

/// A positive amount in a given currency.
///
/// Deserialization goes through [`Money::new`], so stored and submitted amounts are checked
/// the same way as constructed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

#[derive(Deserialize)]
struct MoneyRepr {
    amount: Decimal,
    currency: Currency,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = CheckoutError;

    fn try_from(repr: MoneyRepr) -> Result<Self> {
        Self::new(repr.amount, repr.currency)
    }
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self> {
        if amount > Decimal::ZERO {
            Ok(Self { amount, currency })
        } else {
            Err(CheckoutError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn minor_units(&self) -> Result<i64> {
        to_minor_units(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_is_normalized() {
        let currency = Currency::new(" eur ").unwrap();
        assert_eq!(currency.as_str(), "EUR");
        assert!(Currency::new("EURO").is_err());
        assert!(Currency::new("E1R").is_err());
    }

    #[test]
    fn test_minor_units_round_half_away_from_zero() {
        let eur = Currency::new("EUR").unwrap();
        assert_eq!(Money::new(dec!(10.00), eur.clone()).unwrap().minor_units().unwrap(), 1000);
        assert_eq!(Money::new(dec!(0.015), eur.clone()).unwrap().minor_units().unwrap(), 2);
        assert_eq!(Money::new(dec!(19.994), eur).unwrap().minor_units().unwrap(), 1999);
    }

    #[test]
    fn test_money_must_be_positive() {
        let eur = Currency::new("EUR").unwrap();
        assert!(matches!(
            Money::new(dec!(0), eur.clone()),
            Err(CheckoutError::ValidationError(_))
        ));
        assert!(Money::new(dec!(-1.0), eur).is_err());
    }

    #[test]
    fn test_money_deserialize_rejects_non_positive() {
        for amount in ["-5.00", "0"] {
            let json = format!(r#"{{"amount":"{amount}","currency":"EUR"}}"#);
            let parsed: std::result::Result<Money, _> = serde_json::from_str(&json);
            assert!(parsed.is_err(), "{amount} should be rejected");
        }

        let parsed: Money = serde_json::from_str(r#"{"amount":"12.50","currency":"eur"}"#).unwrap();
        assert_eq!(parsed.amount(), dec!(12.50));
        assert_eq!(parsed.currency().as_str(), "EUR");
    }

    #[test]
    fn test_minor_units_overflow_is_an_error() {
        assert!(matches!(
            to_minor_units(Decimal::MAX),
            Err(CheckoutError::ValidationError(_))
        ));
        // Fits in a Decimal after scaling but not in an i64.
        assert!(to_minor_units(dec!(100000000000000000000)).is_err());
    }

    #[test]
    fn test_currency_serde_roundtrip_rejects_garbage() {
        let parsed: std::result::Result<Currency, _> = serde_json::from_str("\"usd\"");
        assert_eq!(parsed.unwrap().as_str(), "USD");
        let parsed: std::result::Result<Currency, _> = serde_json::from_str("\"dollars\"");
        assert!(parsed.is_err());
    }
}
