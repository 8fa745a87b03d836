#![allow(dead_code)]

use async_trait::async_trait;
use checkout_connect::config::AppConfig;
use checkout_connect::domain::gateway::{OrderCreated, OrderRequest};
use checkout_connect::domain::money::{Currency, Money};
use checkout_connect::domain::notification::{ClaimedStatus, GatewayNotification};
use checkout_connect::domain::order::{Address, Customer, LineItem, Order};
use checkout_connect::domain::ports::GatewayClient;
use checkout_connect::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// In-process gateway that records every call and answers from a scripted order book.
#[derive(Default)]
pub struct RecordingGateway {
    pub created: Mutex<Vec<OrderRequest>>,
    pub fetched: Mutex<Vec<String>>,
    orders: Mutex<HashMap<String, GatewayNotification>>,
    unavailable: bool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call times out.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Scripts what `fetch_order` reports for `order_id`.
    pub fn set_status(&self, order_id: &str, status: &str, amount_minor: i64) {
        self.orders.lock().unwrap().insert(
            order_id.to_string(),
            GatewayNotification {
                status: ClaimedStatus::from_gateway(status),
                amount_minor,
                currency: Currency::new("EUR").unwrap(),
                gateway_transaction_id: format!("gw-{order_id}"),
            },
        );
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl GatewayClient for RecordingGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderCreated> {
        if self.unavailable {
            return Err(CheckoutError::GatewayUnavailable("operation timed out".to_string()));
        }
        self.created.lock().unwrap().push(request.clone());
        Ok(OrderCreated {
            order_id: request.order_id.clone(),
            payment_url: format!("https://pay.example/{}", request.order_id),
        })
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayNotification> {
        if self.unavailable {
            return Err(CheckoutError::GatewayUnavailable("operation timed out".to_string()));
        }
        self.fetched.lock().unwrap().push(order_id.to_string());
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| CheckoutError::GatewayRejected {
                code: 1006,
                message: "Invalid transaction ID".to_string(),
            })
    }
}

pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.public_url = "https://connect.example".to_string();
    config.shop_url = "https://shop.example".to_string();
    config.connect.api_key = Some("test-key".to_string());
    config
}

pub fn address(street: &str) -> Address {
    Address {
        first_name: "Jan".to_string(),
        last_name: "Jansen".to_string(),
        street: street.to_string(),
        zip_code: "1011AB".to_string(),
        city: "Amsterdam".to_string(),
        country: "NL".to_string(),
        phone: None,
    }
}

pub fn customer() -> Customer {
    Customer {
        email: "jan@example.com".to_string(),
        language: "nl".to_string(),
        ip_address: Some("10.0.0.1".to_string()),
        forwarded_ip: None,
        user_agent: None,
        referrer: None,
        billing: address("Kalverstraat 12"),
        shipping: address("Kalverstraat 12"),
    }
}

pub fn order(public_id: &str, amount: Decimal) -> Order {
    Order {
        public_id: public_id.to_string(),
        total: Money::new(amount, Currency::new("EUR").unwrap()).unwrap(),
        items: vec![LineItem {
            name: "Gift voucher".to_string(),
            description: None,
            merchant_item_id: "GV-1".to_string(),
            unit_price: amount,
            quantity: 1,
            tax_rate: Decimal::ZERO,
        }],
        description: None,
    }
}

pub fn write_ledger(path: &Path, rows: &[[&str; 7]]) -> std::io::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "type",
        "public_id",
        "variant",
        "amount",
        "currency",
        "status",
        "gateway_transaction_id",
    ])?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
