//! Request and response shapes of the gateway's order API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Redirect,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub order_id: String,
    pub currency: String,
    /// Minor units.
    pub amount: i64,
    pub gateway: String,
    pub description: String,
    pub items: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_active: Option<u32>,
    pub payment_options: PaymentOptions,
    pub customer: CustomerBlock,
    pub delivery: DeliveryBlock,
    pub shopping_cart: ShoppingCart,
    pub checkout_options: CheckoutOptions,
    pub gateway_info: GatewayInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_analytics: Option<GoogleAnalytics>,
    pub plugin: PluginInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOptions {
    pub notification_url: String,
    pub redirect_url: String,
    pub cancel_url: String,
    pub close_window: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub ip_address: Option<String>,
    pub forwarded_ip: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub house_number: String,
    pub zip_code: String,
    pub city: String,
    pub country: String,
    pub phone: Option<String>,
    pub email: String,
    pub disable_send_email: bool,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryBlock {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub house_number: String,
    pub zip_code: String,
    pub city: String,
    pub country: String,
    pub phone: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingCart {
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub name: String,
    pub description: String,
    /// Decimal string in major units.
    pub unit_price: String,
    pub quantity: u32,
    pub merchant_item_id: String,
    pub tax_table_selector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutOptions {
    pub tax_tables: TaxTables,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxTables {
    pub default: DefaultTaxTable,
    pub alternate: Vec<AlternateTaxTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultTaxTable {
    pub shipping_taxed: bool,
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternateTaxTable {
    pub name: String,
    pub standalone: bool,
    pub rules: Vec<TaxRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxRule {
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayInfo {
    /// `yyyy-mm-dd`.
    pub birthday: Option<String>,
    pub bank_account: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleAnalytics {
    pub account: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginInfo {
    pub shop: String,
    pub plugin_version: String,
    pub shop_version: String,
}

/// What the gateway hands back for a freshly created order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderCreated {
    pub order_id: String,
    pub payment_url: String,
}
