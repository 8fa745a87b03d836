//! Maps an order and its customer onto the gateway's order request schema.

use crate::config::{Endpoints, ResolvedSettings, ShopInfo, TransactionType};
use crate::domain::address::split_street;
use crate::domain::gateway::{
    AlternateTaxTable, CartItem, CheckoutOptions, CustomerBlock, DefaultTaxTable, DeliveryBlock,
    GatewayInfo, GoogleAnalytics, OrderRequest, OrderType, PaymentOptions, PluginInfo,
    ShoppingCart, TaxRule, TaxTables,
};
use crate::domain::locale::locale_for_language;
use crate::domain::order::{Address, CheckoutInput, Customer, LineItem, Order};
use crate::domain::variant::VariantDescriptor;
use crate::error::{CheckoutError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub struct PayloadContext<'a> {
    pub variant: &'a VariantDescriptor,
    pub settings: &'a ResolvedSettings,
    pub endpoints: &'a Endpoints,
    pub shop: &'a ShopInfo,
}

impl PayloadContext<'_> {
    pub fn order_type(&self) -> OrderType {
        if self.variant.direct_debit && self.settings.transaction_type == TransactionType::Direct
        {
            OrderType::Direct
        } else {
            OrderType::Redirect
        }
    }

    /// The id the gateway knows the order by.
    pub fn order_reference(&self, public_id: &str) -> String {
        format!("{}{}", self.settings.prefix, public_id)
    }

    pub fn build(
        &self,
        order: &Order,
        customer: &Customer,
        input: &CheckoutInput,
    ) -> Result<OrderRequest> {
        let order_type = self.order_type();
        let order_id = self.order_reference(&order.public_id);
        let slug = self.variant.slug();

        let (birthday, bank_account) = match order_type {
            OrderType::Direct => (
                input.field("date_of_birth").map(format_date_of_birth).transpose()?,
                input.field("bank_account").map(str::to_string),
            ),
            OrderType::Redirect => (None, None),
        };

        Ok(OrderRequest {
            order_type,
            currency: order.total.currency().to_string(),
            amount: order.total.minor_units()?,
            gateway: self.variant.gateway_code.clone(),
            description: order
                .description
                .clone()
                .unwrap_or_else(|| format!("Order #{}", order.public_id)),
            items: items_summary(&order.items),
            days_active: self.settings.days_active,
            payment_options: PaymentOptions {
                notification_url: self.endpoints.notification_url(&slug, &order_id)?,
                redirect_url: self.endpoints.redirect_url(&slug, &order_id)?,
                cancel_url: self.endpoints.cancel_url(),
                close_window: false,
            },
            customer: customer_block(customer),
            delivery: delivery_block(&customer.shipping, &customer.email),
            shopping_cart: shopping_cart(&order.items)?,
            checkout_options: checkout_options(&order.items)?,
            gateway_info: GatewayInfo {
                birthday,
                bank_account,
                phone: customer.shipping.phone.clone(),
                email: customer.email.clone(),
                referrer: customer.referrer.clone(),
                user_agent: customer.user_agent.clone(),
            },
            google_analytics: self
                .settings
                .ga_account_id
                .clone()
                .map(|account| GoogleAnalytics { account }),
            plugin: PluginInfo {
                shop: self.shop.name.clone(),
                plugin_version: env!("CARGO_PKG_VERSION").to_string(),
                shop_version: self.shop.version.clone(),
            },
            order_id,
        })
    }
}

/// `dd-mm-yyyy` as typed by the customer, to the gateway's `yyyy-mm-dd`.
pub fn format_date_of_birth(input: &str) -> Result<String> {
    NaiveDate::parse_from_str(input.trim(), "%d-%m-%Y")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| {
            CheckoutError::ValidationError(format!(
                "date_of_birth must be formatted as dd-mm-yyyy, got {input:?}"
            ))
        })
}

pub fn items_summary(items: &[LineItem]) -> String {
    let mut html = String::from("<ul>");
    for item in items {
        html.push_str(&format!("<li>{} x {}</li>", item.quantity, item.name));
    }
    html.push_str("</ul>");
    html
}

fn customer_block(customer: &Customer) -> CustomerBlock {
    let billing = &customer.billing;
    let street = split_street(&billing.street);
    CustomerBlock {
        locale: locale_for_language(&customer.language).map(str::to_string),
        ip_address: customer.ip_address.clone(),
        forwarded_ip: customer.forwarded_ip.clone(),
        first_name: billing.first_name.clone(),
        last_name: billing.last_name.clone(),
        address1: street.street_name,
        house_number: street.house_number,
        zip_code: billing.zip_code.clone(),
        city: billing.city.clone(),
        country: billing.country.to_ascii_uppercase(),
        phone: billing.phone.clone(),
        email: customer.email.clone(),
        disable_send_email: false,
        user_agent: customer.user_agent.clone(),
        referrer: customer.referrer.clone(),
    }
}

fn delivery_block(shipping: &Address, email: &str) -> DeliveryBlock {
    let street = split_street(&shipping.street);
    DeliveryBlock {
        first_name: shipping.first_name.clone(),
        last_name: shipping.last_name.clone(),
        address1: street.street_name,
        house_number: street.house_number,
        zip_code: shipping.zip_code.clone(),
        city: shipping.city.clone(),
        country: shipping.country.to_ascii_uppercase(),
        phone: shipping.phone.clone(),
        email: email.to_string(),
    }
}

fn tax_table_name(rate: Decimal) -> Result<String> {
    rate.checked_mul(Decimal::ONE_HUNDRED)
        .map(|percent| format!("tax_{}", percent.normalize()))
        .ok_or_else(|| CheckoutError::ValidationError(format!("Tax rate out of range: {rate}")))
}

fn shopping_cart(items: &[LineItem]) -> Result<ShoppingCart> {
    let items = items
        .iter()
        .map(|item| {
            Ok(CartItem {
                name: item.name.clone(),
                description: item.description.clone().unwrap_or_default(),
                unit_price: item.unit_price.normalize().to_string(),
                quantity: item.quantity,
                merchant_item_id: item.merchant_item_id.clone(),
                tax_table_selector: tax_table_name(item.tax_rate)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ShoppingCart { items })
}

fn checkout_options(items: &[LineItem]) -> Result<CheckoutOptions> {
    let mut rates: Vec<Decimal> = items.iter().map(|item| item.tax_rate.normalize()).collect();
    rates.sort();
    rates.dedup();

    let default_rate = rates.last().copied().unwrap_or(Decimal::ZERO);
    let alternate = rates
        .into_iter()
        .map(|rate| {
            Ok(AlternateTaxTable {
                name: tax_table_name(rate)?,
                standalone: true,
                rules: vec![TaxRule {
                    rate: rate.to_string(),
                }],
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CheckoutOptions {
        tax_tables: TaxTables {
            default: DefaultTaxTable {
                shipping_taxed: true,
                rate: default_rate.to_string(),
            },
            alternate,
        },
    })
}
