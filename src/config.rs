use crate::domain::variant::{VariantCatalog, VariantDescriptor};
use crate::error::{CheckoutError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const LIVE_API_URL: &str = "https://api.multisafepay.com/v1/json/";
pub const TEST_API_URL: &str = "https://testapi.multisafepay.com/v1/json/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Environment {
    #[default]
    Test,
    Live,
}

impl Environment {
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Self::Test => TEST_API_URL,
            Self::Live => LIVE_API_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "0" => Ok(Self::Test),
            "live" | "1" => Ok(Self::Live),
            other => Err(CheckoutError::ConfigError(format!(
                "unknown environment {other:?}"
            ))),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = CheckoutError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Test => "test".to_string(),
            Environment::Live => "live".to_string(),
        }
    }
}

/// How the customer pays: via the hosted page, or directly with bank account details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransactionType {
    #[default]
    Redirect,
    Direct,
}

impl FromStr for TransactionType {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redirect" | "0" => Ok(Self::Redirect),
            "direct" | "1" => Ok(Self::Direct),
            other => Err(CheckoutError::ConfigError(format!(
                "unknown transaction_type {other:?}"
            ))),
        }
    }
}

impl TryFrom<String> for TransactionType {
    type Error = CheckoutError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TransactionType> for String {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Redirect => "redirect".to_string(),
            TransactionType::Direct => "direct".to_string(),
        }
    }
}

/// Gateway settings as stored by the shop. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub api_key: Option<String>,
    pub environment: Option<Environment>,
    pub prefix: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub days_active: Option<u32>,
    pub ga_account_id: Option<String>,
}

/// Settings for one variant after merging its overrides over the shared record.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub api_key: String,
    pub environment: Environment,
    pub prefix: String,
    pub transaction_type: TransactionType,
    pub days_active: Option<u32>,
    pub ga_account_id: Option<String>,
}

impl ResolvedSettings {
    pub fn resolve(shared: &GatewaySettings, overrides: Option<&GatewaySettings>) -> Self {
        fn pick<T: Clone>(
            overrides: Option<&GatewaySettings>,
            shared: &GatewaySettings,
            field: impl Fn(&GatewaySettings) -> &Option<T>,
        ) -> Option<T> {
            overrides
                .and_then(|o| field(o).clone())
                .or_else(|| field(shared).clone())
        }

        Self {
            api_key: pick(overrides, shared, |s| &s.api_key).unwrap_or_default(),
            environment: pick(overrides, shared, |s| &s.environment).unwrap_or_default(),
            prefix: pick(overrides, shared, |s| &s.prefix).unwrap_or_default(),
            transaction_type: pick(overrides, shared, |s| &s.transaction_type)
                .unwrap_or_default(),
            days_active: pick(overrides, shared, |s| &s.days_active),
            ga_account_id: pick(overrides, shared, |s| &s.ga_account_id)
                .filter(|id| !id.trim().is_empty()),
        }
    }

    /// Whether a named setting carries a usable value.
    pub fn has_setting(&self, name: &str) -> bool {
        match name {
            "api_key" => !self.api_key.trim().is_empty(),
            "prefix" => !self.prefix.trim().is_empty(),
            "days_active" => self.days_active.is_some(),
            "ga_account_id" => self.ga_account_id.is_some(),
            "environment" | "transaction_type" => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopInfo {
    pub name: String,
    pub version: String,
}

impl Default for ShopInfo {
    fn default() -> Self {
        Self {
            name: "checkout-connect".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Public URLs handed to the gateway and to customers.
#[derive(Debug, Clone)]
pub struct Endpoints {
    public_url: String,
    shop_url: String,
}

impl Endpoints {
    pub fn new(public_url: &str, shop_url: &str) -> Result<Self> {
        for url in [public_url, shop_url] {
            Url::parse(url)
                .map_err(|e| CheckoutError::ConfigError(format!("invalid URL {url:?}: {e}")))?;
        }
        Ok(Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            shop_url: shop_url.trim_end_matches('/').to_string(),
        })
    }

    fn build(base: String, params: &[(&str, &str)]) -> Result<String> {
        Url::parse_with_params(&base, params)
            .map(String::from)
            .map_err(|e| CheckoutError::ConfigError(format!("invalid URL {base:?}: {e}")))
    }

    pub fn notification_url(&self, slug: &str, order_id: &str) -> Result<String> {
        Self::build(
            format!("{}/payments/{slug}/return", self.public_url),
            &[("transactionid", order_id), ("type", "initial")],
        )
    }

    pub fn redirect_url(&self, slug: &str, order_id: &str) -> Result<String> {
        Self::build(
            format!("{}/payments/{slug}/return", self.public_url),
            &[("transactionid", order_id), ("redirect", "true")],
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/checkout", self.shop_url)
    }

    pub fn completion_url(&self, public_id: &str) -> Result<String> {
        Self::build(
            format!("{}/checkout/complete", self.shop_url),
            &[("order_id", public_id)],
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// Base URL the gateway can reach us on.
    pub public_url: String,
    pub shop_url: String,
    pub db_path: Option<PathBuf>,
    pub gateway_timeout_secs: u64,
    pub shop: ShopInfo,
    /// Shared "Connect" record every variant falls back to.
    pub connect: GatewaySettings,
    /// Per-variant overrides keyed by slug.
    pub variants: HashMap<String, GatewaySettings>,
    pub extra_variants: Vec<VariantDescriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            public_url: "http://localhost:8080".to_string(),
            shop_url: "http://localhost:8080".to_string(),
            db_path: None,
            gateway_timeout_secs: 30,
            shop: ShopInfo::default(),
            connect: GatewaySettings::default(),
            variants: HashMap::new(),
            extra_variants: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Reads the optional JSON file, then applies `CHECKOUT_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = var("CHECKOUT_LISTEN_ADDR") {
            self.listen_addr = addr
                .parse()
                .map_err(|_| CheckoutError::ConfigError(format!("invalid listen address {addr:?}")))?;
        }
        if let Some(url) = var("CHECKOUT_PUBLIC_URL") {
            self.public_url = url;
        }
        if let Some(url) = var("CHECKOUT_SHOP_URL") {
            self.shop_url = url;
        }
        if let Some(path) = var("CHECKOUT_DB_PATH") {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(key) = var("CHECKOUT_API_KEY") {
            self.connect.api_key = Some(key);
        }
        if let Some(env) = var("CHECKOUT_ENVIRONMENT") {
            self.connect.environment = Some(env.parse()?);
        }
        if let Some(secs) = var("CHECKOUT_GATEWAY_TIMEOUT_SECS") {
            self.gateway_timeout_secs = secs
                .parse()
                .map_err(|_| CheckoutError::ConfigError(format!("invalid timeout {secs:?}")))?;
        }
        Ok(())
    }

    pub fn catalog(&self) -> VariantCatalog {
        let mut catalog = VariantCatalog::builtin();
        catalog.extend(self.extra_variants.iter().cloned());
        catalog
    }

    pub fn settings_for(&self, slug: &str) -> ResolvedSettings {
        ResolvedSettings::resolve(&self.connect, self.variants.get(slug))
    }

    pub fn endpoints(&self) -> Result<Endpoints> {
        Endpoints::new(&self.public_url, &self.shop_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_override_wins() {
        let shared = GatewaySettings {
            api_key: Some("shared-key".to_string()),
            prefix: Some("SHOP-".to_string()),
            days_active: Some(30),
            ..Default::default()
        };
        let overrides = GatewaySettings {
            api_key: Some("einvoice-key".to_string()),
            transaction_type: Some(TransactionType::Direct),
            ..Default::default()
        };

        let resolved = ResolvedSettings::resolve(&shared, Some(&overrides));
        assert_eq!(resolved.api_key, "einvoice-key");
        assert_eq!(resolved.prefix, "SHOP-");
        assert_eq!(resolved.days_active, Some(30));
        assert_eq!(resolved.transaction_type, TransactionType::Direct);
        assert_eq!(resolved.environment, Environment::Test);
    }

    #[test]
    fn test_missing_settings() {
        let resolved = ResolvedSettings::resolve(&GatewaySettings::default(), None);
        assert!(!resolved.has_setting("api_key"));
        assert!(!resolved.has_setting("prefix"));
        assert!(resolved.has_setting("environment"));
        assert!(!resolved.has_setting("no_such_setting"));
    }

    #[test]
    fn test_legacy_flag_values() {
        let settings: GatewaySettings =
            serde_json::from_str(r#"{"environment": "1", "transaction_type": "1"}"#).unwrap();
        assert_eq!(settings.environment, Some(Environment::Live));
        assert_eq!(settings.transaction_type, Some(TransactionType::Direct));
        assert_eq!(Environment::Live.api_base_url(), LIVE_API_URL);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CHECKOUT_API_KEY", "from-env"),
            ("CHECKOUT_ENVIRONMENT", "live"),
            ("CHECKOUT_LISTEN_ADDR", "127.0.0.1:9000"),
            ("CHECKOUT_PUBLIC_URL", ""),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.connect.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.connect.environment, Some(Environment::Live));
        assert_eq!(config.listen_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.public_url, "http://localhost:8080");
    }

    #[test]
    fn test_bad_env_value_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "CHECKOUT_ENVIRONMENT").then(|| "staging".to_string())
        });
        assert!(matches!(result, Err(CheckoutError::ConfigError(_))));
    }

    #[test]
    fn test_callback_urls() {
        let endpoints = Endpoints::new("https://pay.example.com/", "https://shop.example.com").unwrap();
        assert_eq!(
            endpoints.notification_url("fietsenbon", "SHOP-1001").unwrap(),
            "https://pay.example.com/payments/fietsenbon/return?transactionid=SHOP-1001&type=initial"
        );
        assert_eq!(
            endpoints.redirect_url("fietsenbon", "SHOP-1001").unwrap(),
            "https://pay.example.com/payments/fietsenbon/return?transactionid=SHOP-1001&redirect=true"
        );
        assert_eq!(endpoints.cancel_url(), "https://shop.example.com/checkout");
        assert_eq!(
            endpoints.completion_url("1001").unwrap(),
            "https://shop.example.com/checkout/complete?order_id=1001"
        );
        assert!(Endpoints::new("not a url", "https://shop.example.com").is_err());
    }

    #[test]
    fn test_config_file_parses() {
        let json = r#"{
            "public_url": "https://pay.example.com",
            "connect": {"api_key": "k", "environment": "live"},
            "variants": {"einvoice": {"prefix": "EI-"}},
            "extra_variants": [{
                "display_name": "Yourgift",
                "gateway_code": "YOURGIFT",
                "icon_asset": "msp_yourgift.png",
                "settings_template": "yourgift/config.html",
                "always_configured": true
            }]
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.gateway_timeout_secs, 30);
        assert_eq!(config.settings_for("einvoice").prefix, "EI-");
        assert_eq!(config.settings_for("einvoice").api_key, "k");
        assert!(config.catalog().get("yourgift").is_some());
    }
}
