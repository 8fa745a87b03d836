use super::processor::Processor;
use crate::config::{AppConfig, ResolvedSettings};
use crate::domain::ports::{GatewayClientRef, TransactionStoreRef};
use crate::error::{CheckoutError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// One processor per payment method, keyed by slug.
pub struct ProcessorRegistry {
    processors: BTreeMap<String, Arc<Processor>>,
    store: TransactionStoreRef,
}

impl ProcessorRegistry {
    /// Builds a processor for every variant in the configured catalog.
    ///
    /// `gateway_for` is called once per variant with that variant's resolved settings,
    /// since the API key and environment may differ between methods.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration, including the variant catalog.
    /// * `store` - The transaction store every processor shares.
    /// * `gateway_for` - Builds the gateway client for a variant's settings.
    pub fn build<F>(config: &AppConfig, store: TransactionStoreRef, gateway_for: F) -> Result<Self>
    where
        F: Fn(&ResolvedSettings) -> Result<GatewayClientRef>,
    {
        let endpoints = config.endpoints()?;
        let mut processors = BTreeMap::new();

        for variant in config.catalog().iter() {
            let slug = variant.slug();
            let settings = config.settings_for(&slug);
            let gateway = gateway_for(&settings)?;
            let processor = Processor::new(
                variant.clone(),
                settings,
                endpoints.clone(),
                config.shop.clone(),
                store.clone(),
                gateway,
            );
            debug!(
                slug = %slug,
                configured = processor.is_configured(),
                "registered payment method"
            );
            processors.insert(slug, Arc::new(processor));
        }

        Ok(Self { processors, store })
    }

    pub fn get(&self, slug: &str) -> Result<Arc<Processor>> {
        self.processors
            .get(&slug.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| CheckoutError::UnknownVariant(slug.to_string()))
    }

    /// Processors in slug order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Processor>> {
        self.processors.values()
    }

    pub fn store(&self) -> &TransactionStoreRef {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewaySettings;
    use crate::domain::gateway::{OrderCreated, OrderRequest};
    use crate::domain::notification::GatewayNotification;
    use crate::domain::ports::GatewayClient;
    use crate::infrastructure::in_memory::InMemoryTransactionStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct OfflineGateway;

    #[async_trait]
    impl GatewayClient for OfflineGateway {
        async fn create_order(&self, _request: &OrderRequest) -> Result<OrderCreated> {
            Err(CheckoutError::GatewayUnavailable("offline".to_string()))
        }

        async fn fetch_order(&self, _order_id: &str) -> Result<GatewayNotification> {
            Err(CheckoutError::GatewayUnavailable("offline".to_string()))
        }
    }

    fn offline(_settings: &ResolvedSettings) -> Result<GatewayClientRef> {
        Ok(Arc::new(OfflineGateway))
    }

    #[test]
    fn test_registry_covers_catalog() {
        let config = AppConfig::default();
        let registry =
            ProcessorRegistry::build(&config, Arc::new(InMemoryTransactionStore::new()), offline)
                .unwrap();

        assert_eq!(registry.len(), config.catalog().len());
        assert!(registry.get("FIETSENBON").is_ok());
        assert!(registry.get("idealqr").is_ok());
        assert!(matches!(
            registry.get("paypal"),
            Err(CheckoutError::UnknownVariant(slug)) if slug == "paypal"
        ));
    }

    #[test]
    fn test_einvoice_needs_prefix() {
        let mut config = AppConfig::default();
        config.connect.api_key = Some("key".to_string());
        let store: TransactionStoreRef = Arc::new(InMemoryTransactionStore::new());

        let registry = ProcessorRegistry::build(&config, store.clone(), offline).unwrap();
        assert!(!registry.get("einvoice").unwrap().is_configured());
        assert!(registry.get("fietsenbon").unwrap().is_configured());

        config.variants.insert(
            "einvoice".to_string(),
            GatewaySettings {
                prefix: Some("SHOP-".to_string()),
                ..Default::default()
            },
        );
        let registry = ProcessorRegistry::build(&config, store, offline).unwrap();
        assert!(registry.get("einvoice").unwrap().is_configured());
    }

    #[test]
    fn test_gateway_factory_sees_variant_settings() {
        let mut config = AppConfig::default();
        config.connect.api_key = Some("shared".to_string());
        config.variants.insert(
            "boekenbon".to_string(),
            GatewaySettings {
                api_key: Some("books".to_string()),
                ..Default::default()
            },
        );

        let seen = Mutex::new(Vec::new());
        ProcessorRegistry::build(&config, Arc::new(InMemoryTransactionStore::new()), |settings| {
            seen.lock().unwrap().push(settings.api_key.clone());
            offline(settings)
        })
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.iter().filter(|key| *key == "books").count(), 1);
        assert_eq!(seen.iter().filter(|key| *key == "shared").count(), seen.len() - 1);
    }
}
