use crate::config::ResolvedSettings;
use crate::domain::gateway::{OrderCreated, OrderRequest};
use crate::domain::money::Currency;
use crate::domain::notification::{ClaimedStatus, GatewayNotification};
use crate::domain::ports::GatewayClient;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::debug;

/// Builds the shared HTTP client used for every gateway call.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| CheckoutError::ConfigError(format!("failed to build HTTP client: {e}")))
}

/// Every JSON API response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error_code: Option<i64>,
    error_info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderStatus {
    status: String,
    amount: i64,
    currency: String,
    #[serde(default, deserialize_with = "string_or_number")]
    transaction_id: Option<String>,
}

/// The API sends transaction ids as numbers for some methods and strings for others.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

/// Client for the gateway's JSON order API.
pub struct HttpGatewayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpGatewayClient {
    /// Talks to the API of the environment in `settings`, using its API key.
    pub fn new(client: Client, settings: &ResolvedSettings) -> Self {
        Self {
            client,
            base_url: settings.environment.api_base_url().to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Points the client at another API root, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Resolves `segments` against the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            CheckoutError::ConfigError(format!("invalid gateway URL {:?}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                CheckoutError::ConfigError(format!("gateway URL cannot be a base: {:?}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn unwrap_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::GatewayUnavailable(e.to_string()))?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(CheckoutError::GatewayRejected {
                    code: i64::from(status.as_u16()),
                    message: body,
                });
            }
            Err(e) => return Err(CheckoutError::SerializationError(e)),
        };

        match envelope {
            Envelope {
                success: true,
                data: Some(data),
                ..
            } if status.is_success() => Ok(data),
            Envelope {
                error_code,
                error_info,
                ..
            } => Err(CheckoutError::GatewayRejected {
                code: error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                message: error_info.unwrap_or_else(|| format!("HTTP {status}")),
            }),
        }
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderCreated> {
        debug!(order_id = %request.order_id, gateway = %request.gateway, "creating order");
        let response = self
            .client
            .post(self.endpoint(&["orders"])?)
            .header("api_key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CheckoutError::GatewayUnavailable(e.to_string()))?;

        Self::unwrap_envelope(response).await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayNotification> {
        let response = self
            .client
            .get(self.endpoint(&["orders", order_id])?)
            .header("api_key", &self.api_key)
            .send()
            .await
            .map_err(|e| CheckoutError::GatewayUnavailable(e.to_string()))?;

        let order: OrderStatus = Self::unwrap_envelope(response).await?;
        debug!(order_id, status = %order.status, "fetched order status");
        let currency = Currency::new(&order.currency).map_err(|_| {
            CheckoutError::GatewayUnavailable(format!(
                "order status carries an invalid currency: {:?}",
                order.currency
            ))
        })?;
        Ok(GatewayNotification {
            status: ClaimedStatus::from_gateway(&order.status),
            amount_minor: order.amount,
            currency,
            gateway_transaction_id: order.transaction_id.unwrap_or_else(|| order_id.to_string()),
        })
    }
}
