use super::error::ApiError;
use crate::application::processor::CallbackReply;
use crate::application::registry::ProcessorRegistry;
use crate::domain::notification::NotificationKind;
use crate::domain::order::{CheckoutInput, Customer, Order};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub registry: ProcessorRegistry,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(registry: ProcessorRegistry) -> Self {
        Self {
            registry,
            start_time: Instant::now(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/payments/variants", get(list_variants))
        .route("/payments/{variant}/checkout", post(checkout))
        .route(
            "/payments/{variant}/return",
            get(payment_return).post(payment_return),
        )
        .with_state(state)
}

/// Serves until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(url = %format!("http://{addr}"), "listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VariantSummary {
    pub slug: String,
    pub display_name: String,
    pub gateway_code: String,
    pub icon: String,
    pub checkout_template: String,
    pub input_template: Option<String>,
    pub always_configured: bool,
    pub direct_debit: bool,
    pub configured: bool,
}

async fn list_variants(State(state): State<Arc<AppState>>) -> Json<Vec<VariantSummary>> {
    let variants = state
        .registry
        .iter()
        .map(|processor| {
            let variant = processor.variant();
            VariantSummary {
                slug: variant.slug(),
                display_name: variant.display_name.clone(),
                gateway_code: variant.gateway_code.clone(),
                icon: variant.icon_asset.clone(),
                checkout_template: variant.checkout_template.clone(),
                input_template: variant.input_template(),
                always_configured: variant.always_configured,
                direct_debit: variant.direct_debit,
                configured: processor.is_configured(),
            }
        })
        .collect();
    Json(variants)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub order: Order,
    pub customer: Customer,
    #[serde(default)]
    pub input: CheckoutInput,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub redirect_url: String,
}

async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(variant): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let processor = state.registry.get(&variant)?;
    let target = processor
        .initiate(&request.order, &request.customer, &request.input)
        .await?;
    Ok(Json(CheckoutResponse {
        redirect_url: target.url,
    }))
}

#[derive(Debug, Deserialize)]
struct ReturnQuery {
    transactionid: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    redirect: Option<String>,
}

async fn payment_return(
    State(state): State<Arc<AppState>>,
    Path(variant): Path<String>,
    Query(query): Query<ReturnQuery>,
) -> Result<Response, ApiError> {
    let processor = state.registry.get(&variant)?;
    let order_reference = query
        .transactionid
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("transactionid is required"))?;
    let kind = NotificationKind::from_query(query.kind.as_deref(), query.redirect.as_deref());

    match processor.handle_callback(order_reference, kind).await? {
        CallbackReply::Acknowledge => Ok((StatusCode::OK, "OK").into_response()),
        CallbackReply::Redirect(target) => Ok(Redirect::to(&target.url).into_response()),
    }
}
