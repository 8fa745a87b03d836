use super::payload::PayloadContext;
use super::reconciler::{ReconcileResult, Reconciler};
use crate::config::{Endpoints, ResolvedSettings, ShopInfo};
use crate::domain::gateway::OrderType;
use crate::domain::notification::{GatewayNotification, NotificationKind};
use crate::domain::order::{CheckoutInput, Customer, Order, RedirectTarget};
use crate::domain::ports::{GatewayClientRef, TransactionStoreRef};
use crate::domain::transaction::{Transaction, TransactionState};
use crate::domain::variant::VariantDescriptor;
use crate::error::{CheckoutError, Result};
use tracing::{info, instrument, warn};

const DIRECT_DEBIT_FIELDS: [&str; 2] = ["bank_account", "date_of_birth"];

/// What the HTTP layer should answer to a gateway callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackReply {
    /// Plain `OK`, which stops the gateway from redelivering.
    Acknowledge,
    Redirect(RedirectTarget),
}

/// Checkout and return handling for one payment method.
///
/// All variants share this implementation; the descriptor and resolved settings are the
/// only per-variant inputs.
pub struct Processor {
    variant: VariantDescriptor,
    settings: ResolvedSettings,
    endpoints: Endpoints,
    shop: ShopInfo,
    reconciler: Reconciler,
    gateway: GatewayClientRef,
}

impl Processor {
    /// Creates a processor for one payment variant.
    ///
    /// # Arguments
    ///
    /// * `variant` - The payment method this processor handles.
    /// * `settings` - Credentials and mode, after per-variant overrides.
    /// * `endpoints` - Public URLs used for notification and redirects.
    /// * `shop` - Shop details sent along with each order.
    /// * `store` - The shared transaction store.
    /// * `gateway` - Client for the gateway's order API.
    pub fn new(
        variant: VariantDescriptor,
        settings: ResolvedSettings,
        endpoints: Endpoints,
        shop: ShopInfo,
        store: TransactionStoreRef,
        gateway: GatewayClientRef,
    ) -> Self {
        Self {
            variant,
            settings,
            endpoints,
            shop,
            reconciler: Reconciler::new(store),
            gateway,
        }
    }

    pub fn variant(&self) -> &VariantDescriptor {
        &self.variant
    }

    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    fn payload_context(&self) -> PayloadContext<'_> {
        PayloadContext {
            variant: &self.variant,
            settings: &self.settings,
            endpoints: &self.endpoints,
            shop: &self.shop,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.variant.always_configured
            || (self.settings.has_setting("api_key")
                && self
                    .variant
                    .required_fields
                    .iter()
                    .all(|field| self.settings.has_setting(field)))
    }

    /// Missing checkout fields; only the direct sub-mode asks for any.
    pub fn input_errors(&self, input: &CheckoutInput) -> Vec<String> {
        if self.payload_context().order_type() != OrderType::Direct {
            return Vec::new();
        }
        DIRECT_DEBIT_FIELDS
            .into_iter()
            .filter(|field| input.field(field).is_none())
            .map(str::to_string)
            .collect()
    }

    /// Maps the gateway's order id back to our public id.
    pub fn public_id_from_reference<'a>(&self, reference: &'a str) -> &'a str {
        reference
            .strip_prefix(self.settings.prefix.as_str())
            .unwrap_or(reference)
    }

    /// Creates the order at the gateway and records it as pending.
    ///
    /// Nothing is stored unless the gateway accepted the order.
    #[instrument(skip_all, fields(variant = %self.variant.gateway_code, public_id = %order.public_id))]
    pub async fn initiate(
        &self,
        order: &Order,
        customer: &Customer,
        input: &CheckoutInput,
    ) -> Result<RedirectTarget> {
        if !self.is_configured() {
            return Err(CheckoutError::NotConfigured(self.variant.display_name.clone()));
        }
        if let Some(field) = self.input_errors(input).into_iter().next() {
            return Err(CheckoutError::MissingInput(field));
        }
        if self.reconciler.store().get(&order.public_id).await?.is_some() {
            return Err(CheckoutError::DuplicateTransaction(order.public_id.clone()));
        }

        let request = self.payload_context().build(order, customer, input)?;
        let created = self
            .gateway
            .create_order(&request)
            .await
            .inspect_err(|e| warn!(error = %e, "gateway did not accept the order"))?;

        self.reconciler
            .store()
            .insert(Transaction::pending(
                order.public_id.clone(),
                self.variant.gateway_code.clone(),
                order.total.clone(),
            ))
            .await?;

        info!(order_id = %created.order_id, "order created at gateway");
        Ok(RedirectTarget {
            url: created.payment_url,
        })
    }

    pub async fn reconcile(
        &self,
        public_id: &str,
        notification: &GatewayNotification,
    ) -> Result<ReconcileResult> {
        self.reconciler.reconcile(public_id, notification).await
    }

    /// Handles a notification or customer redirect for the given gateway order id.
    ///
    /// The order status is always fetched from the gateway; the callback itself is only a
    /// trigger and carries no trusted data. Lookup failures surface as `GatewayUnavailable`
    /// so the notification is answered with a 5xx and redelivered.
    #[instrument(skip(self), fields(variant = %self.variant.gateway_code))]
    pub async fn handle_callback(
        &self,
        order_reference: &str,
        kind: NotificationKind,
    ) -> Result<CallbackReply> {
        let public_id = self.public_id_from_reference(order_reference);

        let outcome = match self.reconciler.store().get(public_id).await? {
            None => {
                warn!(public_id, "callback for unknown transaction");
                None
            }
            Some(tx) if tx.variant != self.variant.gateway_code => {
                warn!(
                    public_id,
                    owner = %tx.variant,
                    "callback routed to the wrong payment variant"
                );
                None
            }
            Some(tx) if tx.state.is_terminal() => {
                Some(ReconcileResult::AlreadyResolved(tx.state))
            }
            Some(_) => {
                let notification = self
                    .gateway
                    .fetch_order(order_reference)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, "order status lookup failed");
                        match e {
                            CheckoutError::GatewayRejected { code, message } => {
                                CheckoutError::GatewayUnavailable(format!(
                                    "status lookup rejected ({code}): {message}"
                                ))
                            }
                            other => other,
                        }
                    })?;
                match self.reconcile(public_id, &notification).await {
                    Ok(result) => Some(result),
                    Err(CheckoutError::UnknownTransaction(_)) => None,
                    Err(e) => return Err(e),
                }
            }
        };

        match kind {
            NotificationKind::Initial => Ok(CallbackReply::Acknowledge),
            NotificationKind::Redirect => {
                let url = match outcome.as_ref().map(ReconcileResult::state) {
                    Some(TransactionState::Completed | TransactionState::Pending) => {
                        self.endpoints.completion_url(public_id)?
                    }
                    _ => self.endpoints.cancel_url(),
                };
                Ok(CallbackReply::Redirect(RedirectTarget { url }))
            }
        }
    }
}
