use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::{CaseError, CaseResult},
    model::{
        Configuration, ConfigurationId, Order, OrderId, OrderStatus, ShippingAddress, UserId,
    },
    store::{ConfigurationStore, OrderStore},
};

/// Where a configuration/order pair sits in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DesignPhase {
    DraftConfiguration,
    ConfigurationReady,
    OrderCreated,
    Paid(OrderStatus),
}

/// Pure classifier over the persisted state.
pub fn design_phase(configuration: &Configuration, order: Option<&Order>) -> DesignPhase {
    match order {
        Some(order) if order.is_paid => DesignPhase::Paid(order.status),
        Some(_) => DesignPhase::OrderCreated,
        None if configuration.is_ready() => DesignPhase::ConfigurationReady,
        None => DesignPhase::DraftConfiguration,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
}

/// External payment boundary: turns an order into a hosted checkout session.
/// The session must carry the order id so the asynchronous confirmation can
/// find its way back.
pub trait PaymentGateway: Send + Sync {
    fn create_session(
        &self,
        order: &Order,
        configuration: &Configuration,
    ) -> CaseResult<CheckoutSession>;
}

/// Reference gateway for tests and offline runs.
#[derive(Default)]
pub struct MemoryPaymentGateway;

impl PaymentGateway for MemoryPaymentGateway {
    fn create_session(
        &self,
        order: &Order,
        _configuration: &Configuration,
    ) -> CaseResult<CheckoutSession> {
        Ok(CheckoutSession {
            url: format!("mem://checkout/{}", order.id),
        })
    }
}

/// Asynchronous confirmation delivered by the payment provider. Delivery may
/// be retried; processing is idempotent on the order id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: OrderId,
    pub shipping: ShippingAddress,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutRedirect {
    pub order_id: OrderId,
    pub url: String,
}

/// Governs the legal transitions of a configuration/order pair from
/// configuration-ready through fulfillment.
pub struct OrderFlow {
    configurations: Arc<dyn ConfigurationStore>,
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl OrderFlow {
    pub fn new(
        configurations: Arc<dyn ConfigurationStore>,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            configurations,
            orders,
            gateway,
        }
    }

    /// Checkout initiation: configuration-ready → order-created. Idempotent;
    /// a retried checkout reuses the unpaid order. The amount is always
    /// recomputed from the configuration's current options.
    #[tracing::instrument(skip(self), fields(user = %user, configuration = %config_id))]
    pub fn checkout(
        &self,
        user: &UserId,
        config_id: &ConfigurationId,
    ) -> CaseResult<CheckoutRedirect> {
        let configuration = self.configurations.find_by_id(config_id)?;
        if !configuration.is_ready() {
            return Err(CaseError::checkout(format!(
                "configuration {config_id} has no composite yet"
            )));
        }

        let cents = configuration.options.total_price_cents();
        let amount = Decimal::new(i64::from(cents), 2);
        let order = self.orders.find_or_create_unpaid(user, config_id, amount)?;

        let session = self.gateway.create_session(&order, &configuration)?;
        tracing::debug!(order = %order.id, %amount, "checkout session created");
        Ok(CheckoutRedirect {
            order_id: order.id,
            url: session.url,
        })
    }

    /// order-created → paid, driven exclusively by the provider's
    /// confirmation event. Replays return the already-paid order unchanged.
    #[tracing::instrument(skip(self, event), fields(order = %event.order_id))]
    pub fn apply_payment_confirmation(&self, event: &PaymentConfirmation) -> CaseResult<Order> {
        let order = self.orders.mark_paid(&event.order_id, &event.shipping)?;
        tracing::debug!(order = %order.id, "payment applied");
        Ok(order)
    }

    /// Externally driven fulfillment update. Only the single forward step is
    /// a valid transition; anything else is rejected.
    pub fn advance_status(&self, id: &OrderId, next: OrderStatus) -> CaseResult<Order> {
        let order = self.orders.get(id)?;
        if !order.is_paid {
            return Err(CaseError::checkout(format!(
                "order {id} is unpaid, fulfillment cannot start"
            )));
        }
        if !order.status.can_advance_to(next) {
            return Err(CaseError::checkout(format!(
                "order {id} cannot move {} -> {}",
                order.status.as_str(),
                next.as_str()
            )));
        }
        self.orders.set_status(id, next)
    }

    /// Operational override: reassigns the status without monotonicity
    /// checks. Deliberately loud in the logs; not part of the guaranteed
    /// state machine.
    pub fn force_status(&self, id: &OrderId, status: OrderStatus) -> CaseResult<Order> {
        tracing::warn!(order = %id, status = status.as_str(), "forcing order status");
        self.orders.set_status(id, status)
    }

    pub fn order(&self, id: &OrderId) -> CaseResult<Order> {
        self.orders.get(id)
    }
}
