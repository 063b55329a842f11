use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::ProductOptions,
    error::{CaseError, CaseResult},
    model::{
        Configuration, ConfigurationId, Order, OrderId, OrderStatus, ShippingAddress, SourceImage,
        UserId,
    },
};

/// Combined patch applied to a configuration in one store call. Carrying both
/// fields in a single write is what makes the confirm commit atomic: either
/// the composite URL and the options land together, or neither does.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigurationPatch {
    pub cropped_image_url: Option<String>,
    pub options: Option<ProductOptions>,
}

/// External entity store for design drafts. Implementations must apply each
/// `update` as a single logical unit.
pub trait ConfigurationStore: Send + Sync {
    fn create(&self, source_image: SourceImage) -> CaseResult<Configuration>;
    fn find_by_id(&self, id: &ConfigurationId) -> CaseResult<Configuration>;
    fn update(&self, id: &ConfigurationId, patch: ConfigurationPatch) -> CaseResult<Configuration>;
}

/// External entity store for orders. The compare-and-act operations live on
/// the store because they need a backing constraint: application-level
/// check-then-act cannot survive two concurrent checkouts.
pub trait OrderStore: Send + Sync {
    fn get(&self, id: &OrderId) -> CaseResult<Order>;

    /// Returns the existing unpaid order for (user, configuration) or creates
    /// one, atomically. A retried or double-clicked checkout reuses the first
    /// attempt's row.
    fn find_or_create_unpaid(
        &self,
        user: &UserId,
        configuration: &ConfigurationId,
        amount: Decimal,
    ) -> CaseResult<Order>;

    /// Sets `is_paid` and attaches the shipping address as one step,
    /// idempotently keyed on the order id: a replayed confirmation returns
    /// the already-paid order unchanged.
    fn mark_paid(&self, id: &OrderId, shipping: &ShippingAddress) -> CaseResult<Order>;

    /// Writes a fulfillment status. Legality of the transition is the state
    /// machine's concern, not the store's.
    fn set_status(&self, id: &OrderId, status: OrderStatus) -> CaseResult<Order>;

    fn list_for_configuration(&self, configuration: &ConfigurationId) -> Vec<Order>;
}

/// In-memory reference store used by tests and the CLI.
#[derive(Default)]
pub struct MemoryConfigurationStore {
    next_id: AtomicU64,
    items: Mutex<HashMap<ConfigurationId, Configuration>>,
}

impl MemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigurationStore for MemoryConfigurationStore {
    fn create(&self, source_image: SourceImage) -> CaseResult<Configuration> {
        let id = ConfigurationId::new(format!(
            "cfg-{}",
            self.next_id.fetch_add(1, Ordering::Relaxed) + 1
        ));
        let config = Configuration {
            id: id.clone(),
            source_image,
            cropped_image_url: None,
            options: ProductOptions::default(),
        };
        let mut items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        items.insert(id, config.clone());
        tracing::debug!(configuration = %config.id, "created configuration");
        Ok(config)
    }

    fn find_by_id(&self, id: &ConfigurationId) -> CaseResult<Configuration> {
        let items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        items
            .get(id)
            .cloned()
            .ok_or_else(|| CaseError::input(format!("configuration {id} not found")))
    }

    fn update(&self, id: &ConfigurationId, patch: ConfigurationPatch) -> CaseResult<Configuration> {
        let mut items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let config = items
            .get_mut(id)
            .ok_or_else(|| CaseError::input(format!("configuration {id} not found")))?;
        if let Some(url) = patch.cropped_image_url {
            config.cropped_image_url = Some(url);
        }
        if let Some(options) = patch.options {
            config.options = options;
        }
        Ok(config.clone())
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    next_id: AtomicU64,
    items: Mutex<HashMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for MemoryOrderStore {
    fn get(&self, id: &OrderId) -> CaseResult<Order> {
        let items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        items
            .get(id)
            .cloned()
            .ok_or_else(|| CaseError::checkout(format!("order {id} not found")))
    }

    fn find_or_create_unpaid(
        &self,
        user: &UserId,
        configuration: &ConfigurationId,
        amount: Decimal,
    ) -> CaseResult<Order> {
        // Single lock over lookup + insert stands in for the uniqueness
        // constraint a real store would put on (user, configuration, unpaid).
        let mut items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(existing) = items
            .values()
            .find(|o| !o.is_paid && &o.user_id == user && &o.configuration_id == configuration)
        {
            tracing::debug!(order = %existing.id, "reusing unpaid order");
            return Ok(existing.clone());
        }

        let id = OrderId::new(format!(
            "ord-{}",
            self.next_id.fetch_add(1, Ordering::Relaxed) + 1
        ));
        let order = Order {
            id: id.clone(),
            configuration_id: configuration.clone(),
            user_id: user.clone(),
            amount,
            is_paid: false,
            status: OrderStatus::AwaitingShipment,
            shipping_address: None,
        };
        items.insert(id, order.clone());
        tracing::debug!(order = %order.id, configuration = %configuration, "created order");
        Ok(order)
    }

    fn mark_paid(&self, id: &OrderId, shipping: &ShippingAddress) -> CaseResult<Order> {
        let mut items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let order = items
            .get_mut(id)
            .ok_or_else(|| CaseError::checkout(format!("order {id} not found")))?;
        if order.is_paid {
            tracing::debug!(order = %id, "payment confirmation replayed, no-op");
            return Ok(order.clone());
        }
        order.is_paid = true;
        order.shipping_address = Some(shipping.clone());
        Ok(order.clone())
    }

    fn set_status(&self, id: &OrderId, status: OrderStatus) -> CaseResult<Order> {
        let mut items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let order = items
            .get_mut(id)
            .ok_or_else(|| CaseError::checkout(format!("order {id} not found")))?;
        order.status = status;
        Ok(order.clone())
    }

    fn list_for_configuration(&self, configuration: &ConfigurationId) -> Vec<Order> {
        let items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut orders: Vec<Order> = items
            .values()
            .filter(|o| &o.configuration_id == configuration)
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        orders
    }
}
