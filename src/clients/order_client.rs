use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument, warn, Instrument};

use crate::actor_framework::ResourceClient;
use crate::clients::InventoryLedger;
use crate::domain::{Order, OrderCreate, OrderFilter, OrderId, OrderItemRequest, OrderLine, UserId};
use crate::order_actor::OrderError;

/// Client for placing and reading orders.
///
/// Placement orchestrates the inventory ledger and the order store: every line is
/// reserved, then the order is written in one store request. Any failure releases
/// the reservations already taken, so an error never leaves stock changed or an
/// order behind.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    ledger: InventoryLedger,
    item_ids: Arc<AtomicU64>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, ledger: InventoryLedger) -> Self {
        Self {
            inner,
            ledger,
            item_ids: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Places an order for `user_id`.
    ///
    /// The workflow runs on its own task: if the caller stops waiting, the
    /// placement still either completes or rolls back in full.
    ///
    /// # Errors
    /// - `ValidationError` for an empty item list or a zero quantity
    /// - `ProductNotFound` / `InsufficientStock` from the first failing reservation
    /// - `ValidationError` when the order total does not fit in a `Decimal`
    /// - any order store failure after the reservations
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn create_order(&self, user_id: UserId, items: Vec<OrderItemRequest>) -> Result<Order, OrderError> {
        info!("Processing create_order request");
        validate_items(&items)?;

        let placement = self.clone();
        tokio::spawn(async move { placement.place(user_id, items).await }.in_current_span())
            .await
            .map_err(|e| OrderError::ActorCommunicationError(format!("Order placement task failed: {e}")))?
    }

    async fn place(&self, user_id: UserId, items: Vec<OrderItemRequest>) -> Result<Order, OrderError> {
        // Reserve in ascending product id order so concurrent orders touching the
        // same products always contend in the same sequence.
        let mut plan: Vec<usize> = (0..items.len()).collect();
        plan.sort_by_key(|&idx| items[idx].product_id);

        let mut prices: Vec<Option<Decimal>> = vec![None; items.len()];
        let mut reserved: Vec<OrderItemRequest> = Vec::with_capacity(items.len());

        for idx in plan {
            let item = items[idx];
            match self.ledger.reserve(item.product_id, item.quantity).await {
                Ok(price) => {
                    prices[idx] = Some(price);
                    reserved.push(item);
                }
                Err(e) => {
                    error!(product_id = item.product_id, error = %e, "Stock reservation failed");
                    self.roll_back(&reserved).await;
                    return Err(e.into());
                }
            }
        }
        info!(reserved = reserved.len(), "Stock reserved successfully");

        let lines = items
            .iter()
            .zip(prices)
            .map(|(item, price)| {
                price.map(|price| OrderLine {
                    item_id: self.item_ids.fetch_add(1, Ordering::SeqCst),
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price,
                })
            })
            .collect::<Option<Vec<_>>>();
        let Some(lines) = lines else {
            self.roll_back(&reserved).await;
            return Err(OrderError::ValidationError("unpriced order line".to_string()));
        };

        let params = match OrderCreate::new(user_id, lines) {
            Ok(params) => params,
            Err(e) => {
                warn!(error = %e, "Order total rejected");
                self.roll_back(&reserved).await;
                return Err(OrderError::ValidationError(e.to_string()));
            }
        };

        match self.inner.create(params).await {
            Ok(order) => {
                info!(order_id = order.id, total = %order.total, "Order created successfully");
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Order persistence failed");
                self.roll_back(&reserved).await;
                Err(e.into())
            }
        }
    }

    /// Releases reservations newest first. A release failure is logged and does not
    /// replace the error that triggered the roll back.
    async fn roll_back(&self, reserved: &[OrderItemRequest]) {
        for item in reserved.iter().rev() {
            match self.ledger.release(item.product_id, item.quantity).await {
                Ok(stock) => debug!(product_id = item.product_id, stock, "Reservation released"),
                Err(e) => error!(
                    product_id = item.product_id,
                    quantity = item.quantity,
                    error = %e,
                    "Failed to release reservation"
                ),
            }
        }
    }

    /// The caller's own orders, oldest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        Ok(self.inner.find(OrderFilter { user_id }).await?)
    }

    /// One of the caller's orders. Another user's order is reported as not found,
    /// exactly like a missing one.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId, user_id: UserId) -> Result<Order, OrderError> {
        debug!("Sending request");
        match self.inner.get(id).await? {
            Some(order) if order.user_id == user_id => Ok(order),
            _ => {
                debug!("Order not found for caller");
                Err(OrderError::NotFound(id.to_string()))
            }
        }
    }
}

fn validate_items(items: &[OrderItemRequest]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::ValidationError("order must contain at least one item".to_string()));
    }
    if let Some(item) = items.iter().find(|item| item.quantity == 0) {
        return Err(OrderError::ValidationError(format!(
            "quantity for product {} must be positive",
            item.product_id
        )));
    }
    Ok(())
}
