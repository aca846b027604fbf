use chrono::Utc;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{checked_total, Order, OrderCreate, OrderFilter, OrderId, OrderItem};

impl Entity for Order {
    const NAME: &'static str = "Order";

    type Id = OrderId;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Filter = OrderFilter;
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a new Order, stamping every line with the order id.
    ///
    /// # Errors
    /// Rejects an order without lines, with a zero quantity, or whose total does not equal
    /// the sum of its lines.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, FrameworkError> {
        if params.lines.is_empty() {
            return Err(FrameworkError::Validation("order has no items".to_string()));
        }
        if params.lines.iter().any(|line| line.quantity == 0) {
            return Err(FrameworkError::Validation("order item quantity must be positive".to_string()));
        }
        let expected = checked_total(&params.lines)
            .ok_or_else(|| FrameworkError::Validation("order total is out of range".to_string()))?;
        if expected != params.total {
            return Err(FrameworkError::Validation(format!(
                "order total {} does not match items sum {expected}",
                params.total
            )));
        }

        let items = params
            .lines
            .into_iter()
            .map(|line| OrderItem {
                id: line.item_id,
                order_id: id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        Ok(Self {
            id,
            user_id: params.user_id,
            items,
            total: params.total,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), FrameworkError> {
        Err(FrameworkError::Validation("orders are immutable".to_string()))
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        self.user_id == filter.user_id
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), FrameworkError> {
        Ok(())
    }
}
