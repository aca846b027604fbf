use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductId};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Stock bookkeeping on top of the product store.
///
/// `reserve` is one conditional update inside the store actor: the check
/// `stock >= quantity` and the decrement cannot be separated by another request,
/// so concurrent reservations against the same product never oversell.
#[derive(Clone)]
pub struct InventoryLedger {
    inner: ResourceClient<Product>,
}

impl InventoryLedger {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    /// Takes `quantity` units out of stock and returns the unit price at that instant.
    ///
    /// # Errors
    /// `NotFound` for an unknown product, `InsufficientStock` when fewer than
    /// `quantity` units are available. Stock is unchanged on every error.
    #[instrument(skip(self))]
    pub async fn reserve(&self, product_id: ProductId, quantity: u32) -> Result<Decimal, ProductError> {
        if quantity == 0 {
            return Err(ProductError::InvalidQuantity(quantity));
        }
        match self.inner.perform_action(product_id, ProductAction::Reserve(quantity)).await? {
            ProductActionResult::Reserved { price, remaining } => {
                debug!(%price, remaining, "Stock reserved");
                Ok(price)
            }
            ProductActionResult::Rejected { available } => {
                warn!(available, "Insufficient stock");
                Err(ProductError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available,
                })
            }
            other => Err(ProductError::ActorCommunicationError(format!("Unexpected result: {other:?}"))),
        }
    }

    /// Puts previously reserved units back. Returns the resulting stock level.
    #[instrument(skip(self))]
    pub async fn release(&self, product_id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        match self.inner.perform_action(product_id, ProductAction::Release(quantity)).await? {
            ProductActionResult::Released { stock } => {
                debug!(stock, "Stock released");
                Ok(stock)
            }
            other => Err(ProductError::ActorCommunicationError(format!("Unexpected result: {other:?}"))),
        }
    }
}
