use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductFilter, ProductId, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for the product store: catalog reads and admin mutations.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

crate::impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self), fields(product_name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.create(params).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    /// Every product matching `filter`, in ascending id order.
    #[instrument(skip(self))]
    pub async fn find_products(&self, filter: ProductFilter) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        Ok(self.inner.find(filter).await?)
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::StockLevel(level) => Ok(level),
            other => Err(ProductError::ActorCommunicationError(format!("Unexpected result: {other:?}"))),
        }
    }
}
