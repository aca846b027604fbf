use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::product_actor::ProductError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: u64,
        requested: u32,
        available: u32,
    },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<ProductError> for OrderError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => OrderError::ProductNotFound(id),
            ProductError::InsufficientStock { product_id, requested, available } => {
                OrderError::InsufficientStock { product_id, requested, available }
            }
            ProductError::InvalidQuantity(_) | ProductError::ValidationError(_) => {
                OrderError::ValidationError(err.to_string())
            }
            ProductError::ActorCommunicationError(reason) => OrderError::ActorCommunicationError(reason),
        }
    }
}

impl From<FrameworkError> for OrderError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::Validation(reason) => OrderError::ValidationError(reason),
            FrameworkError::Conflict { .. } => OrderError::ValidationError(err.to_string()),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                OrderError::ActorCommunicationError(err.to_string())
            }
        }
    }
}
