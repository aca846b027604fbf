use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: u64,
        requested: u32,
        available: u32,
    },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ProductError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::Validation(reason) => ProductError::ValidationError(reason),
            FrameworkError::Conflict { .. } => ProductError::ValidationError(err.to_string()),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                ProductError::ActorCommunicationError(err.to_string())
            }
        }
    }
}
