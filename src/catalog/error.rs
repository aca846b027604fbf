use thiserror::Error;

use crate::product_actor::ProductError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("unsupported sort field: {0}")]
    UnknownSortField(String),
    #[error("unsupported sort order: {0} (expected ASC or DESC)")]
    UnknownSortOrder(String),
    #[error("page must be at least 1")]
    InvalidPage,
    #[error("limit must be at least 1")]
    InvalidLimit,
    #[error(transparent)]
    Store(#[from] ProductError),
}
