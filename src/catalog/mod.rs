//! Catalog query engine: conjunctive filters, whitelisted sorting and pagination
//! composed into one deterministic read over the product store.

mod engine;
mod error;
mod query;
mod sort;

pub use engine::CatalogQueryEngine;
pub use error::QueryError;
pub use query::{CatalogQuery, Page, ProductQuery, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use sort::{SortField, SortOrder};
