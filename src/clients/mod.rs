//! Typed clients over the generic store actors.
//!
//! Each client maps framework errors into its domain error and adds the domain
//! operations (stock reservation, order placement) on top of plain CRUD.

mod macros;

mod category_client;
mod inventory_ledger;
mod order_client;
mod product_client;
mod user_client;

pub use category_client::CategoryClient;
pub use inventory_ledger::InventoryLedger;
pub use order_client::OrderClient;
pub use product_client::ProductClient;
pub use user_client::UserClient;
