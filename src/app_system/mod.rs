//! System orchestration, startup, and shutdown logic.

pub mod config;
pub mod error;
pub mod shop_system;
pub mod storefront;
pub mod tracing;

pub use self::config::*;
pub use self::error::*;
pub use self::shop_system::*;
pub use self::storefront::*;
pub use self::tracing::*;
