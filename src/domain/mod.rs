//! Business domain entities. Pure data structures with no actor-specific concerns.

pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use category::*;
pub use order::*;
pub use product::*;
pub use user::*;
