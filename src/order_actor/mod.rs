//! Order persistence. Orders are written once, with all of their items, and never patched.

pub mod entity;
pub mod error;

pub use error::*;
