//! User accounts. Emails are unique across the store.

pub mod entity;
pub mod error;

pub use error::*;
