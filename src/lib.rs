//! Online shop backend core built as an actor system.
//!
//! Each store (products, categories, users, orders) is a tokio task that owns its
//! rows and handles one request at a time. Typed clients wrap the stores; the
//! [`Storefront`](app_system::Storefront) composes them into the shop's request
//! surface: catalog queries, catalog administration, authentication, and
//! all-or-nothing order placement.

pub mod actor_framework;
pub mod app_system;
pub mod auth;
pub mod catalog;
pub mod category_actor;
pub mod clients;
pub mod domain;
pub mod order_actor;
pub mod product_actor;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;

pub use app_system::{ShopConfig, ShopError, ShopSystem, Storefront};
