use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ProductId, UserId};

pub type OrderId = u64;
pub type OrderItemId = u64;

/// Represents a customer order.
///
/// Items keep the order in which they were requested, and
/// `total == Σ item.price * item.quantity` holds for every stored order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One line of an order. `price` is the product price at the time the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    /// `None` when `price * quantity` does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// A priced line handed to the order store once its stock is reserved.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub item_id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderLine {
    /// `None` when `price * quantity` does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Sum of every line's subtotal, or `None` when any step overflows.
pub fn checked_total(lines: &[OrderLine]) -> Option<Decimal> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.subtotal()?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("order total is out of range")]
pub struct TotalOverflow;

/// Payload for persisting a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}

impl OrderCreate {
    pub fn new(user_id: UserId, lines: Vec<OrderLine>) -> Result<Self, TotalOverflow> {
        let total = checked_total(&lines).ok_or(TotalOverflow)?;
        Ok(Self { user_id, lines, total })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderFilter {
    pub user_id: UserId,
}

/// A requested line item, as received from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl OrderItemRequest {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self { product_id, quantity }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}
