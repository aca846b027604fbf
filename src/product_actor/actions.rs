use rust_decimal::Decimal;

/// Custom actions for Product entities.
///
/// Each action runs inside the product store with exclusive access to the row, so a
/// reserve is a single check-and-decrement that no other request can interleave with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
    /// Decrements stock by the given quantity if, and only if, enough is available.
    Reserve(u32),
    /// Returns previously reserved stock.
    Release(u32),
}

/// Results from ProductActions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductActionResult {
    StockLevel(u32),
    /// Stock was decremented. `price` is the unit price at the moment of the reservation.
    Reserved { price: Decimal, remaining: u32 },
    /// Not enough stock; nothing was changed.
    Rejected { available: u32 },
    Released { stock: u32 },
}
