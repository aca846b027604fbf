use chrono::Utc;
use rust_decimal::Decimal;
use tracing::warn;

use super::actions::{ProductAction, ProductActionResult};
use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{Product, ProductCreate, ProductFilter, ProductId, ProductPatch};

/// Prices are stored with two decimal places.
pub const PRICE_SCALE: u32 = 2;

fn normalize_price(price: Decimal) -> Result<Decimal, FrameworkError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(FrameworkError::Validation(format!("price must not be negative: {price}")));
    }
    Ok(price.round_dp(PRICE_SCALE))
}

fn validate_name(name: &str) -> Result<(), FrameworkError> {
    if name.trim().is_empty() {
        return Err(FrameworkError::Validation("product name required".to_string()));
    }
    Ok(())
}

impl Entity for Product {
    const NAME: &'static str = "Product";

    type Id = ProductId;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Filter = ProductFilter;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, FrameworkError> {
        validate_name(&params.name)?;
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            price: normalize_price(params.price)?,
            stock: params.stock,
            category_id: params.category_id,
            created_at: Utc::now(),
        })
    }

    /// Applies the optional fields of `patch`. Fails without partial effects when
    /// the new name or price is invalid.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), FrameworkError> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        let price = patch.price.map(normalize_price).transpose()?;

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        Ok(())
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        let search_ok = filter
            .search
            .as_deref()
            .map_or(true, |needle| self.name.to_lowercase().contains(&needle.to_lowercase()));
        let category_ok = filter
            .category_id
            .map_or(true, |category_id| self.category_id == Some(category_id));
        search_ok && category_ok
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, FrameworkError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::StockLevel(self.stock)),
            ProductAction::Reserve(quantity) => {
                if self.stock >= quantity {
                    self.stock -= quantity;
                    Ok(ProductActionResult::Reserved {
                        price: self.price,
                        remaining: self.stock,
                    })
                } else {
                    Ok(ProductActionResult::Rejected { available: self.stock })
                }
            }
            // Saturates at u32::MAX; the clamped amount is logged.
            ProductAction::Release(quantity) => {
                let stock = self.stock.saturating_add(quantity);
                if stock - self.stock != quantity {
                    warn!(
                        product_id = self.id,
                        quantity,
                        clamped = quantity - (stock - self.stock),
                        "Release clamped at maximum stock"
                    );
                }
                self.stock = stock;
                Ok(ProductActionResult::Released { stock })
            }
        }
    }
}
