use std::cmp::Ordering;
use std::str::FromStr;

use super::QueryError;
use crate::domain::Product;

/// The sortable product columns. Client supplied sort keys are resolved against this
/// list and never reach the store as raw field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Name,
    Price,
    Stock,
    CreatedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Stock => "stock",
            SortField::CreatedAt => "createdAt",
        }
    }

    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Stock => a.stock.cmp(&b.stock),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "stock" => Ok(SortField::Stock),
            "createdAt" => Ok(SortField::CreatedAt),
            other => Err(QueryError::UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(QueryError::UnknownSortOrder(s.to_string()))
        }
    }
}
