use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{QueryError, SortField, SortOrder};
use crate::domain::{CategoryId, Product, ProductFilter};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Raw catalog query parameters, as they arrive from the caller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ProductQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }
}

/// A validated query with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub page: u32,
    pub limit: u32,
    pub filter: ProductFilter,
    pub sort: SortField,
    pub order: SortOrder,
}

impl CatalogQuery {
    /// Orders by the requested column, then by ascending id so equal keys page stably.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        self.order
            .apply(self.sort.compare(a, b))
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl TryFrom<ProductQuery> for CatalogQuery {
    type Error = QueryError;

    fn try_from(params: ProductQuery) -> Result<Self, Self::Error> {
        let page = params.page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return Err(QueryError::InvalidPage);
        }
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        let sort = params.sort.as_deref().map(str::parse::<SortField>).transpose()?.unwrap_or_default();
        let order = params.order.as_deref().map(str::parse::<SortOrder>).transpose()?.unwrap_or_default();

        Ok(Self {
            page,
            limit,
            filter: ProductFilter {
                search: params.search,
                category_id: params.category,
            },
            sort,
            order,
        })
    }
}

/// One page of results. `total` counts every matching row regardless of paging.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Cuts the requested page out of the full, already ordered, result.
    pub fn from_sorted(rows: Vec<T>, query: &CatalogQuery) -> Self {
        let total = rows.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let data = rows.into_iter().skip(offset).take(limit).collect();

        Self {
            data,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total.div_ceil(u64::from(query.limit)),
        }
    }
}
