use tracing::{debug, instrument};

use super::{CatalogQuery, Page, ProductQuery, QueryError};
use crate::clients::ProductClient;
use crate::domain::Product;

/// Read side of the catalog: filter, order and page products in one pass.
#[derive(Clone)]
pub struct CatalogQueryEngine {
    products: ProductClient,
}

impl CatalogQueryEngine {
    pub fn new(products: ProductClient) -> Self {
        Self { products }
    }

    /// Runs a catalog query.
    ///
    /// Parameters are validated before the store is touched. The filtered rows are
    /// ordered by the requested key with ascending id as the tiebreak, and `total`
    /// counts the same filtered set the page was cut from.
    #[instrument(skip(self))]
    pub async fn query(&self, params: ProductQuery) -> Result<Page<Product>, QueryError> {
        let query = CatalogQuery::try_from(params)?;

        let mut rows = self.products.find_products(query.filter.clone()).await?;
        rows.sort_by(|a, b| query.compare(a, b));

        let page = Page::from_sorted(rows, &query);
        debug!(
            total = page.total,
            returned = page.data.len(),
            sort = query.sort.as_str(),
            "Catalog query executed"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::actor_framework::{sequence, ResourceActor};
    use crate::domain::ProductCreate;

    async fn seeded() -> (CatalogQueryEngine, ProductClient) {
        let (actor, client) = ResourceActor::<Product>::new(32, sequence());
        tokio::spawn(actor.run());
        let products = ProductClient::new(client);

        // Twelve "Key ..." products priced 1.00 ..= 12.00 plus unrelated rows.
        for i in 1..=12u32 {
            products
                .create_product(ProductCreate::new(format!("Key {i:02}"), Decimal::new(i64::from(i) * 100, 2), i).in_category(1))
                .await
                .unwrap();
        }
        products
            .create_product(ProductCreate::new("Mouse", Decimal::new(2500, 2), 3).in_category(2))
            .await
            .unwrap();
        products
            .create_product(ProductCreate::new("Monkey wrench", Decimal::new(900, 2), 1))
            .await
            .unwrap();

        (CatalogQueryEngine::new(products.clone()), products)
    }

    fn names(page: &Page<Product>) -> Vec<&str> {
        page.data.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_search_sort_and_paginate() {
        let (engine, _) = seeded().await;

        let page = engine
            .query(ProductQuery::default().search("key").category(1).sort("price").order("DESC").page(2).limit(5))
            .await
            .unwrap();

        assert_eq!(names(&page), vec!["Key 07", "Key 06", "Key 05", "Key 04", "Key 03"]);
        assert_eq!(page.total, 12);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let (engine, _) = seeded().await;

        let page = engine.query(ProductQuery::default().search("KEY").limit(50)).await.unwrap();
        // "Monkey wrench" contains "key" too.
        assert_eq!(page.total, 13);
        assert!(page.data.iter().all(|p| p.name.to_lowercase().contains("key")));
    }

    #[tokio::test]
    async fn test_defaults_order_by_id() {
        let (engine, _) = seeded().await;

        let page = engine.query(ProductQuery::default()).await.unwrap();
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total, 14);
        assert_eq!(page.total_pages, 2);
        let ids: Vec<u64> = page.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_equal_keys_fall_back_to_id() {
        let (engine, products) = seeded().await;
        products
            .create_product(ProductCreate::new("Key 12 copy", Decimal::new(1200, 2), 0).in_category(1))
            .await
            .unwrap();

        let page = engine
            .query(ProductQuery::default().category(1).sort("price").order("desc").limit(2))
            .await
            .unwrap();
        assert_eq!(names(&page), vec!["Key 12", "Key 12 copy"]);
    }

    #[tokio::test]
    async fn test_page_beyond_last_is_empty() {
        let (engine, _) = seeded().await;

        let page = engine.query(ProductQuery::default().category(1).page(9).limit(5)).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_no_matches() {
        let (engine, _) = seeded().await;

        let page = engine.query(ProductQuery::default().search("zzz")).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_invalid_parameters_fail_before_reading() {
        let (engine, _) = seeded().await;

        assert_eq!(
            engine.query(ProductQuery::default().sort("password")).await,
            Err(QueryError::UnknownSortField("password".to_string()))
        );
        assert_eq!(engine.query(ProductQuery::default().limit(0)).await, Err(QueryError::InvalidLimit));
        assert_eq!(engine.query(ProductQuery::default().page(0)).await, Err(QueryError::InvalidPage));
    }
}
