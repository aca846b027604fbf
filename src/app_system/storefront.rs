//! The shop's request surface. One method per logical endpoint, each returning
//! [`ShopError`]. Catalog reads and registration/login are public; every other
//! method declares the [`Capability`] it needs.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::ShopError;
use crate::auth::{AuthGateway, Capability, LoginRequest, LoginResponse, Principal, RegisterRequest, RoleGuard};
use crate::catalog::{CatalogQueryEngine, Page, ProductQuery};
use crate::clients::{CategoryClient, OrderClient, ProductClient};
use crate::domain::{
    Category, CategoryCreate, CategoryId, CategoryPatch, CreateOrderRequest, Order, OrderId, Product,
    ProductCreate, ProductFilter, ProductId, ProductPatch, User,
};

#[derive(Clone)]
pub struct Storefront {
    catalog: CatalogQueryEngine,
    products: ProductClient,
    categories: CategoryClient,
    orders: OrderClient,
    auth: AuthGateway,
    /// Held across "category exists" + product write, and "category unused" + category
    /// delete, so neither pair can interleave with the other.
    category_links: Arc<Mutex<()>>,
}

impl Storefront {
    pub fn new(
        catalog: CatalogQueryEngine,
        products: ProductClient,
        categories: CategoryClient,
        orders: OrderClient,
        auth: AuthGateway,
    ) -> Self {
        Self {
            catalog,
            products,
            categories,
            orders,
            auth,
            category_links: Arc::new(Mutex::new(())),
        }
    }

    /// Resolves the caller and checks the capability against their role.
    async fn authorize(&self, authorization: Option<&str>, capability: Capability) -> Result<Principal, ShopError> {
        let principal = self.auth.authenticate(authorization).await?;
        RoleGuard::authorize(&principal, capability)?;
        Ok(principal)
    }

    async fn ensure_category(&self, category_id: Option<CategoryId>) -> Result<(), ShopError> {
        if let Some(id) = category_id {
            self.categories.get_category(id).await?;
        }
        Ok(())
    }

    // --- Products ---

    pub async fn list_products(&self, query: ProductQuery) -> Result<Page<Product>, ShopError> {
        Ok(self.catalog.query(query).await?)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ShopError> {
        Ok(self.products.get_product(id).await?)
    }

    #[instrument(skip(self, authorization, params), fields(product_name = %params.name))]
    pub async fn create_product(&self, authorization: Option<&str>, params: ProductCreate) -> Result<Product, ShopError> {
        self.authorize(authorization, Capability::ManageCatalog).await?;
        let _links = self.category_links.lock().await;
        self.ensure_category(params.category_id).await?;
        let product = self.products.create_product(params).await?;
        info!(product_id = product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, authorization, patch))]
    pub async fn update_product(
        &self,
        authorization: Option<&str>,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ShopError> {
        self.authorize(authorization, Capability::ManageCatalog).await?;
        let _links = self.category_links.lock().await;
        self.ensure_category(patch.category_id.flatten()).await?;
        Ok(self.products.update_product(id, patch).await?)
    }

    #[instrument(skip(self, authorization))]
    pub async fn delete_product(&self, authorization: Option<&str>, id: ProductId) -> Result<(), ShopError> {
        self.authorize(authorization, Capability::ManageCatalog).await?;
        self.products.delete_product(id).await?;
        info!("Product deleted");
        Ok(())
    }

    // --- Categories ---

    pub async fn list_categories(&self) -> Result<Vec<Category>, ShopError> {
        Ok(self.categories.list_categories().await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ShopError> {
        Ok(self.categories.get_category(id).await?)
    }

    #[instrument(skip(self, authorization, params), fields(category_name = %params.name))]
    pub async fn create_category(
        &self,
        authorization: Option<&str>,
        params: CategoryCreate,
    ) -> Result<Category, ShopError> {
        self.authorize(authorization, Capability::ManageCatalog).await?;
        Ok(self.categories.create_category(params).await?)
    }

    #[instrument(skip(self, authorization, patch))]
    pub async fn update_category(
        &self,
        authorization: Option<&str>,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> Result<Category, ShopError> {
        self.authorize(authorization, Capability::ManageCatalog).await?;
        Ok(self.categories.update_category(id, patch).await?)
    }

    /// A category that still has products cannot be deleted.
    #[instrument(skip(self, authorization))]
    pub async fn delete_category(&self, authorization: Option<&str>, id: CategoryId) -> Result<(), ShopError> {
        self.authorize(authorization, Capability::ManageCatalog).await?;
        let _links = self.category_links.lock().await;
        let in_use = self
            .products
            .find_products(ProductFilter { search: None, category_id: Some(id) })
            .await?;
        if !in_use.is_empty() {
            warn!(products = in_use.len(), "Category still referenced");
            return Err(ShopError::Conflict { field: "categoryId", value: id.to_string() });
        }
        self.categories.delete_category(id).await?;
        info!("Category deleted");
        Ok(())
    }

    // --- Orders ---

    #[instrument(skip(self, authorization, request), fields(lines = request.items.len()))]
    pub async fn place_order(&self, authorization: Option<&str>, request: CreateOrderRequest) -> Result<Order, ShopError> {
        let principal = self.authorize(authorization, Capability::PlaceOrder).await?;
        Ok(self.orders.create_order(principal.subject_id, request.items).await?)
    }

    pub async fn list_orders(&self, authorization: Option<&str>) -> Result<Vec<Order>, ShopError> {
        let principal = self.authorize(authorization, Capability::ViewOwnOrders).await?;
        Ok(self.orders.list_orders(principal.subject_id).await?)
    }

    pub async fn get_order(&self, authorization: Option<&str>, id: OrderId) -> Result<Order, ShopError> {
        let principal = self.authorize(authorization, Capability::ViewOwnOrders).await?;
        Ok(self.orders.get_order(id, principal.subject_id).await?)
    }

    // --- Auth ---

    pub async fn register(&self, request: RegisterRequest) -> Result<User, ShopError> {
        Ok(self.auth.register(request).await?)
    }

    /// Seeds an administrator account. Not part of the request surface.
    pub async fn register_admin(&self, request: RegisterRequest) -> Result<User, ShopError> {
        Ok(self.auth.register_admin(request).await?)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ShopError> {
        Ok(self.auth.login(request).await?)
    }

    pub async fn logout(&self, authorization: Option<&str>) -> Result<(), ShopError> {
        Ok(self.auth.logout(authorization).await?)
    }
}
