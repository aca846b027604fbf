use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

use webshop::app_system::{setup_tracing, ShopConfig, ShopError, ShopSystem};
use webshop::auth::{LoginRequest, RegisterRequest};
use webshop::catalog::ProductQuery;
use webshop::domain::{CategoryCreate, CreateOrderRequest, OrderItemRequest, ProductCreate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ShopConfig::from_env()?;

    // Setup tracing once for the entire application
    setup_tracing(&config.log_filter);

    info!("Starting webshop");

    let system = ShopSystem::new(&config);
    let shop = system.storefront.clone();

    let admin_header = async {
        shop.register_admin(RegisterRequest::new("admin@shop.test", "admin-password", "Admin"))
            .await?;
        let login = shop
            .login(LoginRequest { email: "admin@shop.test".into(), password: "admin-password".into() })
            .await?;
        Ok::<_, ShopError>(format!("Bearer {}", login.access_token))
    }
    .instrument(tracing::info_span!("admin_bootstrap"))
    .await?;

    let seeded = async {
        let peripherals = shop
            .create_category(Some(&admin_header), CategoryCreate::new("Peripherals"))
            .await?;
        let mut ids = Vec::new();
        for (name, cents, stock) in [
            ("Mechanical keyboard", 7999, 10),
            ("Keycap set", 2450, 40),
            ("Wireless mouse", 3900, 25),
            ("Keyboard wrist rest", 1599, 0),
        ] {
            let product = shop
                .create_product(
                    Some(&admin_header),
                    ProductCreate::new(name, Decimal::new(cents, 2), stock).in_category(peripherals.id),
                )
                .await?;
            ids.push(product.id);
        }
        Ok::<_, ShopError>(ids)
    }
    .instrument(tracing::info_span!("catalog_seed"))
    .await?;

    let page = shop
        .list_products(ProductQuery::default().search("key").sort("price").order("DESC").limit(2))
        .await?;
    info!(page = %serde_json::to_string(&page)?, "Catalog query");

    let customer_header = async {
        shop.register(RegisterRequest::new("alice@example.com", "wonderland", "Alice"))
            .await?;
        let login = shop
            .login(LoginRequest { email: "alice@example.com".into(), password: "wonderland".into() })
            .await?;
        Ok::<_, ShopError>(format!("Bearer {}", login.access_token))
    }
    .instrument(tracing::info_span!("customer_signup"))
    .await?;

    // Create test order - this will flow through the ledger and the order store
    let request = CreateOrderRequest {
        items: vec![OrderItemRequest::new(seeded[0], 2), OrderItemRequest::new(seeded[1], 1)],
    };
    let order_result = shop
        .place_order(Some(&customer_header), request)
        .instrument(tracing::info_span!("order_processing"))
        .await;

    match order_result {
        Ok(order) => info!(order_id = order.id, total = %order.total, "Order processed successfully"),
        Err(e) => error!(error = %e, status = e.status_code(), "Order processing failed"),
    }

    // Out of stock: the whole order is rejected and nothing is reserved
    let rejected = shop
        .place_order(
            Some(&customer_header),
            CreateOrderRequest { items: vec![OrderItemRequest::new(seeded[3], 1)] },
        )
        .await;
    if let Err(e) = rejected {
        info!(error = %e, status = e.status_code(), "Order rejected as expected");
    }

    drop(shop);
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
