use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{ShopConfig, ShopError, Storefront};
use crate::actor_framework::{sequence, ResourceActor};
use crate::auth::{AuthGateway, SessionClient, SessionService};
use crate::catalog::CatalogQueryEngine;
use crate::clients::{CategoryClient, InventoryLedger, OrderClient, ProductClient, UserClient};
use crate::domain::{Category, Order, Product, User};

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct ShopSystem {
    pub storefront: Storefront,
    sessions: SessionClient,
    handles: Vec<JoinHandle<()>>,
}

impl ShopSystem {
    /// Starts every store and the session service. Must be called inside a tokio runtime.
    pub fn new(config: &ShopConfig) -> Self {
        let buffer = config.channel_buffer;

        let (product_actor, product_store) = ResourceActor::<Product>::new(buffer, sequence());
        let product_handle = tokio::spawn(product_actor.run());

        let (category_actor, category_store) = ResourceActor::<Category>::new(buffer, sequence());
        let category_handle = tokio::spawn(category_actor.run());

        let (user_actor, user_store) = ResourceActor::<User>::new(buffer, sequence());
        let user_handle = tokio::spawn(user_actor.run());

        let (order_actor, order_store) = ResourceActor::<Order>::new(buffer, sequence());
        let order_handle = tokio::spawn(order_actor.run());

        let (session_service, sessions) = SessionService::new(buffer, config.token_ttl);
        let session_handle = tokio::spawn(session_service.run());

        let products = ProductClient::new(product_store.clone());
        let ledger = InventoryLedger::new(product_store);
        let storefront = Storefront::new(
            CatalogQueryEngine::new(products.clone()),
            products,
            CategoryClient::new(category_store),
            OrderClient::new(order_store, ledger),
            AuthGateway::new(UserClient::new(user_store), sessions.clone()),
        );
        info!(channel_buffer = buffer, token_ttl_secs = config.token_ttl.num_seconds(), "Shop system started");

        Self {
            storefront,
            sessions,
            handles: vec![product_handle, category_handle, user_handle, order_handle, session_handle],
        }
    }

    /// Stops the session service, drops the store clients so each store drains its
    /// mailbox and exits, then joins every task.
    ///
    /// Storefront clones held elsewhere keep their stores alive until they are dropped.
    pub async fn shutdown(self) -> Result<(), ShopError> {
        info!("Shutting down system...");

        self.sessions.shutdown().await?;
        drop(self.storefront);
        drop(self.sessions);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(ShopError::Internal(format!("Actor task failed: {e}")));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
