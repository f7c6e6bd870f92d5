use crate::clients::{AdminClient, AuthClient, CartClient, ProductClient};
use crate::config::StorefrontConfig;
use crate::error::StorefrontError;
use crate::session::{self, SessionClient};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore, PersistedSession};
use market_gateway::Gateway;
use std::sync::Arc;
use tracing::{error, info};

/// The running client-side system.
///
/// All clients share one [`Gateway`], so they share one circuit breaker and
/// one cookie jar.
///
/// # Example
///
/// ```ignore
/// let storefront = Storefront::new(StorefrontConfig::load(None)?).await?;
/// storefront.session.add_item(CartItem::new(7, 1)).await?;
/// storefront.shutdown().await?;
/// ```
pub struct Storefront {
    /// Auth and cart operations, serialized through the session actor.
    pub session: SessionClient,

    pub products: ProductClient,

    pub admin: AdminClient,

    gateway: Gateway,

    /// Session actor task, awaited on shutdown.
    handle: tokio::task::JoinHandle<()>,
}

impl Storefront {
    /// Builds an HTTP gateway and the store named by `config.storage`.
    pub async fn new(config: StorefrontConfig) -> Result<Self, StorefrontError> {
        let gateway = Gateway::http(config.gateway.clone())?;
        let store: Arc<dyn KeyValueStore> = match &config.storage.path {
            Some(path) => Arc::new(JsonFileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_parts(config, gateway, store).await
    }

    /// Starts the system over injected parts; used by tests with mock transports.
    pub async fn with_parts(
        config: StorefrontConfig,
        gateway: Gateway,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, StorefrontError> {
        let endpoints = Arc::new(config.endpoints);
        let restored = PersistedSession::load(store.as_ref()).await?;
        info!(
            base_url = %gateway.config().base_url,
            authenticated = restored.auth.is_authenticated,
            "Starting storefront"
        );

        let (actor, session) = session::new(
            config.session.buffer_size,
            restored,
            store,
            AuthClient::new(gateway.clone(), endpoints.clone()),
            CartClient::new(gateway.clone(), endpoints.clone()),
        );
        let handle = tokio::spawn(actor.run());

        Ok(Self {
            session,
            products: ProductClient::new(gateway.clone(), endpoints.clone()),
            admin: AdminClient::new(gateway.clone(), endpoints),
            gateway,
            handle,
        })
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Closes the session mailbox and waits for the actor to drain.
    ///
    /// Clones of [`SessionClient`] held elsewhere keep the actor alive; drop
    /// them first.
    pub async fn shutdown(self) -> Result<(), StorefrontError> {
        info!("Shutting down storefront...");
        drop(self.session);
        drop(self.products);
        drop(self.admin);

        if let Err(e) = self.handle.await {
            error!("Session task failed: {:?}", e);
            return Err(StorefrontError::TaskFailed(e.to_string()));
        }

        info!("Storefront shutdown complete.");
        Ok(())
    }
}
