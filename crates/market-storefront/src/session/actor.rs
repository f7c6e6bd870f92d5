use super::message::{LoginReport, SessionRequest, SessionState};
use super::SessionError;
use crate::clients::{AuthClient, CartClient};
use crate::model::{AuthProfile, CartItem, ProductIdentifier};
use crate::reconcile::{merge_guest_cart, MergeError, MergeOutcome};
use crate::state::CartScope;
use crate::store::KeyValueStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns the session state and applies requests strictly in arrival order.
///
/// Signed in, cart changes go to the server first and are mirrored locally
/// only once it agrees. Signed out, only the guest cart changes.
pub struct SessionActor {
    receiver: mpsc::Receiver<SessionRequest>,
    state: SessionState,
    store: Arc<dyn KeyValueStore>,
    auth: AuthClient,
    cart: CartClient,
}

impl SessionActor {
    pub fn new(
        buffer_size: usize,
        state: SessionState,
        store: Arc<dyn KeyValueStore>,
        auth: AuthClient,
        cart: CartClient,
    ) -> (Self, mpsc::Sender<SessionRequest>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            state,
            store,
            auth,
            cart,
        };
        (actor, sender)
    }

    pub async fn run(mut self) {
        info!(
            authenticated = self.state.auth.is_authenticated,
            guest_items = self.state.cart.guest_items.len(),
            "Session started"
        );

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SessionRequest::Login {
                    credentials,
                    respond_to,
                } => {
                    let result = match self.auth.login(&credentials, None).await {
                        Ok(profile) => {
                            self.state.auth.login(profile.clone());
                            self.persist().await;
                            Ok(self.sign_in_merge(profile).await)
                        }
                        Err(e) => {
                            warn!(error = %e, "Login failed");
                            self.state.auth.login_failed();
                            self.persist().await;
                            Err(SessionError::from(e))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                SessionRequest::Register {
                    registration,
                    respond_to,
                } => {
                    let result = match self.auth.register(&registration, None).await {
                        Ok(profile) => {
                            self.state.auth.register(profile.clone());
                            self.persist().await;
                            Ok(self.sign_in_merge(profile).await)
                        }
                        Err(e) => {
                            warn!(error = %e, "Registration failed");
                            Err(SessionError::from(e))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                SessionRequest::Logout { respond_to } => {
                    let result = self.auth.logout(None).await.map_err(SessionError::from);
                    if result.is_ok() {
                        self.state.auth.logout();
                        self.state.cart.reset();
                        self.persist().await;
                    }
                    let _ = respond_to.send(result);
                }
                SessionRequest::AddItem { item, respond_to } => {
                    let result = self.add_item(item).await;
                    let _ = respond_to.send(result);
                }
                SessionRequest::RemoveItem {
                    product,
                    respond_to,
                } => {
                    let result = self.remove_item(product).await;
                    let _ = respond_to.send(result);
                }
                SessionRequest::UpdateQuantity {
                    product,
                    quantity,
                    respond_to,
                } => {
                    let result = self.update_quantity(product, quantity).await;
                    let _ = respond_to.send(result);
                }
                SessionRequest::ClearCart { respond_to } => {
                    let result = self.clear_cart().await;
                    let _ = respond_to.send(result);
                }
                SessionRequest::MergeCarts { respond_to } => {
                    let result = if self.state.auth.is_authenticated {
                        self.merge().await.map_err(SessionError::from)
                    } else {
                        Err(SessionError::NotAuthenticated)
                    };
                    let _ = respond_to.send(result);
                }
                SessionRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.state.clone()));
                }
            }
        }

        info!(
            authenticated = self.state.auth.is_authenticated,
            cart_quantity = self.state.cart.total_quantity(),
            "Shutdown"
        );
    }

    fn is_authenticated(&self) -> bool {
        self.state.auth.is_authenticated
    }

    async fn persist(&self) {
        if let Err(error) = self.state.save(self.store.as_ref()).await {
            warn!(%error, "Failed to persist session");
        }
    }

    async fn sign_in_merge(&mut self, profile: AuthProfile) -> LoginReport {
        let merge = self.merge().await;
        if let Err(e) = &merge {
            warn!(error = %e, "Cart merge failed, carts left as they were");
        }
        LoginReport { profile, merge }
    }

    /// Runs the merge; only a complete merge touches local state.
    async fn merge(&mut self) -> Result<MergeOutcome, MergeError> {
        let outcome = merge_guest_cart(&self.cart, &self.state.cart.guest_items).await?;
        self.state.cart.replace_auth(outcome.items.clone());
        self.persist().await;
        Ok(outcome)
    }

    async fn add_item(&mut self, item: CartItem) -> Result<CartItem, SessionError> {
        let (line, scope) = if self.is_authenticated() {
            (self.cart.add_item(&item, None).await?, CartScope::Auth)
        } else {
            (item, CartScope::Guest)
        };
        let product = line.product_identifier;
        self.state.cart.apply_added(line.clone(), scope);
        self.persist().await;

        let recorded = self
            .state
            .cart
            .items(scope)
            .iter()
            .find(|i| i.product_identifier == product)
            .cloned()
            .unwrap_or(line);
        debug!(%product, quantity = recorded.quantity, ?scope, "Item added");
        Ok(recorded)
    }

    async fn remove_item(&mut self, product: ProductIdentifier) -> Result<bool, SessionError> {
        if self.is_authenticated() {
            self.cart.remove_item(product, None).await?;
        }
        let removed = self.state.cart.remove(product);
        self.persist().await;
        Ok(removed)
    }

    async fn update_quantity(
        &mut self,
        product: ProductIdentifier,
        quantity: u32,
    ) -> Result<bool, SessionError> {
        if self.is_authenticated() {
            self.cart.update_quantity(product, quantity, None).await?;
        }
        let updated = self.state.cart.update_quantity(product, quantity);
        self.persist().await;
        Ok(updated)
    }

    async fn clear_cart(&mut self) -> Result<(), SessionError> {
        let scope = if self.is_authenticated() {
            self.cart.clear(None).await?;
            CartScope::Auth
        } else {
            CartScope::Guest
        };
        self.state.cart.clear(scope);
        self.persist().await;
        Ok(())
    }
}
