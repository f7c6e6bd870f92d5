//! # Session Client
//!
//! Typed handle over the session actor's mailbox. Cheap to clone.

use super::message::{LoginReport, Response, SessionRequest, SessionState};
use super::SessionError;
use crate::model::{CartItem, Credentials, ProductIdentifier, Registration};
use crate::reconcile::MergeOutcome;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SessionClient {
    sender: mpsc::Sender<SessionRequest>,
}

impl SessionClient {
    pub fn new(sender: mpsc::Sender<SessionRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> SessionRequest,
    ) -> Result<T, SessionError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Dropped)?
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: Credentials) -> Result<LoginReport, SessionError> {
        debug!("Sending login to session");
        self.request(|respond_to| SessionRequest::Login {
            credentials,
            respond_to,
        })
        .await
    }

    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<LoginReport, SessionError> {
        self.request(|respond_to| SessionRequest::Register {
            registration,
            respond_to,
        })
        .await
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.request(|respond_to| SessionRequest::Logout { respond_to })
            .await
    }

    #[instrument(skip(self))]
    pub async fn add_item(&self, item: CartItem) -> Result<CartItem, SessionError> {
        self.request(|respond_to| SessionRequest::AddItem { item, respond_to })
            .await
    }

    pub async fn remove_item(&self, product: ProductIdentifier) -> Result<bool, SessionError> {
        self.request(|respond_to| SessionRequest::RemoveItem {
            product,
            respond_to,
        })
        .await
    }

    pub async fn update_quantity(
        &self,
        product: ProductIdentifier,
        quantity: u32,
    ) -> Result<bool, SessionError> {
        self.request(|respond_to| SessionRequest::UpdateQuantity {
            product,
            quantity,
            respond_to,
        })
        .await
    }

    pub async fn clear_cart(&self) -> Result<(), SessionError> {
        self.request(|respond_to| SessionRequest::ClearCart { respond_to })
            .await
    }

    pub async fn merge_carts(&self) -> Result<MergeOutcome, SessionError> {
        self.request(|respond_to| SessionRequest::MergeCarts { respond_to })
            .await
    }

    pub async fn snapshot(&self) -> Result<SessionState, SessionError> {
        self.request(|respond_to| SessionRequest::Snapshot { respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_mailbox_is_reported() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        let client = SessionClient::new(sender);
        assert!(matches!(client.snapshot().await, Err(SessionError::Closed)));
    }

    #[tokio::test]
    async fn dropped_reply_is_reported() {
        let (sender, mut receiver) = mpsc::channel(1);
        let client = SessionClient::new(sender);
        tokio::spawn(async move {
            let request = receiver.recv().await;
            drop(request);
        });
        assert!(matches!(client.logout().await, Err(SessionError::Dropped)));
    }
}
