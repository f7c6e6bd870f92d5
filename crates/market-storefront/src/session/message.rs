use super::SessionError;
use crate::model::{AuthProfile, CartItem, Credentials, ProductIdentifier, Registration};
use crate::reconcile::{MergeError, MergeOutcome};
use crate::store::PersistedSession;
use tokio::sync::oneshot;

/// State owned by the session actor; the same shape is persisted.
pub type SessionState = PersistedSession;

/// Reply slot for a session request.
pub type Response<T> = oneshot::Sender<Result<T, SessionError>>;

/// What a successful sign-in produced.
#[derive(Debug)]
pub struct LoginReport {
    pub profile: AuthProfile,
    /// The guest cart merge. On `Err` both carts were left untouched.
    pub merge: Result<MergeOutcome, MergeError>,
}

#[derive(Debug)]
pub enum SessionRequest {
    Login {
        credentials: Credentials,
        respond_to: Response<LoginReport>,
    },
    Register {
        registration: Registration,
        respond_to: Response<LoginReport>,
    },
    Logout {
        respond_to: Response<()>,
    },
    /// Replies with the cart line as recorded.
    AddItem {
        item: CartItem,
        respond_to: Response<CartItem>,
    },
    /// Replies whether a local line was removed.
    RemoveItem {
        product: ProductIdentifier,
        respond_to: Response<bool>,
    },
    UpdateQuantity {
        product: ProductIdentifier,
        quantity: u32,
        respond_to: Response<bool>,
    },
    ClearCart {
        respond_to: Response<()>,
    },
    /// Re-runs the guest cart merge for a signed-in user.
    MergeCarts {
        respond_to: Response<MergeOutcome>,
    },
    Snapshot {
        respond_to: Response<SessionState>,
    },
}
