//! Error types for the session actor.

use crate::error::{AuthError, CartError};
use crate::reconcile::MergeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    /// The operation needs a signed-in user.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session actor closed")]
    Closed,

    #[error("Session actor dropped response channel")]
    Dropped,
}
