//! # Cart Reconciliation
//!
//! Folds a guest cart into the signed-in user's server cart at login.
//!
//! ```text
//! fetch server cart ──► index by product ──► for each guest item, in order:
//!                                              present?  skip (server quantity wins)
//!                                              missing?  add_item, await, record
//! ```
//!
//! Adds go out one at a time. A failed add stops the merge; the items already
//! added stay on the server and are listed in the error.

use crate::model::{CartItem, ProductIdentifier};
use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// The two server operations a merge needs.
#[async_trait]
pub trait CartBackend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch_cart(&self) -> Result<Vec<CartItem>, Self::Error>;

    /// Adds one item and returns the line the server now holds.
    async fn add_item(&self, item: &CartItem) -> Result<CartItem, Self::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Server items in server order, then the added items in guest order.
    pub items: Vec<CartItem>,
    pub added: Vec<ProductIdentifier>,
    /// Guest items already in the server cart.
    pub skipped: Vec<ProductIdentifier>,
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Failed to fetch server cart: {0}")]
    FetchFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to add product {product} to server cart after adding {added:?}: {source}")]
    AddFailed {
        product: ProductIdentifier,
        added: Vec<ProductIdentifier>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Merges `guest` into the server cart behind `backend`.
///
/// `guest` is only read; clearing it is up to the caller once this returns `Ok`.
#[instrument(skip_all, fields(guest_items = guest.len()))]
pub async fn merge_guest_cart<B: CartBackend + ?Sized>(
    backend: &B,
    guest: &[CartItem],
) -> Result<MergeOutcome, MergeError> {
    let mut items = backend.fetch_cart().await.map_err(|e| {
        warn!(error = %e, "Fetch failed, merge aborted");
        MergeError::FetchFailed(Box::new(e))
    })?;

    let mut present: HashSet<ProductIdentifier> =
        items.iter().map(|item| item.product_identifier).collect();
    let mut added = Vec::new();
    let mut skipped = Vec::new();

    for guest_item in guest {
        let product = guest_item.product_identifier;
        if present.contains(&product) {
            debug!(%product, "Already on server, skipped");
            skipped.push(product);
            continue;
        }

        match backend.add_item(guest_item).await {
            Ok(confirmed) => {
                items.push(guest_item.overlay(&confirmed));
                present.insert(product);
                added.push(product);
                debug!(%product, "Added");
            }
            Err(e) => {
                warn!(%product, error = %e, added = added.len(), "Add failed, merge stopped");
                return Err(MergeError::AddFailed {
                    product,
                    added,
                    source: Box::new(e),
                });
            }
        }
    }

    info!(added = added.len(), skipped = skipped.len(), total = items.len(), "Carts merged");
    Ok(MergeOutcome {
        items,
        added,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as Set;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Error)]
    #[error("fake backend: {0}")]
    struct FakeError(String);

    /// In-memory server cart that records every call.
    #[derive(Default)]
    struct FakeBackend {
        server: Mutex<Vec<CartItem>>,
        calls: Mutex<Vec<String>>,
        fail_fetch: bool,
        fail_add: Set<ProductIdentifier>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeBackend {
        fn with_server(items: Vec<CartItem>) -> Self {
            Self {
                server: Mutex::new(items),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CartBackend for FakeBackend {
        type Error = FakeError;

        async fn fetch_cart(&self) -> Result<Vec<CartItem>, FakeError> {
            self.calls.lock().unwrap().push("fetch".into());
            if self.fail_fetch {
                return Err(FakeError("503".into()));
            }
            Ok(self.server.lock().unwrap().clone())
        }

        async fn add_item(&self, item: &CartItem) -> Result<CartItem, FakeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls
                .lock()
                .unwrap()
                .push(format!("add {}", item.product_identifier));
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_add.contains(&item.product_identifier) {
                return Err(FakeError("rejected".into()));
            }
            let confirmed = CartItem {
                date_added: Some("2024-05-01".into()),
                ..CartItem::new(item.product_identifier, item.quantity).with_name("Server copy")
            };
            self.server.lock().unwrap().push(confirmed.clone());
            Ok(confirmed)
        }
    }

    fn ids(items: &[CartItem]) -> Vec<u64> {
        items.iter().map(|item| item.product_identifier.0).collect()
    }

    #[tokio::test]
    async fn server_quantity_wins_and_order_is_server_then_guest() {
        let backend = FakeBackend::with_server(vec![CartItem::new(1, 2), CartItem::new(3, 1)]);
        let guest = vec![CartItem::new(2, 1), CartItem::new(1, 5)];

        let outcome = merge_guest_cart(&backend, &guest).await.unwrap();

        assert_eq!(ids(&outcome.items), vec![1, 3, 2]);
        assert_eq!(outcome.items[0].quantity, 2);
        assert_eq!(outcome.added, vec![ProductIdentifier(2)]);
        assert_eq!(outcome.skipped, vec![ProductIdentifier(1)]);
        assert_eq!(backend.calls(), vec!["fetch", "add 2"]);
    }

    #[tokio::test]
    async fn added_items_carry_server_fields() {
        let backend = FakeBackend::default();
        let guest = vec![CartItem::new(8, 3).with_name("Guest copy").with_image("lamp.png")];

        let outcome = merge_guest_cart(&backend, &guest).await.unwrap();

        let merged = &outcome.items[0];
        assert_eq!(merged.name.as_deref(), Some("Server copy"));
        assert_eq!(merged.image.as_deref(), Some("lamp.png"));
        assert_eq!(merged.date_added.as_deref(), Some("2024-05-01"));
    }

    #[tokio::test]
    async fn result_has_no_duplicates_and_covers_both_carts() {
        let backend = FakeBackend::with_server(vec![CartItem::new(4, 1), CartItem::new(5, 1)]);
        let guest = vec![
            CartItem::new(5, 2),
            CartItem::new(6, 1),
            CartItem::new(7, 1),
            CartItem::new(4, 9),
        ];

        let outcome = merge_guest_cart(&backend, &guest).await.unwrap();

        let unique: Set<u64> = ids(&outcome.items).into_iter().collect();
        assert_eq!(unique.len(), outcome.items.len());
        assert_eq!(unique, Set::from([4, 5, 6, 7]));
    }

    #[tokio::test]
    async fn adds_are_strictly_sequential() {
        let backend = FakeBackend::default();
        let guest: Vec<CartItem> = (10..16).map(|id| CartItem::new(id, 1)).collect();

        merge_guest_cart(&backend, &guest).await.unwrap();

        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(
            backend.calls(),
            vec!["fetch", "add 10", "add 11", "add 12", "add 13", "add 14", "add 15"]
        );
    }

    #[tokio::test]
    async fn fetch_failure_issues_no_adds() {
        let backend = FakeBackend {
            fail_fetch: true,
            ..Default::default()
        };

        let result = merge_guest_cart(&backend, &[CartItem::new(1, 1)]).await;

        assert!(matches!(result, Err(MergeError::FetchFailed(_))));
        assert_eq!(backend.calls(), vec!["fetch"]);
    }

    #[tokio::test]
    async fn add_failure_stops_and_reports_partial_progress() {
        let backend = FakeBackend {
            fail_add: Set::from([ProductIdentifier(2)]),
            ..Default::default()
        };
        let guest = vec![CartItem::new(1, 1), CartItem::new(2, 1), CartItem::new(3, 1)];

        let result = merge_guest_cart(&backend, &guest).await;

        match result {
            Err(MergeError::AddFailed { product, added, .. }) => {
                assert_eq!(product, ProductIdentifier(2));
                assert_eq!(added, vec![ProductIdentifier(1)]);
            }
            other => panic!("expected AddFailed, got {other:?}"),
        }
        assert_eq!(backend.calls(), vec!["fetch", "add 1", "add 2"]);
        assert_eq!(ids(&backend.server.lock().unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn works_through_a_shared_backend() {
        let backend = Arc::new(FakeBackend::default());
        let outcome = merge_guest_cart(backend.as_ref(), &[]).await.unwrap();
        assert!(outcome.items.is_empty());
        assert!(outcome.added.is_empty());
    }
}
