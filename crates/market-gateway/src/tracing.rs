//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber::fmt` layer whose
//! level comes from `RUST_LOG`.
//!
//! ```bash
//! # Breaker transitions only
//! RUST_LOG=info cargo run -p market-storefront
//!
//! # Every gateway call with method, url and status
//! RUST_LOG=market_gateway=debug cargo run -p market-storefront
//! ```
//!
//! With `RUST_LOG=debug` a failed login followed by a trip looks like:
//!
//! ```text
//! DEBUG call_with_cancel: Call failed method=POST path=/user/login/ url="http://localhost:8000/user/login/" status=401
//! WARN  call_with_cancel: Circuit opened method=GET path=/cart/cart_operations/merge-and-sync-carts/ failures=15 next_retry_delay=1s
//! INFO  call_with_cancel: Circuit half-open, sending probe failure_count=15
//! ```

/// Installs the global subscriber. Calling it twice is a no-op.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
