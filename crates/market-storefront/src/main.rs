//! # Storefront Demo
//!
//! Adds a few guest items, optionally signs in and merges, then prints the
//! session.
//!
//! ```bash
//! RUST_LOG=info cargo run -p market-storefront -- alice@example.com s3cret
//! MARKET_GATEWAY__BASE_URL=https://shop.example cargo run -p market-storefront
//! ```
//!
//! `MARKET_CONFIG` names an optional config file.

use market_gateway::tracing::setup_tracing;
use market_storefront::config::StorefrontConfig;
use market_storefront::error::StorefrontError;
use market_storefront::lifecycle::Storefront;
use market_storefront::model::{CartItem, Credentials};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), StorefrontError> {
    setup_tracing();

    let config_path = std::env::var_os("MARKET_CONFIG").map(PathBuf::from);
    let config = StorefrontConfig::load(config_path.as_deref())?;
    info!(base_url = %config.gateway.base_url, "Starting storefront demo");

    let storefront = Storefront::new(config).await?;

    let span = tracing::info_span!("guest_cart");
    async {
        for item in [
            CartItem::new(101, 1)
                .with_name("Desk Lamp")
                .with_price(Decimal::new(2499, 2)),
            CartItem::new(205, 2)
                .with_name("Notebook")
                .with_price(Decimal::new(450, 2)),
        ] {
            match storefront.session.add_item(item).await {
                Ok(line) => info!(product = %line.product_identifier, quantity = line.quantity, "Added"),
                Err(e) => warn!(error = %e, "Add failed"),
            }
        }
    }
    .instrument(span)
    .await;

    let mut args = std::env::args().skip(1);
    if let (Some(email), Some(password)) = (args.next(), args.next()) {
        let span = tracing::info_span!("login");
        async {
            match storefront.session.login(Credentials::new(email, password)).await {
                Ok(report) => match report.merge {
                    Ok(outcome) => info!(
                        first_name = %report.profile.first_name,
                        added = outcome.added.len(),
                        skipped = outcome.skipped.len(),
                        "Signed in and merged"
                    ),
                    Err(e) => warn!(error = %e, "Signed in, merge failed"),
                },
                Err(e) => error!(error = %e, "Login failed"),
            }
        }
        .instrument(span)
        .await;
    }

    let snapshot = storefront.session.snapshot().await?;
    info!(
        authenticated = snapshot.auth.is_authenticated,
        auth_items = snapshot.cart.auth_items.len(),
        guest_items = snapshot.cart.guest_items.len(),
        breaker = ?storefront.gateway().snapshot().state,
        "Session snapshot"
    );

    storefront.shutdown().await?;
    Ok(())
}
