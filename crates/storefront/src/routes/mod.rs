//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (featured products)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (probes the Shop API)
//!
//! # Catalog
//! GET  /search                 - Faceted product search
//! GET  /search/:collection     - Collection listing
//! GET  /product/:handle        - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Redirect to the checkout page
//!
//! # Webhooks
//! POST /api/revalidate         - Cache revalidation webhook
//! ```

pub mod cart;
pub mod health;
pub mod home;
pub mod products;
pub mod revalidate;
pub mod search;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::state::AppState;
use crate::vendure::{FOOTER_MENU, HEADER_MENU, Menu};

/// Shared page chrome: site name and navigation menus.
#[derive(Clone)]
pub struct Layout {
    pub site_name: String,
    pub header_menu: Vec<Menu>,
    pub footer_menu: Vec<Menu>,
}

impl Layout {
    /// Load the navigation menus.
    ///
    /// A menu that fails to load is rendered empty rather than failing the page.
    pub async fn load(state: &AppState) -> Self {
        let (header_menu, footer_menu) = tokio::join!(
            state.vendure().get_menu(HEADER_MENU),
            state.vendure().get_menu(FOOTER_MENU)
        );

        Self {
            site_name: state.config().site_name.clone(),
            header_menu: header_menu.unwrap_or_else(|e| {
                tracing::warn!("Failed to load header menu: {e}");
                Vec::new()
            }),
            footer_menu: footer_menu.unwrap_or_else(|e| {
                tracing::warn!("Failed to load footer menu: {e}");
                Vec::new()
            }),
        }
    }
}

/// Whether the request was issued by htmx.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

/// Create the catalog search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search::index))
        .route("/{collection}", get(search::collection))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/search", search_routes())
        .route("/product/{handle}", get(products::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout redirect
        .route("/checkout", get(cart::checkout))
        // Webhooks
        .route("/api/revalidate", post(revalidate::revalidate))
        .nest("/health", health_routes())
}
