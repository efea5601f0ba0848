//! Vendure Shop API client.
//!
//! # Architecture
//!
//! - Queries are hand-written GraphQL constants (see `shop::queries`)
//! - Request/response envelopes come from `graphql_client`, HTTP from `reqwest`
//! - Raw responses are reshaped into the storefront view model by pure
//!   functions in `shop::conversions`
//! - Catalog reads are cached in memory via `moka` and grouped by
//!   [`CacheTag`](vendure_storefront_core::CacheTag) so a webhook can drop
//!   everything touching products or collections at once
//! - Cart operations are never cached and carry the customer's session token
//!
//! # Example
//!
//! ```rust,ignore
//! use vendure_storefront::vendure::{ShopSession, VendureClient};
//!
//! let client = VendureClient::new(&config.vendure);
//!
//! // Get a product
//! let product = client.get_product("laptop").await?;
//!
//! // Add its first variant to the active order
//! let mut session = ShopSession::default();
//! let cart = client
//!     .add_to_cart(&mut session, &product.variants[0].id, 1)
//!     .await?;
//! ```

mod shop;
pub mod types;

pub use shop::{FetchResult, ShopSession, VendureClient, queries};
pub use shop::conversions;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Vendure Shop API.
#[derive(Debug, Error)]
pub enum VendureError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the Shop API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// An order mutation returned an `ErrorResult` instead of an order.
    #[error("Order error {code}: {message}")]
    Order {
        /// Vendure error code (e.g., `INSUFFICIENT_STOCK_ERROR`).
        code: String,
        /// Human-readable error message.
        message: String,
    },
}

impl VendureError {
    /// Build a single-message GraphQL error.
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }])
    }
}

/// A GraphQL error returned by the Shop API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(e: graphql_client::Error) -> Self {
        Self {
            message: e.message,
            locations: e.locations.map_or_else(Vec::new, |locs| {
                locs.into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: i64::from(l.line),
                        column: i64::from(l.column),
                    })
                    .collect()
            }),
            path: e.path.map_or_else(Vec::new, |p| {
                p.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                        graphql_client::PathFragment::Index(i) => {
                            serde_json::Value::Number(i.into())
                        }
                    })
                    .collect()
            }),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
