//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::config::StorefrontConfig;
use crate::middleware::security_headers::content_security_policy;
use crate::vendure::VendureClient;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid content security policy: {0}")]
    InvalidCsp(#[from] axum::http::header::InvalidHeaderValue),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and the Shop API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    vendure: VendureClient,
    csp: HeaderValue,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the content security policy is not a valid header
    /// value (e.g., the Shop API URL contains control characters).
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let vendure = VendureClient::new(&config.vendure);
        let csp = HeaderValue::from_str(&content_security_policy(
            config.vendure.asset_origin().as_deref(),
        ))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                vendure,
                csp,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Vendure Shop API client.
    #[must_use]
    pub fn vendure(&self) -> &VendureClient {
        &self.inner.vendure
    }

    /// The `Content-Security-Policy` header value.
    #[must_use]
    pub fn content_security_policy(&self) -> &HeaderValue {
        &self.inner.csp
    }
}
