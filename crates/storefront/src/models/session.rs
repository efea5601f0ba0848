//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key for the Vendure bearer token identifying the active order.
    pub const VENDURE_AUTH_TOKEN: &str = "vendure_auth_token";
}
