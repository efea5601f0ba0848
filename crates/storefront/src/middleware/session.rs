//! Session middleware configuration.
//!
//! Sessions live in memory (tower-sessions `MemoryStore`). The only thing a
//! session holds is the Vendure bearer token that identifies the customer's
//! active order, so losing sessions on restart only empties carts.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::StorefrontConfig;
use crate::models::session_keys;
use crate::vendure::ShopSession;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "vs_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Load the customer's Shop API session.
///
/// A missing or unreadable token yields an anonymous session.
pub async fn load_shop_session(session: &Session) -> ShopSession {
    let auth_token = session
        .get::<String>(session_keys::VENDURE_AUTH_TOKEN)
        .await
        .ok()
        .flatten();

    ShopSession::new(auth_token)
}

/// Store the customer's Shop API session token.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_shop_session(
    session: &Session,
    shop_session: &ShopSession,
) -> Result<(), tower_sessions::session::Error> {
    match &shop_session.auth_token {
        Some(token) => {
            session
                .insert(session_keys::VENDURE_AUTH_TOKEN, token)
                .await
        }
        None => {
            session
                .remove::<String>(session_keys::VENDURE_AUTH_TOKEN)
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_shop_session_round_trip() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        assert_eq!(load_shop_session(&session).await, ShopSession::default());

        let shop = ShopSession::new(Some("tok-123".to_string()));
        save_shop_session(&session, &shop).await.unwrap();
        assert_eq!(load_shop_session(&session).await, shop);

        save_shop_session(&session, &ShopSession::default())
            .await
            .unwrap();
        assert!(load_shop_session(&session).await.auth_token.is_none());
    }
}
