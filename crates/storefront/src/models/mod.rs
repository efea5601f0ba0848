//! Types stored outside the Shop API.

pub mod session;

pub use session::keys as session_keys;
