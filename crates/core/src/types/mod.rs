//! Core types for the Vendure storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;
pub mod tag;

pub use id::*;
pub use price::{DEFAULT_CURRENCY, Money};
pub use status::OrderState;
pub use tag::CacheTag;
