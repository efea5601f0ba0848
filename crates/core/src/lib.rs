//! Vendure Storefront Core - Shared types library.
//!
//! This crate provides the types shared by the storefront and anything else
//! that talks to the Vendure Shop API:
//! - `storefront` - Public-facing e-commerce site
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, order states, and cache tags

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
