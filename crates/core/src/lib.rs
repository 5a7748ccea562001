//! Spice Pantry Core - Shared types library.
//!
//! This crate provides common types used across all Spice Pantry components:
//! - `storefront` - Cart, checkout, and remote-API client library
//! - `cli` - Command-line storefront front end
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, contact fields,
//!   and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
