//! Spice Pantry Storefront library.
//!
//! The customer-facing storefront core for a food-products seller: a
//! persistent shopping cart, the multi-step checkout workflow, and the
//! clients for the remote order, catalog, and auth services. Front ends
//! (the `sp-cli` binary, or any other shell) drive this library; all
//! business state lives here.
//!
//! # Architecture
//!
//! - [`cart`] - Pure cart reducer plus the write-through persistent store
//! - [`checkout`] - Delivery → Payment → Review → Complete workflow with
//!   field validation and the order-submission fallback protocol
//! - [`api`] - REST clients for the order, product-catalog, and auth
//!   services
//! - [`storage`] - Named local JSON slots (cart, user, token)
//! - [`session`] - Cached current user and bearer token
//! - [`services`] - Ancillary integrations (contact-form sink)
//!
//! The remote services are the source of truth for products and placed
//! orders; the cart is owned locally and only leaves the process as an
//! order payload at checkout.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
