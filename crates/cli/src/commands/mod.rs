//! CLI command implementations.

pub mod account;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod orders;
pub mod products;
