//! Ancillary service integrations.

pub mod contact;
