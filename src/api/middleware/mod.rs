//! API middleware stack.
//!
//! A single layer: bearer-token authentication for the account-scoped
//! routes. Public routes (health, reference data, anonymous sessions)
//! bypass it entirely.

pub mod auth;
