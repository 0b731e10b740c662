//! API endpoint handlers.
//!
//! Each module corresponds to a surface of the clinician-facing client.
//! Handlers stay thin: validation and status mapping here, the actual
//! work in the auth service and the session reconciler.

pub mod account;
pub mod health;
pub mod reference;
pub mod sessions;
