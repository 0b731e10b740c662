//! HTTP API.
//!
//! Exposes the consultation pipeline and account flows as JSON endpoints
//! for the web frontend. Routes are nested under `/api/v1/`; the account
//! routes sit behind a bearer-token middleware, everything else is open
//! because consultations start anonymous.
//!
//! The router is composable — `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
