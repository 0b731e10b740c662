//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it against the
//! access-token table, and injects `CurrentUser` into request extensions
//! for downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentUser};
use crate::auth::AuthService;

/// Require a valid access token on the request.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
/// On success: injects `CurrentUser` for downstream handlers.
pub async fn require_auth(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    // 1. Extract bearer token
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".into()))?
        .to_string();

    // 2. Resolve the token to its user. Token lookup is a hash compare plus
    //    two indexed reads, so the connection never survives past this block.
    let user = {
        let conn = ctx.open_db()?;
        let service = AuthService::new(&conn, ctx.mailer.as_ref());
        service.authenticate(&token)?
    };

    // 3. Inject the authenticated user for downstream handlers
    req.extensions_mut().insert(CurrentUser { user });

    // 4. Process request
    Ok(next.run(req).await)
}
