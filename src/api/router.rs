//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/v1/`, mirroring what the frontend calls.
//!
//! Two route groups: the open surface (health, sessions, reference data,
//! credential flows) and the account surface behind bearer-token auth.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the full application router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer
/// of the protected group). Endpoint handlers use `State<ApiContext>`
/// (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/sessions", post(endpoints::sessions::create))
        .route("/sessions/:id", get(endpoints::sessions::get))
        .route("/sessions/slug/:slug", get(endpoints::sessions::by_slug))
        .route(
            "/sessions/:id/messages",
            post(endpoints::sessions::send_message),
        )
        .route(
            "/sessions/:id/start-diagnosis",
            post(endpoints::sessions::start_diagnosis),
        )
        .route(
            "/sessions/:id/patient-data",
            get(endpoints::sessions::patient_data).delete(endpoints::sessions::clear_patient_data),
        )
        .route("/reference/breeds", get(endpoints::reference::breeds))
        .route(
            "/reference/consultation-reasons",
            get(endpoints::reference::consultation_reasons),
        )
        .route("/auth/register", post(endpoints::account::register))
        .route("/auth/verify-email", get(endpoints::account::verify_email))
        .route(
            "/auth/resend-verification",
            post(endpoints::account::resend_verification),
        )
        .route("/auth/login", post(endpoints::account::login))
        .route("/auth/refresh", post(endpoints::account::refresh))
        .with_state(ctx.clone());

    // Account routes — require a valid access token.
    //
    // Layers apply bottom (innermost) to top (outermost); Extension must be
    // outermost so the auth middleware can extract ApiContext.
    let protected = Router::new()
        .route("/auth/me", get(endpoints::account::me))
        .route("/auth/profile", put(endpoints::account::update_profile))
        .route("/auth/sessions", get(endpoints::account::sessions))
        .route(
            "/auth/sessions/:id/link",
            post(endpoints::account::link_session),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx));

    // The React frontend runs on its own origin in both dev (localhost) and
    // the compose deployment (the `frontend` service).
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://frontend:3000"),
        ]))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", open)
        .nest("/api/v1", protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(serde::Serialize)]
struct RootInfo {
    message: &'static str,
    version: &'static str,
    status: &'static str,
}

/// `GET /` — service banner, also used by the deploy smoke check.
async fn root() -> Json<RootInfo> {
    Json(RootInfo {
        message: "NeuroVet - Veterinary Neurological Diagnostic Assistant",
        version: crate::config::APP_VERSION,
        status: "running",
    })
}
