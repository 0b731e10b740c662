//! Account endpoints.
//!
//! `POST /auth/register` — Unprotected: create an unverified account
//! `GET /auth/verify-email` — Unprotected: redeem the e-mailed token
//! `POST /auth/resend-verification` — Unprotected: rotate + resend the token
//! `POST /auth/login` — Unprotected: issue an access/refresh token pair
//! `POST /auth/refresh` — Unprotected: rotate the refresh token
//! `GET /auth/me` — Protected: current profile
//! `PUT /auth/profile` — Protected: update profile fields
//! `GET /auth/sessions` — Protected: chat sessions owned by the caller
//! `POST /auth/sessions/:id/link` — Protected: claim an anonymous session
//!
//! Password hashing runs at interactive-login cost, so register and login
//! are pushed onto the blocking pool; the token flows are hash-and-lookup
//! cheap and stay on the async worker like every other handler.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CurrentUser};
use crate::auth::{AuthError, AuthService, AuthTokens, Registration};
use crate::models::{ChatSession, ProfileFields, User};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub clinic_name: Option<String>,
    pub order_number: Option<String>,
    pub specialty: Option<String>,
    #[serde(default)]
    pub is_student: bool,
    pub school_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub clinic_name: Option<String>,
    pub order_number: Option<String>,
    pub specialty: Option<String>,
    #[serde(default)]
    pub is_student: bool,
    pub school_name: Option<String>,
}

/// Token pair plus the profile, the shape the frontend stores after login.
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: tokens.user,
        }
    }
}

/// Verification outcome. Always HTTP 200: the link lands in a browser tab,
/// and the page renders the message instead of an error screen.
#[derive(Serialize)]
pub struct VerifyEmailResponse {
    pub verified: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct ResendVerificationResponse {
    pub success: bool,
    pub message: &'static str,
}

/// `POST /auth/register` — create the account and send the verification link.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = tokio::task::spawn_blocking(move || {
        let conn = ctx.open_db()?;
        let service = AuthService::new(&conn, ctx.mailer.as_ref());
        service.register(Registration {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            profile: ProfileFields {
                clinic_name: request.clinic_name,
                order_number: request.order_number,
                specialty: request.specialty,
                is_student: request.is_student,
                school_name: request.school_name,
            },
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("register task failed: {e}")))??;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /auth/verify-email?token=...` — redeem a verification token.
pub async fn verify_email(
    State(ctx): State<ApiContext>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<VerifyEmailResponse>, ApiError> {
    let result = {
        let conn = ctx.open_db()?;
        let service = AuthService::new(&conn, ctx.mailer.as_ref());
        service.verify_email(&query.token)
    };

    let response = match result {
        Ok(user) => VerifyEmailResponse {
            verified: true,
            message: format!("Email {} successfully verified", user.email),
        },
        Err(AuthError::Database(db)) => return Err(db.into()),
        Err(e) => VerifyEmailResponse {
            verified: false,
            message: e.to_string(),
        },
    };
    Ok(Json(response))
}

/// `POST /auth/resend-verification` — rotate the token and send a new link.
pub async fn resend_verification(
    State(ctx): State<ApiContext>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<Json<ResendVerificationResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let service = AuthService::new(&conn, ctx.mailer.as_ref());
    service.resend_verification(&request.email)?;

    Ok(Json(ResendVerificationResponse {
        success: true,
        message: "Email de vérification renvoyé avec succès",
    }))
}

/// `POST /auth/login` — verify credentials and issue a token pair.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tokens = tokio::task::spawn_blocking(move || {
        let conn = ctx.open_db()?;
        let service = AuthService::new(&conn, ctx.mailer.as_ref());
        service.login(&request.email, &request.password)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("login task failed: {e}")))??;

    Ok(Json(tokens.into()))
}

/// `POST /auth/refresh` — rotate the refresh token, issue a fresh pair.
pub async fn refresh(
    State(ctx): State<ApiContext>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let service = AuthService::new(&conn, ctx.mailer.as_ref());
    let tokens = service.refresh(&request.refresh_token)?;

    Ok(Json(tokens.into()))
}

/// `GET /auth/me` — the authenticated profile, straight from the middleware.
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

/// `PUT /auth/profile` — update names and professional details.
pub async fn update_profile(
    State(ctx): State<ApiContext>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let conn = ctx.open_db()?;
    let service = AuthService::new(&conn, ctx.mailer.as_ref());
    let user = service
        .update_profile(
            &current.user.id,
            &request.first_name,
            &request.last_name,
            ProfileFields {
                clinic_name: request.clinic_name,
                order_number: request.order_number,
                specialty: request.specialty,
                is_student: request.is_student,
                school_name: request.school_name,
            },
        )
        .map_err(|e| match e {
            // The account vanished between authentication and update.
            e @ AuthError::MissingUser => ApiError::NotFound(e.to_string()),
            other => other.into(),
        })?;

    Ok(Json(user))
}

/// `GET /auth/sessions` — chat sessions owned by the caller, newest first.
pub async fn sessions(
    State(ctx): State<ApiContext>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ChatSession>>, ApiError> {
    let conn = ctx.open_db()?;
    let service = AuthService::new(&conn, ctx.mailer.as_ref());
    Ok(Json(service.user_sessions(&current.user.id)?))
}

/// `POST /auth/sessions/:id/link` — claim an anonymous session, exactly once.
pub async fn link_session(
    State(ctx): State<ApiContext>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatSession>, ApiError> {
    let conn = ctx.open_db()?;
    let service = AuthService::new(&conn, ctx.mailer.as_ref());
    let session = service.link_session(&id, &current.user.id)?;
    tracing::info!(session_id = %id, user_id = %current.user.id, "Session linked to account");
    Ok(Json(session))
}
