//! Chat session endpoints.
//!
//! `POST /sessions` — open an anonymous consultation session
//! `GET /sessions/:id` — session with full message history
//! `GET /sessions/slug/:slug` — same, addressed by the human-readable slug
//! `POST /sessions/:id/messages` — one clinician turn, returns the assessment
//! `POST /sessions/:id/start-diagnosis` — skip straight to the diagnosis phase
//! `GET /sessions/:id/patient-data` — accumulated patient profile
//! `DELETE /sessions/:id/patient-data` — reset the patient profile
//!
//! All of these are public: sessions start anonymous and are only tied to an
//! account later through the account routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::diagnosis::SessionReconciler;
use crate::models::{ChatMessage, ChatSession, PatientData, VeterinaryAssessment};

/// Upper bound on a single clinician message, matching the frontend's limit.
const MAX_MESSAGE_CHARS: usize = 5_000;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Session plus its full history, the shape the conversation view loads.
#[derive(Serialize)]
pub struct SessionDetail {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
pub struct ClearedResponse {
    pub message: &'static str,
}

/// `POST /sessions` — create a fresh session in the data-collection phase.
pub async fn create(State(ctx): State<ApiContext>) -> Result<Json<ChatSession>, ApiError> {
    let conn = ctx.open_db()?;
    let session = ChatSession::new();
    repository::insert_session(&conn, &session)?;
    tracing::info!(session_id = %session.id, "Created chat session");
    Ok(Json(session))
}

/// `GET /sessions/:id` — load a session and its messages.
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionDetail>, ApiError> {
    let conn = ctx.open_db()?;
    let session = repository::get_session(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;
    let messages = repository::get_session_messages(&conn, &id)?;
    Ok(Json(SessionDetail { session, messages }))
}

/// `GET /sessions/slug/:slug` — slug-addressed variant of the same load.
pub async fn by_slug(
    State(ctx): State<ApiContext>,
    Path(slug): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    let conn = ctx.open_db()?;
    let session = repository::get_session_by_slug(&conn, &slug)?
        .ok_or_else(|| ApiError::NotFound(format!("Session with slug '{slug}' not found")))?;
    let messages = repository::get_session_messages(&conn, &session.id)?;
    Ok(Json(SessionDetail { session, messages }))
}

/// `POST /sessions/:id/messages` — run one full conversation turn.
///
/// The turn blocks on the diagnostic service (several seconds of polling),
/// so the whole reconciliation runs on the blocking pool.
pub async fn send_message(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<VeterinaryAssessment>, ApiError> {
    let content = request.message.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message exceeds the maximum length of {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let assessment = tokio::task::spawn_blocking(move || {
        let conn = ctx.open_db()?;
        let reconciler =
            SessionReconciler::new(&conn, ctx.diagnostics.as_ref(), ctx.extractor.as_ref());
        reconciler.process_message(&id, &content)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("message task failed: {e}")))??;

    Ok(Json(assessment))
}

/// `POST /sessions/:id/start-diagnosis` — clinician-initiated phase skip.
pub async fn start_diagnosis(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatSession>, ApiError> {
    let conn = ctx.open_db()?;
    let reconciler =
        SessionReconciler::new(&conn, ctx.diagnostics.as_ref(), ctx.extractor.as_ref());
    let session = reconciler.start_diagnosis(&id)?;
    tracing::info!(session_id = %id, "Diagnosis phase started by clinician");
    Ok(Json(session))
}

/// `GET /sessions/:id/patient-data` — the profile built up so far.
///
/// A session that has not collected anything yet answers with an empty
/// profile rather than a 404, so the frontend can always render the form.
pub async fn patient_data(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientData>, ApiError> {
    let conn = ctx.open_db()?;
    let session = repository::get_session(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;
    Ok(Json(session.patient_data.unwrap_or_default()))
}

/// `DELETE /sessions/:id/patient-data` — wipe the profile, keep the session.
///
/// Only the profile resets. The phase flag stays where it is: a session
/// already in the diagnosis phase does not drop back to collection.
pub async fn clear_patient_data(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClearedResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let mut session = repository::get_session(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;
    session.patient_data = Some(PatientData::default());
    repository::update_session(&conn, &session)?;
    tracing::info!(session_id = %id, "Patient data cleared");
    Ok(Json(ClearedResponse {
        message: "Patient data cleared successfully",
    }))
}
