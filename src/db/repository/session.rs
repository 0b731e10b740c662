use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde_json::Value;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{ChatSession, PatientData, VeterinaryAssessment};

pub fn insert_session(conn: &Connection, session: &ChatSession) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO chat_sessions
         (id, created_at, updated_at, slug, user_id, assistant_thread_id,
          patient_data, current_assessment, is_collecting_data)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            session.id.to_string(),
            session.created_at,
            session.updated_at,
            session.slug,
            session.user_id.map(|id| id.to_string()),
            session.assistant_thread_id,
            encode_patient_data(session)?,
            encode_assessment(session)?,
            session.is_collecting_data as i32,
        ],
    )?;
    Ok(())
}

/// Persist every mutable session column. Callers mutate the aggregate in
/// memory and write it back whole; the previous row is overwritten.
pub fn update_session(conn: &Connection, session: &ChatSession) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE chat_sessions
         SET updated_at = ?2, slug = ?3, user_id = ?4, assistant_thread_id = ?5,
             patient_data = ?6, current_assessment = ?7, is_collecting_data = ?8
         WHERE id = ?1",
        params![
            session.id.to_string(),
            session.updated_at,
            session.slug,
            session.user_id.map(|id| id.to_string()),
            session.assistant_thread_id,
            encode_patient_data(session)?,
            encode_assessment(session)?,
            session.is_collecting_data as i32,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("Session", session.id));
    }
    Ok(())
}

pub fn get_session(conn: &Connection, id: &Uuid) -> Result<Option<ChatSession>, DatabaseError> {
    query_session(
        conn,
        "SELECT id, created_at, updated_at, slug, user_id, assistant_thread_id,
                patient_data, current_assessment, is_collecting_data
         FROM chat_sessions WHERE id = ?1",
        &id.to_string(),
    )
}

pub fn get_session_by_slug(
    conn: &Connection,
    slug: &str,
) -> Result<Option<ChatSession>, DatabaseError> {
    query_session(
        conn,
        "SELECT id, created_at, updated_at, slug, user_id, assistant_thread_id,
                patient_data, current_assessment, is_collecting_data
         FROM chat_sessions WHERE slug = ?1",
        slug,
    )
}

pub fn list_sessions_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<ChatSession>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, created_at, updated_at, slug, user_id, assistant_thread_id,
                patient_data, current_assessment, is_collecting_data
         FROM chat_sessions WHERE user_id = ?1 ORDER BY updated_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], session_row)?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(session_from_row(row?)?);
    }
    Ok(sessions)
}

fn query_session(
    conn: &Connection,
    sql: &str,
    key: &str,
) -> Result<Option<ChatSession>, DatabaseError> {
    let result = conn.query_row(sql, params![key], session_row);
    match result {
        Ok(row) => Ok(Some(session_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct SessionRow {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    slug: Option<String>,
    user_id: Option<String>,
    assistant_thread_id: Option<String>,
    patient_data: Option<String>,
    current_assessment: Option<String>,
    is_collecting_data: i32,
}

fn session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        created_at: row.get(1)?,
        updated_at: row.get(2)?,
        slug: row.get(3)?,
        user_id: row.get(4)?,
        assistant_thread_id: row.get(5)?,
        patient_data: row.get(6)?,
        current_assessment: row.get(7)?,
        is_collecting_data: row.get(8)?,
    })
}

fn session_from_row(row: SessionRow) -> Result<ChatSession, DatabaseError> {
    let patient_data = match row.patient_data.as_deref() {
        Some(blob) => Some(serde_json::from_str::<PatientData>(blob)?),
        None => None,
    };
    // Assessments decode leniently; an unreadable blob reads as absent
    // rather than poisoning the whole session.
    let current_assessment = row
        .current_assessment
        .as_deref()
        .and_then(|blob| serde_json::from_str::<Value>(blob).ok())
        .and_then(|value| VeterinaryAssessment::from_value(&value));

    Ok(ChatSession {
        id: parse_uuid(&row.id)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
        slug: row.slug,
        user_id: row.user_id.as_deref().map(parse_uuid).transpose()?,
        assistant_thread_id: row.assistant_thread_id,
        patient_data,
        current_assessment,
        is_collecting_data: row.is_collecting_data != 0,
    })
}

fn encode_patient_data(session: &ChatSession) -> Result<Option<String>, DatabaseError> {
    session
        .patient_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(Into::into)
}

fn encode_assessment(session: &ChatSession) -> Result<Option<String>, DatabaseError> {
    session
        .current_assessment
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(Into::into)
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
