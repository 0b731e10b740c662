use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::session::parse_uuid;
use crate::db::DatabaseError;
use crate::models::{AssessmentStatus, ChatMessage, MessageRole};

pub fn insert_chat_message(conn: &Connection, msg: &ChatMessage) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO chat_messages (id, session_id, role, content, status, question, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            msg.id.to_string(),
            msg.session_id.to_string(),
            msg.role.as_str(),
            msg.content,
            msg.status.as_ref().map(|s| s.as_str()),
            msg.question,
            msg.timestamp,
        ],
    )?;
    Ok(())
}

/// Full history of one session, oldest first.
pub fn get_session_messages(
    conn: &Connection,
    session_id: &Uuid,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, role, content, status, question, timestamp
         FROM chat_messages WHERE session_id = ?1 ORDER BY timestamp ASC",
    )?;

    let rows = stmt.query_map(params![session_id.to_string()], message_row)?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

/// Most recent `limit` messages, returned oldest first so the window reads
/// chronologically.
pub fn get_recent_messages(
    conn: &Connection,
    session_id: &Uuid,
    limit: usize,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, role, content, status, question, timestamp
         FROM chat_messages WHERE session_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![session_id.to_string(), limit as i64], message_row)?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    messages.reverse();
    Ok(messages)
}

pub fn count_user_messages(conn: &Connection, session_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM chat_messages WHERE session_id = ?1 AND role = 'user'",
        params![session_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

struct MessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    status: Option<String>,
    question: Option<String>,
    timestamp: DateTime<Utc>,
}

fn message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        status: row.get(4)?,
        question: row.get(5)?,
        timestamp: row.get(6)?,
    })
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, DatabaseError> {
    Ok(ChatMessage {
        id: parse_uuid(&row.id)?,
        session_id: parse_uuid(&row.session_id)?,
        role: MessageRole::from_str(&row.role)?,
        content: row.content,
        // Unknown stored statuses read as absent instead of failing the load.
        status: row.status.as_deref().and_then(|s| AssessmentStatus::from_str(s).ok()),
        question: row.question,
        timestamp: row.timestamp,
    })
}
