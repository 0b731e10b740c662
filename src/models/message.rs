use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AssessmentStatus, MessageRole};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    /// Assessment status echoed on assistant turns.
    pub status: Option<AssessmentStatus>,
    /// Follow-up question attached to assistant turns.
    pub question: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(session_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role: MessageRole::User,
            content: content.into(),
            status: None,
            question: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(
        session_id: Uuid,
        content: impl Into<String>,
        status: AssessmentStatus,
        question: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role: MessageRole::Assistant,
            content: content.into(),
            status: Some(status),
            question,
            timestamp: Utc::now(),
        }
    }
}
