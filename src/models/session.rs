//! Chat session aggregate: one consultation thread with its collected
//! patient data, latest assessment, and collection-phase flag.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::assessment::VeterinaryAssessment;
use super::patient::PatientData;

#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Human-readable handle, derived from the first user message and
    /// immutable once set.
    pub slug: Option<String>,
    pub user_id: Option<Uuid>,
    /// Conversation handle on the diagnostic service, reused across turns.
    /// Provider-internal, never exposed in API responses.
    #[serde(skip)]
    pub assistant_thread_id: Option<String>,
    pub patient_data: Option<PatientData>,
    pub current_assessment: Option<VeterinaryAssessment>,
    pub is_collecting_data: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            slug: None,
            user_id: None,
            assistant_thread_id: None,
            patient_data: None,
            current_assessment: None,
            is_collecting_data: true,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Derive the slug from a message. No-op when a slug already exists.
    pub fn set_slug_from(&mut self, message: &str) {
        if self.slug.is_none() {
            self.slug = Some(derive_slug(message, &self.id));
            self.touch();
        }
    }

    pub fn set_thread(&mut self, thread_id: impl Into<String>) {
        let thread_id = thread_id.into();
        if self.assistant_thread_id.as_deref() != Some(thread_id.as_str()) {
            self.assistant_thread_id = Some(thread_id);
            self.touch();
        }
    }

    pub fn link_user(&mut self, user_id: Uuid) {
        self.user_id = Some(user_id);
        self.touch();
    }

    pub fn patient_data_mut(&mut self) -> &mut PatientData {
        self.patient_data.get_or_insert_with(PatientData::default)
    }

    /// Replace the stored assessment wholesale. The previous one only
    /// survives in the message history.
    pub fn update_assessment(&mut self, assessment: VeterinaryAssessment) {
        self.current_assessment = Some(assessment);
        self.touch();
    }

    /// Leave the collection phase once the patient profile is complete.
    /// Returns true when the flag flipped on this call. Never flips back.
    pub fn sync_collection_phase(&mut self) -> bool {
        let complete = self
            .patient_data
            .as_ref()
            .map(|d| d.is_complete)
            .unwrap_or(false);
        if self.is_collecting_data && complete {
            self.is_collecting_data = false;
            self.touch();
            return true;
        }
        false
    }

    /// Force the diagnosis phase regardless of missing fields.
    pub fn start_diagnosis(&mut self) {
        if self.is_collecting_data {
            self.is_collecting_data = false;
            self.touch();
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a URL-safe slug from free text plus a short id suffix for
/// uniqueness. French diacritics fold to their base letters.
pub fn derive_slug(message: &str, session_id: &Uuid) -> String {
    let mut folded = String::with_capacity(message.len());
    for c in message.to_lowercase().chars() {
        match c {
            'à' | 'â' | 'ä' => folded.push('a'),
            'é' | 'è' | 'ê' | 'ë' => folded.push('e'),
            'î' | 'ï' => folded.push('i'),
            'ô' | 'ö' => folded.push('o'),
            'ù' | 'û' | 'ü' => folded.push('u'),
            'ç' => folded.push('c'),
            'œ' => folded.push_str("oe"),
            'æ' => folded.push_str("ae"),
            _ => folded.push(c),
        }
    }

    let mut base = String::new();
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            base.push(c);
        } else if !base.is_empty() && !base.ends_with('-') {
            base.push('-');
        }
    }
    let mut base: String = base.trim_end_matches('-').chars().take(60).collect();
    base = base.trim_end_matches('-').to_string();
    if base.is_empty() {
        base = "session".to_string();
    }

    let id = session_id.simple().to_string();
    format!("{base}-{}", &id[..8])
}
