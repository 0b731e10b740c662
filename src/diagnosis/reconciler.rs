//! Per-message reconciliation: one inbound clinician message becomes an
//! updated patient profile, a fresh assessment, and (possibly) a phase
//! transition from data collection to diagnosis.
//!
//! Diagnostic-service failures never escape this module; they degrade into
//! fallback assessments so the conversation always gets an answer.

use rusqlite::Connection;
use uuid::Uuid;

use super::context::with_context;
use super::parser::interpret_reply;
use super::types::DiagnosticClient;
use crate::db::{repository, DatabaseError};
use crate::extraction::{ClinicalExtractor, ExtractedFields};
use crate::models::{
    ChatMessage, ChatSession, PatientData, PatientFragment, VeterinaryAssessment,
};

/// Most recent messages handed to the diagnostic service as context.
const CONTEXT_WINDOW: usize = 20;

pub struct SessionReconciler<'a, C: DiagnosticClient + ?Sized> {
    conn: &'a Connection,
    client: &'a C,
    extractor: &'a ClinicalExtractor,
}

impl<'a, C: DiagnosticClient + ?Sized> SessionReconciler<'a, C> {
    pub fn new(conn: &'a Connection, client: &'a C, extractor: &'a ClinicalExtractor) -> Self {
        Self {
            conn,
            client,
            extractor,
        }
    }

    /// Run one full turn for a session. Returns the assessment stored on the
    /// session, which is also what the API hands back to the caller.
    pub fn process_message(
        &self,
        session_id: &Uuid,
        content: &str,
    ) -> Result<VeterinaryAssessment, DatabaseError> {
        let mut session = repository::get_session(self.conn, session_id)?
            .ok_or_else(|| DatabaseError::not_found("Session", session_id))?;

        // Inbound message first, verbatim; the first one names the session.
        let user_message = ChatMessage::user(session.id, content);
        repository::insert_chat_message(self.conn, &user_message)?;
        session.set_slug_from(content);

        // Local extraction, merged idempotently into the aggregate.
        let fields = self.extractor.extract(content);
        if !fields.is_empty() {
            merge_extracted(session.patient_data_mut(), &fields);
        }
        if session.sync_collection_phase() {
            tracing::info!(session_id = %session.id, "Patient profile complete, entering diagnosis phase");
        }

        // Recent window (without the message being sent) plus patient context.
        let mut window = repository::get_recent_messages(self.conn, session_id, CONTEXT_WINDOW)?;
        if window.last().map(|m| m.id) == Some(user_message.id) {
            window.pop();
        }
        let outbound = with_context(session.patient_data.as_ref(), content);

        let reply = self
            .client
            .submit(session.assistant_thread_id.as_deref(), &window, &outbound);

        let assessment = match reply {
            Ok(reply) => {
                if let Some(thread_id) = reply.thread_id {
                    session.set_thread(thread_id);
                }
                interpret_reply(&reply.text)
            }
            Err(failure) => {
                // A thread opened for this turn outlives the failed run.
                if let Some(thread_id) = failure.thread_id {
                    session.set_thread(thread_id);
                }
                tracing::warn!(session_id = %session.id, error = %failure.error, "Diagnostic call failed");
                VeterinaryAssessment::service_failure(&failure.error.to_string())
            }
        };

        // The service may report patient fields of its own; same merge rules.
        if let Some(fragment) = &assessment.patient_data {
            merge_fragment(session.patient_data_mut(), fragment);
            if session.sync_collection_phase() {
                tracing::info!(session_id = %session.id, "Patient profile complete, entering diagnosis phase");
            }
        }

        let assistant_message = ChatMessage::assistant(
            session.id,
            format!("Assessment: {}", assessment.assessment),
            assessment.status,
            assessment.question_opt(),
        );
        session.update_assessment(assessment.clone());

        // Reply and session state land together or not at all.
        let tx = self.conn.unchecked_transaction()?;
        repository::insert_chat_message(&tx, &assistant_message)?;
        repository::update_session(&tx, &session)?;
        tx.commit()?;

        Ok(assessment)
    }

    /// Clinician-initiated skip of data collection. The profile may still be
    /// incomplete; the phase flips anyway and never flips back.
    pub fn start_diagnosis(&self, session_id: &Uuid) -> Result<ChatSession, DatabaseError> {
        let mut session = repository::get_session(self.conn, session_id)?
            .ok_or_else(|| DatabaseError::not_found("Session", session_id))?;
        session.start_diagnosis();
        repository::update_session(self.conn, &session)?;
        Ok(session)
    }
}

fn merge_extracted(data: &mut PatientData, fields: &ExtractedFields) {
    data.set_basic_info(
        fields.age.as_deref(),
        fields.sex.as_deref(),
        fields.breed.as_deref(),
        fields.weight.as_deref(),
    );
    for symptom in &fields.symptoms {
        data.add_symptom(symptom);
    }
}

fn merge_fragment(data: &mut PatientData, fragment: &PatientFragment) {
    data.set_basic_info(
        fragment.age.as_deref(),
        fragment.sex.as_deref(),
        fragment.race.as_deref(),
        fragment.weight.as_deref(),
    );
    for symptom in &fragment.symptoms {
        data.add_symptom(symptom);
    }
    data.set_symptom_details(
        fragment.symptom_duration.as_deref(),
        fragment.symptom_progression.as_deref(),
    );
    for item in &fragment.medical_history {
        data.add_medical_history(item);
    }
    for medication in &fragment.current_medications {
        data.add_medication(medication);
    }
}
