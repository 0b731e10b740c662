use super::DiagnosisError;
use crate::models::ChatMessage;

/// One reply from the diagnostic collaborator.
#[derive(Debug, Clone)]
pub struct DiagnosticReply {
    /// Conversation handle to store on the session for thread continuity.
    pub thread_id: Option<String>,
    /// Raw reply text. Either a JSON assessment or free prose.
    pub text: String,
}

/// A failed exchange. Carries the conversation handle when one was
/// established before the failure, so the session keeps it for later turns.
#[derive(Debug)]
pub struct SubmitError {
    pub thread_id: Option<String>,
    pub error: DiagnosisError,
}

impl From<DiagnosisError> for SubmitError {
    fn from(error: DiagnosisError) -> Self {
        Self {
            thread_id: None,
            error,
        }
    }
}

/// Abstraction over the LLM-backed diagnostic backend.
///
/// `prior` is the recent-message window in chronological order, excluding
/// the message being submitted. Implementations that keep server-side
/// conversation state use it only when opening a fresh thread. Both the
/// reply and the error report the conversation handle in use.
pub trait DiagnosticClient {
    fn submit(
        &self,
        thread_id: Option<&str>,
        prior: &[ChatMessage],
        content: &str,
    ) -> Result<DiagnosticReply, SubmitError>;
}
