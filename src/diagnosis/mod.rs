pub mod assistant;
pub mod context;
pub mod parser;
pub mod reconciler;
pub mod types;

pub use assistant::*;
pub use context::*;
pub use parser::*;
pub use reconciler::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Cannot reach the assistant service at {0}")]
    Connection(String),

    #[error("Assistant credentials are not configured")]
    NotConfigured,

    #[error("Assistant returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Assistant run did not complete within {0}s")]
    Timeout(u64),

    #[error("Assistant run ended with status '{status}'")]
    RunFailed { status: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed assistant response: {0}")]
    MalformedResponse(String),
}
