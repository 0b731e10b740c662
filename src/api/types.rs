//! Shared state for the HTTP layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;

use crate::auth::VerificationMailer;
use crate::db::DatabaseError;
use crate::diagnosis::DiagnosticClient;
use crate::extraction::{ClinicalExtractor, Lexicon};
use crate::models::User;

/// Shared context for all routes and middleware.
///
/// Handlers open their own SQLite connection per request; WAL mode plus a
/// busy timeout make the concurrent opens safe. The extractor is compiled
/// once and shared, the collaborator clients are trait objects so tests can
/// swap in mocks.
#[derive(Clone)]
pub struct ApiContext {
    db_path: Arc<PathBuf>,
    pub diagnostics: Arc<dyn DiagnosticClient + Send + Sync>,
    pub mailer: Arc<dyn VerificationMailer + Send + Sync>,
    pub extractor: Arc<ClinicalExtractor>,
}

impl ApiContext {
    pub fn new(
        db_path: PathBuf,
        diagnostics: Arc<dyn DiagnosticClient + Send + Sync>,
        mailer: Arc<dyn VerificationMailer + Send + Sync>,
    ) -> Self {
        Self {
            db_path: Arc::new(db_path),
            diagnostics,
            mailer,
            extractor: Arc::new(ClinicalExtractor::new(Lexicon::standard())),
        }
    }

    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        crate::db::open_database(&self.db_path)
    }
}

/// Authenticated account, injected into request extensions by the auth
/// middleware after access-token validation.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}
