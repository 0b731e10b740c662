//! Account subsystem: registration with e-mail verification, password
//! hashing, opaque bearer tokens, and session ownership.

pub mod mailer;
pub mod password;
pub mod service;
pub mod tokens;

pub use mailer::*;
pub use password::*;
pub use service::*;
pub use tokens::*;

use thiserror::Error;

use crate::db::DatabaseError;

/// Error messages are API-visible and kept verbatim; the service has always
/// mixed French clinician-facing text with English token-flow text.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User with email {0} already exists")]
    EmailTaken(String),

    /// Login refusal. Unknown e-mail and wrong password are indistinguishable.
    #[error("Email ou mot de passe invalide")]
    InvalidCredentials,

    /// Login refusal for an account that never verified its e-mail.
    #[error("Email non vérifié. Veuillez vérifier votre boîte de réception pour l'email de vérification.")]
    EmailNotVerified,

    #[error("Invalid verification token")]
    InvalidVerificationToken,

    #[error("Verification token has expired. Please request a new one.")]
    VerificationTokenExpired,

    #[error("Email déjà vérifié")]
    AlreadyVerified,

    /// Resend-verification lookup failed.
    #[error("Utilisateur non trouvé")]
    UnknownEmail,

    #[error("Échec de l'envoi de l'email")]
    MailDelivery,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// A valid token points at an account that no longer exists.
    #[error("User not found")]
    MissingUser,

    /// Refresh refusal for an account whose verification was withdrawn.
    #[error("User email not verified")]
    UnverifiedUser,

    #[error("Could not validate credentials")]
    InvalidAccessToken,

    #[error("Session is already linked to a user")]
    SessionAlreadyLinked,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
