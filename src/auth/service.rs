//! Account flows: registration, e-mail verification, login, token refresh,
//! and session ownership. Raw tokens are returned to the caller exactly
//! once; the database only ever sees their hashes.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use super::mailer::VerificationMailer;
use super::password::{hash_password, verify_password};
use super::tokens::{generate_token, hash_token};
use super::AuthError;
use crate::db::repository;
use crate::models::{AccessToken, ChatSession, ProfileFields, RefreshToken, User};

pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Registration input. Everything beyond name and credentials is optional
/// profile detail (clinic, ordinal number, specialty, student status).
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub profile: ProfileFields,
}

/// Raw token pair handed out at login and refresh.
#[derive(Debug)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

pub struct AuthService<'a> {
    conn: &'a Connection,
    mailer: &'a dyn VerificationMailer,
}

impl<'a> AuthService<'a> {
    pub fn new(conn: &'a Connection, mailer: &'a dyn VerificationMailer) -> Self {
        Self { conn, mailer }
    }

    /// Create an unverified account and send the verification link.
    /// Delivery failure is logged, not raised: the clinician can request a
    /// resend once the mail service recovers.
    pub fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let email = registration.email.trim().to_lowercase();
        if repository::email_exists(self.conn, &email)? {
            return Err(AuthError::EmailTaken(email));
        }

        let token = generate_token();
        let user = User::new(
            email,
            hash_password(&registration.password),
            registration.first_name,
            registration.last_name,
            registration.profile,
            token.clone(),
        );
        repository::insert_user(self.conn, &user)?;

        if let Err(e) = self
            .mailer
            .send_verification(&user.email, &user.first_name, &token)
        {
            tracing::warn!(email = %user.email, error = %e, "Verification email failed to send");
        }

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Redeem a verification link. Verifying an already-verified account is
    /// a success no-op; the token is consumed on first use.
    pub fn verify_email(&self, token: &str) -> Result<User, AuthError> {
        let mut user = repository::get_user_by_verification_token(self.conn, token)?
            .ok_or(AuthError::InvalidVerificationToken)?;

        if user.is_verified {
            return Ok(user);
        }
        if !user.verification_token_valid() {
            return Err(AuthError::VerificationTokenExpired);
        }

        user.verify_email();
        repository::update_user(self.conn, &user)?;

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    /// Issue a fresh verification token and send it again. Rotating means an
    /// expired link can always be recovered from.
    pub fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();
        let mut user =
            repository::get_user_by_email(self.conn, &email)?.ok_or(AuthError::UnknownEmail)?;

        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let token = generate_token();
        user.rotate_verification_token(token.clone());
        repository::update_user(self.conn, &user)?;

        self.mailer
            .send_verification(&user.email, &user.first_name, &token)
            .map_err(|e| {
                tracing::warn!(email = %user.email, error = %e, "Verification resend failed");
                AuthError::MailDelivery
            })
    }

    /// Exchange credentials for a token pair. Unknown e-mail and wrong
    /// password are deliberately indistinguishable.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AuthError> {
        let email = email.trim().to_lowercase();
        let user =
            repository::get_user_by_email(self.conn, &email)?.ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.hashed_password) {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let tokens = self.issue_tokens(user)?;
        tracing::info!(user_id = %tokens.user.id, "User logged in");
        Ok(tokens)
    }

    /// Exchange a refresh token for a fresh pair. The used token is revoked,
    /// so every refresh token works at most once.
    pub fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let stored = repository::get_refresh_token_by_hash(self.conn, &hash_token(refresh_token))?
            .ok_or(AuthError::InvalidRefreshToken)?;
        if !stored.is_valid() {
            return Err(AuthError::InvalidRefreshToken);
        }

        let user =
            repository::get_user(self.conn, &stored.user_id)?.ok_or(AuthError::MissingUser)?;
        if !user.is_verified {
            return Err(AuthError::UnverifiedUser);
        }

        repository::revoke_refresh_token(self.conn, &stored.id)?;
        self.issue_tokens(user)
    }

    /// Resolve the account behind a bearer access token.
    pub fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let stored = repository::get_access_token(self.conn, &hash_token(access_token))?
            .ok_or(AuthError::InvalidAccessToken)?;
        if !stored.is_valid() {
            return Err(AuthError::InvalidAccessToken);
        }

        repository::get_user(self.conn, &stored.user_id)?.ok_or(AuthError::MissingUser)
    }

    pub fn update_profile(
        &self,
        user_id: &Uuid,
        first_name: &str,
        last_name: &str,
        profile: ProfileFields,
    ) -> Result<User, AuthError> {
        let mut user = repository::get_user(self.conn, user_id)?.ok_or(AuthError::MissingUser)?;

        user.first_name = first_name.to_string();
        user.last_name = last_name.to_string();
        user.apply_profile(profile);
        repository::update_user(self.conn, &user)?;

        Ok(user)
    }

    /// Attach an anonymous chat session to an account, exactly once.
    pub fn link_session(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<ChatSession, AuthError> {
        let mut session = repository::get_session(self.conn, session_id)?
            .ok_or_else(|| crate::db::DatabaseError::not_found("Session", session_id))?;

        if session.user_id.is_some() {
            return Err(AuthError::SessionAlreadyLinked);
        }

        session.link_user(*user_id);
        repository::update_session(self.conn, &session)?;

        tracing::info!(session_id = %session.id, user_id = %user_id, "Session linked to user");
        Ok(session)
    }

    pub fn user_sessions(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, AuthError> {
        Ok(repository::list_sessions_for_user(self.conn, user_id)?)
    }

    /// Mint, store (hashed), and return a raw access + refresh pair. Expired
    /// leftovers are pruned on the way, inside the same transaction.
    fn issue_tokens(&self, user: User) -> Result<AuthTokens, AuthError> {
        let access_token = generate_token();
        let refresh_token = generate_token();

        let tx = self.conn.unchecked_transaction().map_err(crate::db::DatabaseError::from)?;
        repository::prune_expired_tokens(&tx, Utc::now())?;
        repository::insert_access_token(
            &tx,
            &AccessToken::new(user.id, hash_token(&access_token), ACCESS_TOKEN_TTL_MINUTES),
        )?;
        repository::insert_refresh_token(
            &tx,
            &RefreshToken::new(user.id, hash_token(&refresh_token), REFRESH_TOKEN_TTL_DAYS),
        )?;
        tx.commit().map_err(crate::db::DatabaseError::from)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            user,
        })
    }
}
