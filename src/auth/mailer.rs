use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Resend transactional e-mail endpoint.
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Cannot reach the mail service at {0}")]
    Connection(String),

    #[error("Mail service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Delivery of account-verification e-mails. Registration treats a delivery
/// failure as non-fatal; explicit resends surface it.
pub trait VerificationMailer {
    fn send_verification(
        &self,
        email: &str,
        first_name: &str,
        token: &str,
    ) -> Result<(), MailerError>;
}

/// Blocking client for the Resend HTTP API.
pub struct ResendMailer {
    api_url: String,
    api_key: String,
    from: String,
    frontend_url: String,
    client: reqwest::blocking::Client,
}

impl ResendMailer {
    pub fn new(api_url: &str, api_key: &str, from: &str, frontend_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn verification_body(&self, first_name: &str, token: &str) -> String {
        let verification_url = format!("{}/verify-email?token={}", self.frontend_url, token);
        format!(
            r#"<html>
    <body>
        <h2>Bienvenue sur NeuroVet, {first_name}!</h2>
        <p>Merci de vous être inscrit. Veuillez cliquer sur le lien ci-dessous pour vérifier votre adresse email:</p>
        <p><a href="{verification_url}">Vérifier mon email</a></p>
        <p>Ce lien expirera dans 7 jours.</p>
        <p>Si vous n'avez pas créé de compte, vous pouvez ignorer cet email.</p>
        <br>
        <p>L'équipe NeuroVet</p>
    </body>
</html>"#
        )
    }
}

impl VerificationMailer for ResendMailer {
    fn send_verification(
        &self,
        email: &str,
        first_name: &str,
        token: &str,
    ) -> Result<(), MailerError> {
        let body = SendMailRequest {
            from: &self.from,
            to: vec![email],
            subject: "NeuroVet - Vérifiez votre adresse email",
            html: &self.verification_body(first_name, token),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    MailerError::Connection(self.api_url.clone())
                } else {
                    MailerError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MailerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(recipient = %email, "Verification email sent");
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

/// Used when no mail API key is configured: logs the link instead of
/// sending, so local setups can still complete verification by hand.
pub struct NullMailer {
    frontend_url: String,
}

impl NullMailer {
    pub fn new(frontend_url: &str) -> Self {
        Self {
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }
}

impl VerificationMailer for NullMailer {
    fn send_verification(
        &self,
        email: &str,
        _first_name: &str,
        token: &str,
    ) -> Result<(), MailerError> {
        tracing::info!(
            recipient = %email,
            url = %format!("{}/verify-email?token={}", self.frontend_url, token),
            "Mail delivery disabled; verification link logged"
        );
        Ok(())
    }
}

/// What the mock saw for one send call.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub email: String,
    pub first_name: String,
    pub token: String,
}

/// Mock mailer for testing — records every send, optionally failing them.
pub struct MockMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: false,
        }
    }

    /// Make every send fail after recording it.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationMailer for MockMailer {
    fn send_verification(
        &self,
        email: &str,
        first_name: &str,
        token: &str,
    ) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentMail {
            email: email.to_string(),
            first_name: first_name.to_string(),
            token: token.to_string(),
        });

        if self.failing {
            return Err(MailerError::Api {
                status: 422,
                body: "{\"message\":\"domain not verified\"}".to_string(),
            });
        }
        Ok(())
    }
}
