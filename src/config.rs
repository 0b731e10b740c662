use std::env;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "NeuroVet";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP bind address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";

/// Seconds an assistant run may sit queued or in progress before the turn
/// is abandoned and the fallback assessment answers instead.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

/// Get the application data directory
/// ~/NeuroVet/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("NeuroVet")
}

/// Default SQLite database location under the data directory
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("neurovet.db")
}

/// Tracing filter applied when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "neurovet=info,tower_http=info"
}

/// Runtime settings, read from the environment once at startup.
///
/// Keys that gate an integration (`OPENAI_API_KEY`, `RESEND_API_KEY`) are
/// optional: without them the server still runs, with the diagnostic
/// fallback and the logging mailer standing in.
#[derive(Debug, Clone)]
pub struct Config {
    /// `NEUROVET_ADDR` — address the HTTP server binds.
    pub addr: String,
    /// `DATABASE_PATH` — SQLite file, defaults under `~/NeuroVet/`.
    pub database_path: PathBuf,
    /// `OPENAI_API_KEY`
    pub openai_api_key: Option<String>,
    /// `OPENAI_ASSISTANT_ID`
    pub openai_assistant_id: Option<String>,
    /// `OPENAI_BASE_URL` — override for proxies and self-hosted gateways.
    pub openai_base_url: String,
    /// `OPENAI_RUN_TIMEOUT_SECS`
    pub run_timeout_secs: u64,
    /// `RESEND_API_KEY`
    pub resend_api_key: Option<String>,
    /// `FROM_EMAIL` — sender of verification mail.
    pub from_email: String,
    /// `FRONTEND_URL` — origin the verification links point at.
    pub frontend_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            addr: env::var("NEUROVET_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into()),
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_database_path()),
            openai_api_key: non_empty(env::var("OPENAI_API_KEY")),
            openai_assistant_id: non_empty(env::var("OPENAI_ASSISTANT_ID")),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| crate::diagnosis::DEFAULT_OPENAI_BASE_URL.into()),
            run_timeout_secs: env::var("OPENAI_RUN_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RUN_TIMEOUT_SECS),
            resend_api_key: non_empty(env::var("RESEND_API_KEY")),
            from_email: env::var("FROM_EMAIL").unwrap_or_else(|_| "onboarding@resend.dev".into()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        }
    }
}

/// A key set to the empty string counts as unset.
fn non_empty(var: Result<String, env::VarError>) -> Option<String> {
    var.ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("NeuroVet"));
    }

    #[test]
    fn database_path_under_app_data() {
        let db = default_database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("neurovet.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.6.0");
    }

    #[test]
    fn blank_keys_count_as_unset() {
        assert_eq!(non_empty(Ok(String::new())), None);
        assert_eq!(non_empty(Ok("   ".to_string())), None);
        assert_eq!(non_empty(Err(env::VarError::NotPresent)), None);
        assert_eq!(
            non_empty(Ok("sk-test".to_string())),
            Some("sk-test".to_string())
        );
    }
}
