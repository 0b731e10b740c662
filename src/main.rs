use std::sync::Arc;

use neurovet::api::{api_router, ApiContext};
use neurovet::auth::{NullMailer, ResendMailer, VerificationMailer, DEFAULT_RESEND_API_URL};
use neurovet::config::{Config, APP_VERSION};
use neurovet::db::{self, repository};
use neurovet::diagnosis::{AssistantClient, DiagnosticClient, UnconfiguredClient};

#[tokio::main]
async fn main() {
    neurovet::init_tracing();

    let cfg = Config::from_env();
    tracing::info!("NeuroVet starting v{}", APP_VERSION);

    // One eager open runs the migrations and seeds the reference lists;
    // request handlers open their own connections afterwards.
    if let Some(dir) = cfg.database_path.parent() {
        std::fs::create_dir_all(dir).expect("Cannot create data directory");
    }
    let conn = db::open_database(&cfg.database_path).expect("Cannot open database");
    repository::seed_reference_data(&conn).expect("Cannot seed reference data");
    drop(conn);
    tracing::info!(path = %cfg.database_path.display(), "Database ready");

    let diagnostics: Arc<dyn DiagnosticClient + Send + Sync> =
        match (&cfg.openai_api_key, &cfg.openai_assistant_id) {
            (Some(key), Some(assistant_id)) => Arc::new(AssistantClient::new(
                &cfg.openai_base_url,
                key,
                assistant_id,
                cfg.run_timeout_secs,
            )),
            _ => {
                tracing::warn!(
                    "OPENAI_API_KEY / OPENAI_ASSISTANT_ID not set; \
                     diagnostic turns will return the technical-failure assessment"
                );
                Arc::new(UnconfiguredClient)
            }
        };

    let mailer: Arc<dyn VerificationMailer + Send + Sync> = match &cfg.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(
            DEFAULT_RESEND_API_URL,
            key,
            &cfg.from_email,
            &cfg.frontend_url,
        )),
        None => {
            tracing::warn!("RESEND_API_KEY not set; verification links will only be logged");
            Arc::new(NullMailer::new(&cfg.frontend_url))
        }
    };

    let app = api_router(ApiContext::new(cfg.database_path, diagnostics, mailer));

    let listener = tokio::net::TcpListener::bind(&cfg.addr)
        .await
        .expect("Cannot bind server address");
    tracing::info!("NeuroVet API listening on {}", cfg.addr);
    axum::serve(listener, app).await.expect("Server failed");
}
