use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::types::{DiagnosticClient, DiagnosticReply, SubmitError};
use super::DiagnosisError;
use crate::models::ChatMessage;

/// Hosted Assistant API endpoint.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Per-request HTTP timeout. The run deadline is tracked separately.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Seconds between run-status polls.
const POLL_INTERVAL_SECS: u64 = 1;

/// Blocking client for the OpenAI Assistant API (v2).
///
/// One diagnostic turn is: ensure a thread exists, append the user message,
/// start a run, poll until the run reaches a terminal status, then read the
/// newest assistant message off the thread.
pub struct AssistantClient {
    base_url: String,
    api_key: String,
    assistant_id: String,
    client: reqwest::blocking::Client,
    run_timeout_secs: u64,
}

impl AssistantClient {
    pub fn new(base_url: &str, api_key: &str, assistant_id: &str, run_timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            assistant_id: assistant_id.to_string(),
            client,
            run_timeout_secs,
        }
    }

    /// Send one request with auth + beta headers and reject non-2xx replies.
    fn dispatch(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response, DiagnosisError> {
        let response = request
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    DiagnosisError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    DiagnosisError::Timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    DiagnosisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DiagnosisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Open a new thread, seeded with the prior conversation window so the
    /// assistant keeps context even when the stored handle was lost.
    fn create_thread(&self, prior: &[ChatMessage]) -> Result<String, DiagnosisError> {
        let url = format!("{}/threads", self.base_url);
        let messages: Vec<SeedMessage> = prior
            .iter()
            .map(|m| SeedMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();
        let body = CreateThreadRequest { messages };

        let parsed: ThreadResponse = self
            .dispatch(self.client.post(&url).json(&body))?
            .json()
            .map_err(|e| DiagnosisError::MalformedResponse(e.to_string()))?;

        Ok(parsed.id)
    }

    fn append_message(&self, thread_id: &str, content: &str) -> Result<(), DiagnosisError> {
        let url = format!("{}/threads/{}/messages", self.base_url, thread_id);
        let body = SeedMessage {
            role: "user",
            content,
        };
        self.dispatch(self.client.post(&url).json(&body))?;
        Ok(())
    }

    /// Start a run and poll every second until it leaves the queue.
    fn run_to_completion(&self, thread_id: &str) -> Result<(), DiagnosisError> {
        let url = format!("{}/threads/{}/runs", self.base_url, thread_id);
        let body = CreateRunRequest {
            assistant_id: &self.assistant_id,
        };
        let mut run: RunResponse = self
            .dispatch(self.client.post(&url).json(&body))?
            .json()
            .map_err(|e| DiagnosisError::MalformedResponse(e.to_string()))?;

        let deadline = Instant::now() + Duration::from_secs(self.run_timeout_secs);
        while run.status == "queued" || run.status == "in_progress" {
            if Instant::now() >= deadline {
                return Err(DiagnosisError::Timeout(self.run_timeout_secs));
            }
            std::thread::sleep(Duration::from_secs(POLL_INTERVAL_SECS));

            let poll_url = format!("{}/threads/{}/runs/{}", self.base_url, thread_id, run.id);
            run = self
                .dispatch(self.client.get(&poll_url))?
                .json()
                .map_err(|e| DiagnosisError::MalformedResponse(e.to_string()))?;
        }

        if run.status != "completed" {
            return Err(DiagnosisError::RunFailed { status: run.status });
        }
        Ok(())
    }

    /// Read the newest message on the thread and return its text content.
    fn latest_assistant_text(&self, thread_id: &str) -> Result<String, DiagnosisError> {
        let url = format!(
            "{}/threads/{}/messages?order=desc&limit=1",
            self.base_url, thread_id
        );
        let parsed: MessageListResponse = self
            .dispatch(self.client.get(&url))?
            .json()
            .map_err(|e| DiagnosisError::MalformedResponse(e.to_string()))?;

        let message = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| DiagnosisError::MalformedResponse("Thread has no messages".into()))?;

        text_of(&message)
            .map(str::to_string)
            .ok_or_else(|| DiagnosisError::MalformedResponse("Message has no text content".into()))
    }
}

impl DiagnosticClient for AssistantClient {
    fn submit(
        &self,
        thread_id: Option<&str>,
        prior: &[ChatMessage],
        content: &str,
    ) -> Result<DiagnosticReply, SubmitError> {
        let thread_id = match thread_id {
            Some(id) => id.to_string(),
            None => self.create_thread(prior)?,
        };

        // From here on the thread exists server-side; failures report it so
        // the caller can keep the handle.
        let exchange = self
            .append_message(&thread_id, content)
            .and_then(|()| self.run_to_completion(&thread_id))
            .and_then(|()| self.latest_assistant_text(&thread_id));

        match exchange {
            Ok(text) => Ok(DiagnosticReply {
                thread_id: Some(thread_id),
                text,
            }),
            Err(error) => Err(SubmitError {
                thread_id: Some(thread_id),
                error,
            }),
        }
    }
}

/// Stand-in used when no assistant credentials are configured.
///
/// Every turn fails with `NotConfigured`, which the reconciler folds into
/// the technical-failure assessment, so the chat surface stays usable on a
/// box without an API key.
pub struct UnconfiguredClient;

impl DiagnosticClient for UnconfiguredClient {
    fn submit(
        &self,
        _thread_id: Option<&str>,
        _prior: &[ChatMessage],
        _content: &str,
    ) -> Result<DiagnosticReply, SubmitError> {
        Err(DiagnosisError::NotConfigured.into())
    }
}

/// First text-type content item of a thread message.
fn text_of(message: &ThreadMessageData) -> Option<&str> {
    message
        .content
        .iter()
        .find(|c| c.kind == "text")
        .and_then(|c| c.text.as_ref())
        .map(|t| t.value.as_str())
}

// ── Wire types (Assistant API v2) ──

#[derive(Serialize)]
struct CreateThreadRequest<'a> {
    messages: Vec<SeedMessage<'a>>,
}

#[derive(Serialize)]
struct SeedMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ThreadResponse {
    id: String,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Deserialize)]
struct RunResponse {
    id: String,
    status: String,
}

#[derive(Deserialize)]
struct MessageListResponse {
    data: Vec<ThreadMessageData>,
}

#[derive(Deserialize)]
struct ThreadMessageData {
    content: Vec<MessageContent>,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(rename = "type")]
    kind: String,
    text: Option<MessageText>,
}

#[derive(Deserialize)]
struct MessageText {
    value: String,
}

/// What the mock saw for one submit call.
#[derive(Debug, Clone)]
pub struct SubmittedTurn {
    pub thread_id: Option<String>,
    pub prior_len: usize,
    pub content: String,
}

/// Mock diagnostic client for testing — replays scripted replies in order,
/// then falls back to a fixed reply, recording every submission.
pub struct MockDiagnosticClient {
    scripted: Mutex<VecDeque<Result<String, DiagnosisError>>>,
    fallback: String,
    thread_id: Option<String>,
    turns: Mutex<Vec<SubmittedTurn>>,
}

impl MockDiagnosticClient {
    pub fn new(fallback_reply: &str) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: fallback_reply.to_string(),
            thread_id: Some("thread-mock".to_string()),
            turns: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply served before the fallback kicks in.
    pub fn with_reply(self, reply: &str) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
        self
    }

    pub fn with_error(self, error: DiagnosisError) -> Self {
        self.scripted.lock().unwrap().push_back(Err(error));
        self
    }

    /// Simulate a backend that never issues a conversation handle.
    pub fn without_thread(mut self) -> Self {
        self.thread_id = None;
        self
    }

    /// Everything submitted so far, in call order.
    pub fn submitted(&self) -> Vec<SubmittedTurn> {
        self.turns.lock().unwrap().clone()
    }
}

impl DiagnosticClient for MockDiagnosticClient {
    fn submit(
        &self,
        thread_id: Option<&str>,
        prior: &[ChatMessage],
        content: &str,
    ) -> Result<DiagnosticReply, SubmitError> {
        self.turns.lock().unwrap().push(SubmittedTurn {
            thread_id: thread_id.map(str::to_string),
            prior_len: prior.len(),
            content: content.to_string(),
        });

        // Handle in play: the caller's, else the one this mock issues.
        let handle = thread_id
            .map(str::to_string)
            .or_else(|| self.thread_id.clone());

        let next = self.scripted.lock().unwrap().pop_front();
        let text = match next {
            Some(Ok(text)) => text,
            Some(Err(error)) => {
                return Err(SubmitError {
                    thread_id: handle,
                    error,
                })
            }
            None => self.fallback.clone(),
        };

        Ok(DiagnosticReply {
            thread_id: handle,
            text,
        })
    }
}
