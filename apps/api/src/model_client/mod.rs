//! Model Client, the single gateway to the local inference server.
//!
//! ARCHITECTURAL RULE: No other module may call the model endpoint directly.
//! All inference traffic MUST go through this module.
//!
//! Every invocation is health-gated: a cheap probe decides between real
//! attempts and an immediate `Degraded` outcome, so a dead server costs one
//! short round trip instead of three escalating timeouts. The client keeps
//! no cross-call state; concurrent invocations never observe each other.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::config::Config;

/// Completions route of the OpenAI-compatible server (LM Studio style).
const COMPLETIONS_PATH: &str = "/v1/chat/completions";
/// Liveness route probed before any real work.
const HEALTH_PATH: &str = "/health";

/// Real inference attempts per invocation.
pub const MAX_ATTEMPTS: u32 = 3;
/// First-attempt budget; later attempts escalate by `TIMEOUT_STEP`.
const BASE_TIMEOUT: Duration = Duration::from_secs(90);
const TIMEOUT_STEP: Duration = Duration::from_secs(30);
/// Probe budgets: the GET is near-free, the mini completion costs a little.
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const COMPLETION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const PROBE_PROMPT: &str = "ping";
const PROBE_MAX_TOKENS: u32 = 5;
const PROBE_TEMPERATURE: f32 = 0.1;

/// Decoding parameters for real analysis calls. The stop sequences cut off
/// markdown fences and separators local models like to append after JSON.
const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.9;
const FREQUENCY_PENALTY: f32 = 0.1;
const PRESENCE_PENALTY: f32 = 0.1;
const STOP_SEQUENCES: &[&str] = &["```", "---", "###"];

/// Longest response-body prefix carried into an HTTP error.
const MAX_BODY_PREFIX_CHARS: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Outcome taxonomy
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request timed out")]
    Timeout,

    #[error("could not connect to model server: {0}")]
    Connection(String),

    #[error("model server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("unexpected model client error: {0}")]
    Unexpected(String),
}

/// Why the health probe declared the server unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    ProbeTimeout,
    ProbeConnectionFailed,
    ProbeRejected,
}

impl DegradedReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::ProbeTimeout => "model server did not answer the health probe in time",
            Self::ProbeConnectionFailed => "could not connect to the model server",
            Self::ProbeRejected => "model server rejected the health probe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelHealth {
    Healthy,
    Unavailable(DegradedReason),
}

/// Terminal result of one invocation. `Degraded` means no real inference was
/// attempted; `Failure` means all attempts ran and the last classification
/// stands.
#[derive(Debug)]
pub enum ModelOutcome {
    Success { raw_text: String },
    Degraded { reason: DegradedReason },
    Failure(ModelError),
}

/// Attempt progress, emitted through an optional per-call channel. Carried
/// by the diagnostics endpoint and mirrored into logs; never stored on the
/// client itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InvocationEvent {
    ProbeFinished { healthy: bool },
    AttemptStarted { attempt: u32, timeout_secs: u64 },
    AttemptFailed { attempt: u32, error: String },
    AttemptSucceeded { attempt: u32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stop: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The model client used by every analysis pipeline.
#[derive(Clone)]
pub struct ModelClient {
    client: Client,
    base_url: String,
    model: String,
}

impl ModelClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(config.model_base_url.clone(), config.model_name.clone())
    }

    /// Direct construction for callers not holding a full `Config`.
    /// Timeouts are set per request, so the underlying client carries none.
    pub fn with_endpoint(base_url: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}{}", self.base_url, COMPLETIONS_PATH)
    }

    /// Two-stage liveness probe. Stage one hits the dedicated health route;
    /// servers without one get a minimal completion (stage two) instead, so
    /// a missing /health is not mistaken for a dead model.
    pub async fn check_health(&self) -> ModelHealth {
        let health_url = format!("{}{}", self.base_url, HEALTH_PATH);
        match self
            .client
            .get(&health_url)
            .timeout(HEALTH_PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => return ModelHealth::Healthy,
            Ok(resp) => debug!(
                "health route answered {}; probing completions instead",
                resp.status()
            ),
            Err(e) => debug!("health route unreachable ({e}); probing completions instead"),
        }

        let body = self.request_body(PROBE_PROMPT, PROBE_MAX_TOKENS, PROBE_TEMPERATURE);
        match self
            .client
            .post(self.completions_url())
            .timeout(COMPLETION_PROBE_TIMEOUT)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => ModelHealth::Healthy,
            Ok(resp) => {
                debug!("probe completion rejected with {}", resp.status());
                ModelHealth::Unavailable(DegradedReason::ProbeRejected)
            }
            Err(e) if e.is_timeout() => ModelHealth::Unavailable(DegradedReason::ProbeTimeout),
            Err(_) => ModelHealth::Unavailable(DegradedReason::ProbeConnectionFailed),
        }
    }

    /// Runs one health-gated invocation.
    pub async fn invoke(&self, prompt: &str, max_tokens: u32) -> ModelOutcome {
        self.invoke_with_events(prompt, max_tokens, None).await
    }

    /// Like [`invoke`](Self::invoke), additionally reporting attempt
    /// progress through `events`. A dropped receiver never aborts the call.
    pub async fn invoke_with_events(
        &self,
        prompt: &str,
        max_tokens: u32,
        events: Option<&UnboundedSender<InvocationEvent>>,
    ) -> ModelOutcome {
        let health = self.check_health().await;
        emit(
            events,
            InvocationEvent::ProbeFinished {
                healthy: health == ModelHealth::Healthy,
            },
        );

        if let ModelHealth::Unavailable(reason) = health {
            warn!("model unavailable, skipping invocation: {}", reason.message());
            return ModelOutcome::Degraded { reason };
        }

        let body = self.request_body(prompt, max_tokens, TEMPERATURE);
        let mut last_error = ModelError::Unexpected("no attempt was made".to_string());

        for attempt in 0..MAX_ATTEMPTS {
            let timeout = timeout_for_attempt(attempt);
            emit(
                events,
                InvocationEvent::AttemptStarted {
                    attempt,
                    timeout_secs: timeout.as_secs(),
                },
            );

            match self.try_completion(&body, timeout).await {
                Ok(raw_text) => {
                    debug!("model call succeeded on attempt {attempt}");
                    emit(events, InvocationEvent::AttemptSucceeded { attempt });
                    return ModelOutcome::Success { raw_text };
                }
                Err(error) => {
                    warn!("model attempt {attempt} failed: {error}");
                    emit(
                        events,
                        InvocationEvent::AttemptFailed {
                            attempt,
                            error: error.to_string(),
                        },
                    );
                    last_error = error;
                }
            }
        }

        ModelOutcome::Failure(last_error)
    }

    async fn try_completion(
        &self,
        body: &CompletionRequest<'_>,
        timeout: Duration,
    ) -> Result<String, ModelError> {
        let response = self
            .client
            .post(self.completions_url())
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Http {
                status: status.as_u16(),
                body: body_prefix(&body),
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                ModelError::MalformedResponse("completion contained no choices".to_string())
            })?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ModelError::MalformedResponse(
                "completion content was empty".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    fn request_body<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
        temperature: f32,
    ) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature,
            top_p: TOP_P,
            frequency_penalty: FREQUENCY_PENALTY,
            presence_penalty: PRESENCE_PENALTY,
            stop: STOP_SEQUENCES,
        }
    }
}

/// Escalating per-attempt budget: 90s, then 120s, then 150s.
fn timeout_for_attempt(attempt: u32) -> Duration {
    BASE_TIMEOUT + TIMEOUT_STEP * attempt
}

fn classify_transport_error(e: reqwest::Error) -> ModelError {
    if e.is_timeout() {
        ModelError::Timeout
    } else if e.is_connect() {
        ModelError::Connection(e.to_string())
    } else {
        ModelError::Unexpected(e.to_string())
    }
}

fn body_prefix(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_PREFIX_CHARS {
        return body.to_string();
    }
    body.chars().take(MAX_BODY_PREFIX_CHARS).collect()
}

fn emit(events: Option<&UnboundedSender<InvocationEvent>>, event: InvocationEvent) {
    if let Some(sender) = events {
        // A closed receiver only means nobody is watching anymore.
        let _ = sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [
                { "message": { "role": "assistant", "content": content } }
            ]
        })
    }

    #[test]
    fn test_timeouts_escalate_per_attempt() {
        assert_eq!(timeout_for_attempt(0), Duration::from_secs(90));
        assert_eq!(timeout_for_attempt(1), Duration::from_secs(120));
        assert_eq!(timeout_for_attempt(2), Duration::from_secs(150));
    }

    #[test]
    fn test_request_body_carries_decoding_params() {
        let client =
            ModelClient::with_endpoint("http://127.0.0.1:1234".to_string(), "test-model".into());
        let body = client.request_body("analyze this", 4000, TEMPERATURE);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["model"], "test-model");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "analyze this");
        assert_eq!(value["max_tokens"], 4000);
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((value["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(
            value["stop"],
            serde_json::json!(["```", "---", "###"]),
            "stop sequences guard against fenced output"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client =
            ModelClient::with_endpoint("http://localhost:1234/".to_string(), "m".into());
        assert_eq!(
            client.completions_url(),
            "http://localhost:1234/v1/chat/completions"
        );
    }

    #[test]
    fn test_body_prefix_truncates_long_bodies() {
        let long = "e".repeat(500);
        assert_eq!(body_prefix(&long).chars().count(), 200);
        assert_eq!(body_prefix("short"), "short");
    }

    #[test]
    fn test_http_error_display_names_status() {
        let err = ModelError::Http {
            status: 503,
            body: "overloaded".to_string(),
        };
        let shown = err.to_string();
        assert!(shown.contains("503"));
        assert!(shown.contains("overloaded"));
    }

    #[tokio::test]
    async fn test_invoke_degrades_when_server_unreachable() {
        // Grab a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ModelClient::with_endpoint(format!("http://{addr}"), "test-model".into());
        let outcome = client.invoke("hello", 16).await;

        match outcome {
            ModelOutcome::Degraded { reason } => {
                assert_eq!(reason, DegradedReason::ProbeConnectionFailed)
            }
            other => panic!("expected Degraded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_rejection_skips_real_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        // Exactly one completion call: the mini probe. A rejected probe must
        // not be followed by real attempts.
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let outcome = client.invoke("hello", 16).await;

        match outcome {
            ModelOutcome::Degraded { reason } => {
                assert_eq!(reason, DegradedReason::ProbeRejected)
            }
            other => panic!("expected Degraded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_health_route_falls_back_to_probe_completion() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        // Probe completion plus one real attempt.
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("pong")))
            .expect(2)
            .mount(&server)
            .await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let outcome = client.invoke("hello", 16).await;

        match outcome {
            ModelOutcome::Success { raw_text } => assert_eq!(raw_text, "pong"),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_all_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .expect(MAX_ATTEMPTS as u64)
            .mount(&server)
            .await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let outcome = client.invoke("hello", 16).await;

        match outcome {
            ModelOutcome::Failure(ModelError::Http { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected Failure(Http), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_returns_trimmed_content() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("  {\"ok\": true}\n\n")),
            )
            .mount(&server)
            .await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let outcome = client.invoke("hello", 16).await;

        match outcome {
            ModelOutcome::Success { raw_text } => assert_eq!(raw_text, "{\"ok\": true}"),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_classified_as_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let outcome = client.invoke("hello", 16).await;

        match outcome {
            ModelOutcome::Failure(ModelError::MalformedResponse(msg)) => {
                assert!(msg.contains("no choices"))
            }
            other => panic!("expected Failure(MalformedResponse), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_events_trace_probe_and_every_attempt() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let outcome = client.invoke_with_events("hello", 16, Some(&tx)).await;
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert!(matches!(outcome, ModelOutcome::Failure(_)));
        assert_eq!(events.len(), 7, "probe plus three started/failed pairs");
        assert_eq!(events[0], InvocationEvent::ProbeFinished { healthy: true });
        assert_eq!(
            events[1],
            InvocationEvent::AttemptStarted {
                attempt: 0,
                timeout_secs: 90
            }
        );
        assert!(matches!(
            events[2],
            InvocationEvent::AttemptFailed { attempt: 0, .. }
        ));
        assert_eq!(
            events[3],
            InvocationEvent::AttemptStarted {
                attempt: 1,
                timeout_secs: 120
            }
        );
        assert_eq!(
            events[5],
            InvocationEvent::AttemptStarted {
                attempt: 2,
                timeout_secs: 150
            }
        );
    }
}
