//! Translation client: build the chat request and call the provider.
//!
//! This module is intentionally thin — the translation instruction lives in
//! [`crate::prompts`] so it can be changed without touching retry or
//! error-handling logic here.
//!
//! ## Retry Strategy
//!
//! HTTP 429 and transient network failures are frequent under sustained
//! load. [`translate_with_retry`] retries only those, with exponential
//! backoff (`initial_backoff_ms * 2^attempt`, capped at `max_backoff_ms`)
//! plus uniform jitter in `[0, delay/10)` on each wait so concurrent
//! retriers do not resubmit in lockstep. Auth rejections and unclassified
//! errors surface immediately; exhausting the attempt budget surfaces the
//! last underlying error.

use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::TranslationConfig;
use crate::error::{ApiError, TranslateError};
use crate::prompts::translation_system_prompt;

/// One call to the external translation API.
///
/// The strategy seam of the pipeline: production code uses [`OpenAiApi`],
/// tests substitute a mock. Alternative providers implement this trait and
/// are selected at construction time — never detected at runtime.
#[async_trait]
pub trait TranslationApi: Send + Sync {
    /// Translate `text` into `target_language`.
    ///
    /// One network request, no retries; classification of provider-specific
    /// failure signals into [`ApiError`] happens here so the retry layer can
    /// decide retryability.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ApiError>;
}

// ── OpenAI chat-completions client ───────────────────────────────────────

/// [`TranslationApi`] implementation targeting the OpenAI chat-completions
/// endpoint (one pinned API shape, v1).
pub struct OpenAiApi {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_completion_tokens: usize,
}

impl OpenAiApi {
    /// Build a client from the pipeline configuration.
    ///
    /// The API key comes from `config.api_key`, falling back to the
    /// `OPENAI_API_KEY` environment variable. The per-request timeout is
    /// enforced by the underlying HTTP client; a timed-out request is
    /// classified as a network failure and enters the retry path.
    pub fn from_config(config: &TranslationConfig) -> Result<Self, TranslateError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                TranslateError::InvalidConfig(
                    "no API key: set OPENAI_API_KEY or TranslationConfig::api_key".into(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| TranslateError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_completion_tokens: config.max_completion_tokens,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TranslationApi for OpenAiApi {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ApiError> {
        let system = translation_system_prompt(target_language);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_completion_tokens,
        };

        debug!(
            chars = text.chars().count(),
            target_language, "sending translation request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(ApiError::RateLimited { retry_after_secs });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth {
                detail: format!("HTTP {status}: {}", api_error_detail(&body)),
            });
        }
        if status.is_server_error() {
            // Overloaded or restarting backend; treat like a connection blip.
            return Err(ApiError::Network {
                detail: format!("HTTP {status}"),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Unknown {
                detail: format!("HTTP {status}: {}", api_error_detail(&body)),
            });
        }

        // A connection that dies while the body streams in is the same
        // transient failure as one that dies during send.
        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() || e.is_request() {
                ApiError::Network {
                    detail: format!("reading response body: {e}"),
                }
            } else {
                ApiError::Unknown {
                    detail: format!("malformed response body: {e}"),
                }
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ApiError::Unknown {
                detail: "response contained no completion".into(),
            })
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Pull the human-readable message out of an OpenAI error envelope
/// (`{"error": {"message": ...}}`), falling back to the raw body.
fn api_error_detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => truncate(body, 200).to_string(),
    }
}

// ── Retry wrapper ────────────────────────────────────────────────────────

/// Translate one segment, retrying transient failures with backoff.
///
/// Empty (or whitespace-only) input short-circuits to an empty string
/// without a network call. `config.max_retries` is the total attempt
/// budget; the wait sequence before attempts 2..n doubles from
/// `initial_backoff_ms` up to the `max_backoff_ms` ceiling.
pub async fn translate_with_retry(
    api: &dyn TranslationApi,
    text: &str,
    target_language: &str,
    config: &TranslationConfig,
) -> Result<String, TranslateError> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }

    let max_delay = Duration::from_millis(config.max_backoff_ms);
    let mut delay = Duration::from_millis(config.initial_backoff_ms).min(max_delay);
    let mut last_err: Option<ApiError> = None;

    for attempt in 1..=config.max_retries {
        if attempt > 1 {
            let jitter = delay.mul_f64(rand::thread_rng().gen_range(0.0..0.1));
            let wait = (delay + jitter).min(max_delay);
            warn!(
                attempt,
                max_retries = config.max_retries,
                "transient translation failure, retrying in {:.2}s",
                wait.as_secs_f64()
            );
            sleep(wait).await;
            delay = (delay * 2).min(max_delay);
        }

        match api.translate(text, target_language).await {
            Ok(translated) => return Ok(translated),
            Err(e) if e.is_transient() => {
                warn!("attempt {attempt}/{} failed: {e}", config.max_retries);
                last_err = Some(e);
            }
            Err(e) => return Err(TranslateError::Api(e)),
        }
    }

    Err(TranslateError::RetriesExhausted {
        attempts: config.max_retries,
        source: last_err.unwrap_or(ApiError::Unknown {
            detail: "no attempt was made".into(),
        }),
    })
}
