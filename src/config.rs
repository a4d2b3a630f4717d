//! Configuration types for the translation pipeline.
//!
//! All pipeline behaviour is controlled through [`TranslationConfig`], built
//! via its [`TranslationConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across jobs, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A fifteen-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::TranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration for the chunked-translation pipeline.
///
/// Built via [`TranslationConfig::builder()`] or using
/// [`TranslationConfig::default()`].
///
/// # Example
/// ```rust
/// use librotrans::TranslationConfig;
///
/// let config = TranslationConfig::builder()
///     .chunk_size(1000)
///     .max_retries(3)
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Chat model identifier sent to the API. Default: `"gpt-4o-mini"`.
    pub model: String,

    /// API key. If `None`, read from the `OPENAI_API_KEY` environment
    /// variable when the client is constructed.
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API. Default:
    /// `"https://api.openai.com/v1"`. Point this at a local mock in tests.
    pub api_base: String,

    /// Sampling temperature for the completion. Default: 0.3.
    ///
    /// Translation wants faithfulness, not creativity; a low temperature
    /// keeps the model close to the source text while still allowing natural
    /// phrasing in the target language.
    pub temperature: f32,

    /// Maximum tokens the model may generate per segment. Default: 2000.
    pub max_completion_tokens: usize,

    /// Per-request timeout in seconds. Default: 120.
    ///
    /// A timed-out request is classified as a network failure and enters the
    /// retry path, so this bounds how long one stuck request can stall a
    /// segment — it does not bound the job.
    pub api_timeout_secs: u64,

    /// Total attempts per segment before giving up. Default: 5.
    ///
    /// Only rate-limit and network failures are retried. Auth rejections and
    /// unclassified errors surface immediately regardless of this setting.
    pub max_retries: u32,

    /// First backoff delay in milliseconds. Default: 1000.
    ///
    /// Doubles after each attempt (1 s → 2 s → 4 s → …) up to
    /// [`max_backoff_ms`](Self::max_backoff_ms), with uniform jitter in
    /// `[0, delay/10)` added to each wait so concurrent retriers do not
    /// resubmit in lockstep.
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds. Default: 60 000.
    pub max_backoff_ms: u64,

    /// Chapters at or below this many characters are translated in a single
    /// request. Default: 1500 (roughly 500 tokens of prose).
    pub single_request_threshold: usize,

    /// Maximum characters per segment when a chapter is chunked. Default: 1500.
    ///
    /// Larger segments mean fewer requests but longer per-request latency and
    /// a higher chance of tripping the completion-token limit mid-paragraph.
    pub chunk_size: usize,

    /// Number of segment requests in flight per chapter. Default: 4.
    ///
    /// Segments of one chapter are independent, so they can be dispatched
    /// concurrently; the rejoin step orders by segment index, never by
    /// arrival. Lower this if the provider rate-limits aggressively.
    pub segment_concurrency: usize,

    /// Maximum chapters accepted per job. Default: 100.
    pub max_chapters: usize,

    /// Maximum accepted upload size in bytes. Default: 10 MiB.
    pub max_upload_bytes: usize,

    /// Directory where assembled documents are written, keyed by job id.
    /// Default: `"output"`.
    pub output_dir: PathBuf,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            temperature: 0.3,
            max_completion_tokens: 2000,
            api_timeout_secs: 120,
            max_retries: 5,
            initial_backoff_ms: 1000,
            max_backoff_ms: 60_000,
            single_request_threshold: 1500,
            chunk_size: 1500,
            segment_concurrency: 4,
            max_chapters: 100,
            max_upload_bytes: 10 * 1024 * 1024,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranslationConfig`].
#[derive(Debug)]
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl TranslationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_completion_tokens(mut self, n: usize) -> Self {
        self.config.max_completion_tokens = n.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.max(1);
        self
    }

    pub fn initial_backoff_ms(mut self, ms: u64) -> Self {
        self.config.initial_backoff_ms = ms;
        self
    }

    pub fn max_backoff_ms(mut self, ms: u64) -> Self {
        self.config.max_backoff_ms = ms;
        self
    }

    pub fn single_request_threshold(mut self, chars: usize) -> Self {
        self.config.single_request_threshold = chars;
        self
    }

    pub fn chunk_size(mut self, chars: usize) -> Self {
        self.config.chunk_size = chars;
        self
    }

    pub fn segment_concurrency(mut self, n: usize) -> Self {
        self.config.segment_concurrency = n.max(1);
        self
    }

    pub fn max_chapters(mut self, n: usize) -> Self {
        self.config.max_chapters = n;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, TranslateError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(TranslateError::InvalidConfig(
                "chunk_size must be ≥ 1".into(),
            ));
        }
        if c.max_chapters == 0 {
            return Err(TranslateError::InvalidConfig(
                "max_chapters must be ≥ 1".into(),
            ));
        }
        if c.max_backoff_ms < c.initial_backoff_ms {
            return Err(TranslateError::InvalidConfig(format!(
                "max_backoff_ms ({}) is below initial_backoff_ms ({})",
                c.max_backoff_ms, c.initial_backoff_ms
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output document format for an assembled translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Word document (OOXML package). (default)
    #[default]
    Docx,
    /// Plain single-font PDF.
    Pdf,
}

impl OutputFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docx" => Ok(OutputFormat::Docx),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(TranslateError::InvalidConfig(format!(
                "unknown output format '{other}' (expected docx or pdf)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = TranslationConfig::builder().build().unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.chunk_size, 1500);
    }

    #[test]
    fn builder_clamps_floors() {
        let config = TranslationConfig::builder()
            .max_retries(0)
            .segment_concurrency(0)
            .build()
            .unwrap();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.segment_concurrency, 1);
    }

    #[test]
    fn build_rejects_zero_chunk_size() {
        let err = TranslationConfig::builder().chunk_size(0).build();
        assert!(matches!(err, Err(TranslateError::InvalidConfig(_))));
    }

    #[test]
    fn build_rejects_inverted_backoff_bounds() {
        let err = TranslationConfig::builder()
            .initial_backoff_ms(5000)
            .max_backoff_ms(100)
            .build();
        assert!(matches!(err, Err(TranslateError::InvalidConfig(_))));
    }

    #[test]
    fn output_format_round_trip() {
        assert_eq!("docx".parse::<OutputFormat>().unwrap(), OutputFormat::Docx);
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert!("epub".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Pdf.to_string(), "pdf");
    }
}
