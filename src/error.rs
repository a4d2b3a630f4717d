//! Error types for the librotrans library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`TranslateError`] — **Fatal**: the submission or job cannot proceed
//!   (bad input, retries exhausted, document assembly failed). Returned from
//!   the service boundary and captured into job state by the driver.
//!
//! * [`ApiError`] — **Per-request**: the outcome of one call to the external
//!   translation API, classified so the retry layer can decide retryability.
//!   Rate limits and network failures are transient; auth rejections and
//!   unclassified errors are not.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::config::OutputFormat;
use crate::job::JobStatus;

/// All fatal errors returned by the librotrans library.
///
/// Per-request API failures use [`ApiError`] and reach this enum only once
/// the retry layer has given up on them.
#[derive(Debug, Error)]
pub enum TranslateError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Submission contained no chapters.
    #[error("No chapters provided")]
    EmptyChapters,

    /// Submission exceeded the configured chapter limit.
    #[error("Too many chapters: {count} (maximum {max})")]
    TooManyChapters { count: usize, max: usize },

    /// Uploaded file exceeds the configured size limit.
    #[error("Upload is {size} bytes, above the {max}-byte limit")]
    UploadTooLarge { size: usize, max: usize },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The uploaded bytes could not be parsed as a PDF.
    #[error("Failed to read PDF: {detail}")]
    CorruptPdf { detail: String },

    /// The PDF is password-protected and cannot be read.
    #[error("PDF is encrypted; decrypt it before uploading")]
    EncryptedPdf,

    /// No page of the document produced any extractable text.
    #[error("No extractable text found in the document")]
    EmptyDocument,

    // ── Translation errors ────────────────────────────────────────────────
    /// A transient API failure persisted through every retry attempt.
    #[error("Translation failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: ApiError,
    },

    /// A non-retryable API failure (auth rejection, unclassified error).
    #[error("Translation failed: {0}")]
    Api(#[from] ApiError),

    // ── Assembly / I/O errors ─────────────────────────────────────────────
    /// Document rendering failed; the job must be resubmitted.
    #[error("Failed to assemble {format} document: {detail}")]
    AssemblyFailed { format: OutputFormat, detail: String },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Job-boundary errors ───────────────────────────────────────────────
    /// No job with this id exists in the tracker.
    #[error("Translation job {0} not found")]
    JobNotFound(Uuid),

    /// The job exists but has not produced a result yet.
    #[error("Translation job {id} is not finished (status: {status})")]
    ResultNotReady { id: Uuid, status: JobStatus },

    /// The job completed but its output file is missing from storage.
    #[error("Output file for job {id} is missing: '{}'", path.display())]
    ResultMissing { id: Uuid, path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or client-construction validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The classified outcome of a single call to the translation API.
///
/// Providers signal failure in provider-specific ways (HTTP status codes,
/// connection resets, timeouts); the client maps them all into this taxonomy
/// so [`crate::pipeline::llm::translate_with_retry`] can decide what to do.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// HTTP 429 — the provider wants us to back off.
    #[error("rate limit exceeded (HTTP 429)")]
    RateLimited {
        /// Server-specified delay from the `Retry-After` header, if present.
        retry_after_secs: Option<u64>,
    },

    /// Connection failure, reset, or per-request timeout.
    #[error("network failure: {detail}")]
    Network { detail: String },

    /// HTTP 401/403 — the API key was rejected. Retrying will not help.
    #[error("authentication rejected: {detail}")]
    Auth { detail: String },

    /// Anything the client could not classify.
    #[error("unexpected API failure: {detail}")]
    Unknown { detail: String },
}

impl ApiError {
    /// Whether the retry layer should attempt this request again.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. } | ApiError::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_chapters_display() {
        let e = TranslateError::TooManyChapters {
            count: 150,
            max: 100,
        };
        let msg = e.to_string();
        assert!(msg.contains("150"), "got: {msg}");
        assert!(msg.contains("100"), "got: {msg}");
    }

    #[test]
    fn retries_exhausted_carries_last_error() {
        let e = TranslateError::RetriesExhausted {
            attempts: 5,
            source: ApiError::RateLimited {
                retry_after_secs: None,
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("5 attempts"), "got: {msg}");
        assert!(msg.contains("rate limit"), "got: {msg}");
    }

    #[test]
    fn transient_classification() {
        assert!(ApiError::RateLimited {
            retry_after_secs: Some(30)
        }
        .is_transient());
        assert!(ApiError::Network {
            detail: "connection reset".into()
        }
        .is_transient());
        assert!(!ApiError::Auth {
            detail: "bad key".into()
        }
        .is_transient());
        assert!(!ApiError::Unknown {
            detail: "HTTP 418".into()
        }
        .is_transient());
    }

    #[test]
    fn result_not_ready_display() {
        let id = Uuid::nil();
        let e = TranslateError::ResultNotReady {
            id,
            status: JobStatus::Translating,
        };
        assert!(e.to_string().contains("translating"));
    }
}
