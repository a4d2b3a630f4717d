//! # librotrans
//!
//! Translate book-length PDFs chapter by chapter through an LLM API and
//! reassemble the result into a formatted DOCX or PDF document.
//!
//! ## Why this crate?
//!
//! Book chapters are far too long for a single chat-completion request, and
//! translation APIs rate-limit aggressively under sustained load. This crate
//! owns the orchestration problem: it splits each chapter into bounded-size
//! segments, drives the segment requests with timeout, retry, and jittered
//! exponential backoff, rejoins results in their original order regardless of
//! completion order, and tracks multi-stage progress for asynchronous jobs
//! that callers poll by id.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract   per-page text via lopdf → one Chapter per non-empty page
//!  ├─ 2. Chunk     fixed-width, char-boundary segments per chapter
//!  ├─ 3. Translate one API call per segment, retry/backoff on 429 & I/O
//!  ├─ 4. Rejoin    segments by index, chapters sorted by id
//!  ├─ 5. Assemble  DOCX (OOXML zip) or PDF output
//!  └─ 6. Track     job status / progress, polled by id
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use librotrans::{BookTranslator, OutputFormat, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from OPENAI_API_KEY unless set on the config.
//!     let config = TranslationConfig::default();
//!     let translator = BookTranslator::new(config)?;
//!
//!     let pdf = std::fs::read("book.pdf")?;
//!     let job_id = translator
//!         .submit_pdf(pdf, "Portuguese", OutputFormat::Docx)
//!         .await?;
//!
//!     loop {
//!         let state = translator.status(job_id)?;
//!         eprintln!("{}: {:.0}% — {}", state.status, state.progress * 100.0, state.message);
//!         if state.status.is_terminal() {
//!             break;
//!         }
//!         tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     }
//!
//!     println!("output: {}", translator.result(job_id)?.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `librotrans` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! librotrans = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chapter;
pub mod config;
pub mod driver;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod prompts;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chapter::{Chapter, TranslatedChapter};
pub use config::{OutputFormat, TranslationConfig, TranslationConfigBuilder};
pub use error::{ApiError, TranslateError};
pub use job::{JobState, JobStatus, JobTracker, JobUpdate};
pub use pipeline::llm::{translate_with_retry, OpenAiApi, TranslationApi};
pub use service::BookTranslator;
