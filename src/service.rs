//! Job-lifecycle boundary: submit, poll, fetch.
//!
//! [`BookTranslator`] is the entry point host applications embed. It owns
//! the [`JobTracker`], the translation client, and the configuration, and
//! exposes the three operations of the job lifecycle:
//!
//! * [`submit`](BookTranslator::submit) / [`submit_pdf`](BookTranslator::submit_pdf)
//!   — validate input, register a `queued` job, and spawn its driver task.
//! * [`status`](BookTranslator::status) — snapshot a job's state; always
//!   succeeds for known ids, even when the job failed (the status value
//!   carries the failure).
//! * [`result`](BookTranslator::result) — the assembled file's path once the
//!   job completed.
//!
//! Validation failures are synchronous and never create a job; everything
//! after submission is observed by polling.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::chapter::Chapter;
use crate::config::{OutputFormat, TranslationConfig};
use crate::driver::run_job;
use crate::error::TranslateError;
use crate::job::{JobState, JobStatus, JobTracker};
use crate::pipeline::extract::extract_chapters;
use crate::pipeline::llm::{OpenAiApi, TranslationApi};

/// Asynchronous book-translation service.
///
/// Cheap to share behind an `Arc`; all methods take `&self`. Submission
/// spawns driver tasks onto the ambient tokio runtime, so the service must
/// be used from within one.
pub struct BookTranslator {
    tracker: Arc<JobTracker>,
    api: Arc<dyn TranslationApi>,
    config: TranslationConfig,
}

impl BookTranslator {
    /// Create a service backed by the OpenAI chat-completions API.
    pub fn new(config: TranslationConfig) -> Result<Self, TranslateError> {
        let api = Arc::new(OpenAiApi::from_config(&config)?);
        Ok(Self::with_api(api, config))
    }

    /// Create a service with a caller-supplied translation client.
    ///
    /// The seam tests use to substitute a mock, and hosts use to plug in an
    /// alternative provider.
    pub fn with_api(api: Arc<dyn TranslationApi>, config: TranslationConfig) -> Self {
        Self {
            tracker: Arc::new(JobTracker::new()),
            api,
            config,
        }
    }

    /// The job store, for hosts that surface job state elsewhere.
    pub fn tracker(&self) -> &Arc<JobTracker> {
        &self.tracker
    }

    /// Submit pre-extracted chapters for translation.
    ///
    /// Rejects empty chapter lists and lists above `config.max_chapters`
    /// without creating a job. On success the job starts in `queued` state
    /// and is processed by exactly one spawned driver task.
    pub fn submit(
        &self,
        chapters: Vec<Chapter>,
        target_language: impl Into<String>,
        output_format: OutputFormat,
    ) -> Result<Uuid, TranslateError> {
        if chapters.is_empty() {
            return Err(TranslateError::EmptyChapters);
        }
        if chapters.len() > self.config.max_chapters {
            return Err(TranslateError::TooManyChapters {
                count: chapters.len(),
                max: self.config.max_chapters,
            });
        }

        let job_id = Uuid::new_v4();
        let target_language = target_language.into();
        self.tracker
            .create(job_id, chapters.len(), target_language, output_format);
        info!(%job_id, chapters = chapters.len(), %output_format, "job submitted");

        tokio::spawn(run_job(
            Arc::clone(&self.tracker),
            Arc::clone(&self.api),
            self.config.clone(),
            job_id,
            chapters,
        ));

        Ok(job_id)
    }

    /// Extract chapters from raw PDF bytes, then submit them.
    ///
    /// Rejects uploads above `config.max_upload_bytes`, unreadable or
    /// encrypted PDFs, and documents with no extractable text — all before
    /// any job is created.
    pub async fn submit_pdf(
        &self,
        bytes: Vec<u8>,
        target_language: impl Into<String>,
        output_format: OutputFormat,
    ) -> Result<Uuid, TranslateError> {
        if bytes.len() > self.config.max_upload_bytes {
            return Err(TranslateError::UploadTooLarge {
                size: bytes.len(),
                max: self.config.max_upload_bytes,
            });
        }

        // lopdf parsing is CPU-bound; keep it off the async workers.
        let chapters = tokio::task::spawn_blocking(move || extract_chapters(&bytes))
            .await
            .map_err(|e| TranslateError::Internal(format!("extraction task: {e}")))??;

        self.submit(chapters, target_language, output_format)
    }

    /// Snapshot the current state of a job.
    pub fn status(&self, job_id: Uuid) -> Result<JobState, TranslateError> {
        self.tracker.get(job_id)
    }

    /// Path of the assembled document for a completed job.
    ///
    /// Fails with [`TranslateError::ResultNotReady`] while the job is in
    /// progress or ended in error, and with [`TranslateError::ResultMissing`]
    /// when the job completed but its file has vanished from storage — the
    /// job keeps its `completed` status in that case.
    pub fn result(&self, job_id: Uuid) -> Result<PathBuf, TranslateError> {
        let state = self.tracker.get(job_id)?;
        if state.status != JobStatus::Completed {
            return Err(TranslateError::ResultNotReady {
                id: job_id,
                status: state.status,
            });
        }

        let path = state.result_path.unwrap_or_else(|| {
            self.config
                .output_dir
                .join(format!("{job_id}.{}", state.output_format.extension()))
        });
        if !path.exists() {
            return Err(TranslateError::ResultMissing { id: job_id, path });
        }
        Ok(path)
    }
}
