//! Job tracking: the only shared mutable state in the pipeline.
//!
//! A [`JobTracker`] maps job ids to [`JobState`] records. It is constructed
//! explicitly (typically once at process start, inside
//! [`crate::service::BookTranslator`]) and handed to every component that
//! needs it — never a process-wide global.
//!
//! Exactly one driver task owns each job, so writes to a given key are
//! already serialised; the map still guards each update per key so that
//! status-polling readers never observe a half-applied record. Updates are
//! merges: the driver sends a [`JobUpdate`] naming only the fields that
//! changed and never read-modify-writes a full record across an await point.
//!
//! Jobs live for the lifetime of the process; there is no eviction.

use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::OutputFormat;
use crate::error::TranslateError;

/// Lifecycle of a translation job.
///
/// ```text
/// queued → translating → formatting → completed
///              │              │
///              └──────────────┴────▶ error
/// ```
///
/// `completed` and `error` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Translating,
    Formatting,
    Completed,
    Error,
}

impl JobStatus {
    /// Whether the job has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobStatus::Queued => "queued",
            JobStatus::Translating => "translating",
            JobStatus::Formatting => "formatting",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        })
    }
}

/// Snapshot of one job's state, returned to status-polling callers.
#[derive(Debug, Clone, Serialize)]
pub struct JobState {
    pub status: JobStatus,
    /// Overall progress in `[0, 1]`. Fixed checkpoints: 0.1 when translation
    /// starts, interpolated up to 0.7 across chapters, 1.0 on completion.
    pub progress: f32,
    /// 1-indexed position of the chapter currently being translated.
    pub current_chapter: usize,
    pub total_chapters: usize,
    /// Human-readable phase description or classified error text.
    pub message: String,
    pub target_language: String,
    pub output_format: OutputFormat,
    /// Set once the job completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<PathBuf>,
}

/// A partial update: only the named fields change.
#[derive(Debug, Default)]
pub struct JobUpdate {
    status: Option<JobStatus>,
    progress: Option<f32>,
    current_chapter: Option<usize>,
    message: Option<String>,
    result_path: Option<PathBuf>,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: f32) -> Self {
        self.progress = Some(progress.clamp(0.0, 1.0));
        self
    }

    pub fn current_chapter(mut self, chapter: usize) -> Self {
        self.current_chapter = Some(chapter);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn result_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.result_path = Some(path.into());
        self
    }
}

/// Concurrent-safe map from job id to job state.
#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: DashMap<Uuid, JobState>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly submitted job in `queued` state.
    pub fn create(
        &self,
        job_id: Uuid,
        total_chapters: usize,
        target_language: String,
        output_format: OutputFormat,
    ) {
        self.jobs.insert(
            job_id,
            JobState {
                status: JobStatus::Queued,
                progress: 0.0,
                current_chapter: 0,
                total_chapters,
                message: "Job queued for processing".to_string(),
                target_language,
                output_format,
                result_path: None,
            },
        );
    }

    /// Merge `update` into the job's record, atomically per key.
    ///
    /// Updates against a terminal (`completed`/`error`) job are ignored:
    /// those states admit no further transitions.
    pub fn update(&self, job_id: Uuid, update: JobUpdate) -> Result<(), TranslateError> {
        let mut entry = self
            .jobs
            .get_mut(&job_id)
            .ok_or(TranslateError::JobNotFound(job_id))?;

        if entry.status.is_terminal() {
            return Ok(());
        }

        if let Some(status) = update.status {
            entry.status = status;
        }
        if let Some(progress) = update.progress {
            entry.progress = progress;
        }
        if let Some(current_chapter) = update.current_chapter {
            entry.current_chapter = current_chapter;
        }
        if let Some(message) = update.message {
            entry.message = message;
        }
        if let Some(result_path) = update.result_path {
            entry.result_path = Some(result_path);
        }
        Ok(())
    }

    /// Snapshot the current state of a job.
    pub fn get(&self, job_id: Uuid) -> Result<JobState, TranslateError> {
        self.jobs
            .get(&job_id)
            .map(|entry| entry.value().clone())
            .ok_or(TranslateError::JobNotFound(job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with_job() -> (JobTracker, Uuid) {
        let tracker = JobTracker::new();
        let job_id = Uuid::new_v4();
        tracker.create(job_id, 3, "Spanish".into(), OutputFormat::Docx);
        (tracker, job_id)
    }

    #[test]
    fn create_then_get() {
        let (tracker, job_id) = tracker_with_job();
        let state = tracker.get(job_id).unwrap();
        assert_eq!(state.status, JobStatus::Queued);
        assert_eq!(state.total_chapters, 3);
        assert_eq!(state.progress, 0.0);
        assert!(state.result_path.is_none());
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let tracker = JobTracker::new();
        let err = tracker.get(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, TranslateError::JobNotFound(_)));
    }

    #[test]
    fn update_merges_only_named_fields() {
        let (tracker, job_id) = tracker_with_job();
        tracker
            .update(
                job_id,
                JobUpdate::new()
                    .status(JobStatus::Translating)
                    .progress(0.1),
            )
            .unwrap();

        let state = tracker.get(job_id).unwrap();
        assert_eq!(state.status, JobStatus::Translating);
        assert!((state.progress - 0.1).abs() < f32::EPSILON);
        // Untouched fields survive the merge.
        assert_eq!(state.target_language, "Spanish");
        assert_eq!(state.message, "Job queued for processing");
    }

    #[test]
    fn terminal_states_admit_no_further_updates() {
        let (tracker, job_id) = tracker_with_job();
        tracker
            .update(job_id, JobUpdate::new().status(JobStatus::Error).message("boom"))
            .unwrap();
        tracker
            .update(
                job_id,
                JobUpdate::new().status(JobStatus::Translating).progress(0.5),
            )
            .unwrap();

        let state = tracker.get(job_id).unwrap();
        assert_eq!(state.status, JobStatus::Error);
        assert_eq!(state.message, "boom");
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn progress_is_clamped() {
        let (tracker, job_id) = tracker_with_job();
        tracker
            .update(job_id, JobUpdate::new().progress(7.5))
            .unwrap();
        assert_eq!(tracker.get(job_id).unwrap().progress, 1.0);
    }
}
