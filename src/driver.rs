//! Pipeline driver: the per-job state machine.
//!
//! One driver task owns one job from `queued` to a terminal state. It
//! sequences translation and document assembly, writes every phase
//! transition into the [`JobTracker`], and catches any failure at its own
//! boundary — an error is classified into a human-readable message and
//! recorded as terminal `error` state, never re-raised to a polling caller.
//!
//! ## Progress checkpoints
//!
//! | Phase | Progress |
//! |---|---|
//! | translation starts | 0.1 |
//! | chapter *i* of *n* | 0.1 + 0.6 · (i / n) |
//! | formatting starts | 0.7 |
//! | completed | 1.0 |
//!
//! The breakpoints are a fixed policy, kept stable so progress bars and
//! status consumers behave identically across releases.

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::chapter::Chapter;
use crate::config::TranslationConfig;
use crate::error::{ApiError, TranslateError};
use crate::job::{JobStatus, JobTracker, JobUpdate};
use crate::pipeline::assemble::assemble_document;
use crate::pipeline::batch::translate_batch;
use crate::pipeline::llm::TranslationApi;

/// Run one job to completion or terminal error. Never panics the task on
/// pipeline failure and never returns an error to the spawner.
pub async fn run_job(
    tracker: Arc<JobTracker>,
    api: Arc<dyn TranslationApi>,
    config: TranslationConfig,
    job_id: Uuid,
    chapters: Vec<Chapter>,
) {
    if let Err(e) = drive(&tracker, &api, &config, job_id, &chapters).await {
        error!(%job_id, "translation job failed: {e}");
        let _ = tracker.update(
            job_id,
            JobUpdate::new()
                .status(JobStatus::Error)
                .message(failure_message(&e)),
        );
    }
}

async fn drive(
    tracker: &JobTracker,
    api: &Arc<dyn TranslationApi>,
    config: &TranslationConfig,
    job_id: Uuid,
    chapters: &[Chapter],
) -> Result<(), TranslateError> {
    let state = tracker.get(job_id)?;
    let total = chapters.len();
    info!(%job_id, total, target = %state.target_language, "starting translation job");

    tracker.update(
        job_id,
        JobUpdate::new()
            .status(JobStatus::Translating)
            .progress(0.1)
            .message("Starting chapter translation..."),
    )?;

    let translated = translate_batch(
        api,
        chapters,
        &state.target_language,
        config,
        |done, total| {
            let progress = 0.1 + 0.6 * (done as f32 / total as f32);
            let _ = tracker.update(
                job_id,
                JobUpdate::new()
                    .progress(progress)
                    .current_chapter(done + 1)
                    .message(format!("Translating chapter {}/{total}...", done + 1)),
            );
        },
    )
    .await?;

    tracker.update(
        job_id,
        JobUpdate::new()
            .status(JobStatus::Formatting)
            .progress(0.7)
            .message("Formatting document..."),
    )?;

    let path =
        assemble_document(&translated, state.output_format, &config.output_dir, job_id).await?;

    tracker.update(
        job_id,
        JobUpdate::new()
            .status(JobStatus::Completed)
            .progress(1.0)
            .current_chapter(total)
            .message("Translation and formatting complete")
            .result_path(path),
    )?;

    info!(%job_id, "translation job completed");
    Ok(())
}

/// Map a pipeline failure to the message shown to polling callers.
fn failure_message(err: &TranslateError) -> String {
    match err {
        TranslateError::RetriesExhausted {
            source: ApiError::RateLimited { .. },
            ..
        } => "Error: API rate limit exceeded. Try again later or reduce the text size.".into(),
        TranslateError::Api(ApiError::Auth { .. }) => {
            "Error: API key rejected. Check that the OPENAI_API_KEY is configured correctly."
                .into()
        }
        other => format!("Error: {other}"),
    }
}
