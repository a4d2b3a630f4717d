//! Batch coordination: fan the chapter translator out across a whole job.
//!
//! Chapters are dispatched **sequentially**. Segment-level concurrency inside
//! each chapter already keeps the connection busy, and running chapters in
//! parallel on top of that turns every rate-limit response into a storm of
//! simultaneous retries. The ordering contract is independent of the
//! dispatch strategy: results are always sorted by chapter id before being
//! returned.

use std::sync::Arc;
use tracing::info;

use crate::chapter::{Chapter, TranslatedChapter};
use crate::config::TranslationConfig;
use crate::error::TranslateError;
use crate::pipeline::chapter::translate_chapter;
use crate::pipeline::llm::TranslationApi;

/// Translate every chapter of a job into `target_language`.
///
/// `on_chapter(done, total)` is invoked before each chapter starts, with the
/// number of chapters already completed; the driver uses it to interpolate
/// job progress.
///
/// A single chapter that exhausts its retries fails the whole batch; no
/// partial-success result is defined.
pub async fn translate_batch(
    api: &Arc<dyn TranslationApi>,
    chapters: &[Chapter],
    target_language: &str,
    config: &TranslationConfig,
    mut on_chapter: impl FnMut(usize, usize),
) -> Result<Vec<TranslatedChapter>, TranslateError> {
    let total = chapters.len();
    let mut translated = Vec::with_capacity(total);

    for (done, chapter) in chapters.iter().enumerate() {
        on_chapter(done, total);
        info!(
            chapter = chapter.id,
            "translating chapter {}/{}",
            done + 1,
            total
        );
        let content = translate_chapter(api, &chapter.content, target_language, config).await?;
        translated.push(TranslatedChapter {
            id: chapter.id,
            content,
        });
    }

    translated.sort_by_key(|c| c.id);
    Ok(translated)
}
