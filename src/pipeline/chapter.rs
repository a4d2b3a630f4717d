//! Chapter translation: chunk, dispatch, rejoin.
//!
//! A chapter at or below the single-request threshold goes to the API in one
//! call. Anything longer is split by [`crate::pipeline::chunk`] and the
//! segments are dispatched concurrently, bounded by
//! `config.segment_concurrency`. Segments complete in arbitrary order; the
//! rejoin step sorts by the segment's original index, never by arrival —
//! that index-based reassembly is what makes concurrent chunking safe.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::debug;

use crate::config::TranslationConfig;
use crate::error::TranslateError;
use crate::pipeline::chunk::split_text;
use crate::pipeline::llm::{translate_with_retry, TranslationApi};

/// Translate one chapter's content into `target_language`.
///
/// Fails if any segment exhausts its retry budget; no partial chapter is
/// ever returned.
pub async fn translate_chapter(
    api: &Arc<dyn TranslationApi>,
    content: &str,
    target_language: &str,
    config: &TranslationConfig,
) -> Result<String, TranslateError> {
    if content.chars().count() <= config.single_request_threshold {
        return translate_with_retry(api.as_ref(), content, target_language, config).await;
    }

    let segments = split_text(content, config.chunk_size);
    debug!(
        segments = segments.len(),
        chunk_size = config.chunk_size,
        "chapter exceeds single-request threshold, chunking"
    );

    let mut translated: Vec<(usize, String)> =
        stream::iter(segments.into_iter().enumerate().map(|(index, segment)| {
            let api = Arc::clone(api);
            let config = config.clone();
            let target = target_language.to_string();
            async move {
                let out = translate_with_retry(api.as_ref(), &segment, &target, &config).await?;
                Ok::<_, TranslateError>((index, out))
            }
        }))
        .buffer_unordered(config.segment_concurrency)
        .try_collect()
        .await?;

    // Rejoin in original segment order, not completion order.
    translated.sort_by_key(|(index, _)| *index);

    Ok(translated
        .into_iter()
        .map(|(_, segment)| segment)
        .collect::<Vec<_>>()
        .join("\n"))
}
