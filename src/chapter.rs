//! Chapter data model.
//!
//! A [`Chapter`] is one unit of source content submitted for translation,
//! identified by an integer id that is unique within a job but not
//! necessarily contiguous (pages without extractable text leave gaps).
//! Chapters are immutable once submitted; the pipeline reads them and
//! produces exactly one [`TranslatedChapter`] per input id, or fails the job
//! without surfacing partial results.

use serde::{Deserialize, Serialize};

/// One unit of source content submitted for translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Unique within a job. Typically the 1-indexed source page number.
    pub id: u32,
    /// Raw extracted text of the chapter.
    pub content: String,
}

impl Chapter {
    pub fn new(id: u32, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}

/// The rejoined, translated form of a [`Chapter`]. Carries the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedChapter {
    pub id: u32,
    pub content: String,
}
