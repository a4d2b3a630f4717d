//! Pipeline stages for chunked book translation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different extraction backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ batch ──▶ chapter ──▶ chunk ──▶ llm ──▶ assemble
//! (lopdf)   (per book) (per chapter) (split)  (API)   (docx/pdf)
//! ```
//!
//! 1. [`extract`]  — per-page text extraction; one chapter per non-empty page
//! 2. [`batch`]    — fan out over chapters, re-sort results by chapter id
//! 3. [`chapter`]  — split one chapter into segments, rejoin by segment index
//! 4. [`chunk`]    — fixed-width, char-boundary text slicing
//! 5. [`llm`]      — drive the translation API call with retry/backoff; the
//!    only stage with network I/O
//! 6. [`assemble`] — render the sorted translated chapters to DOCX or PDF

pub mod assemble;
pub mod batch;
pub mod chapter;
pub mod chunk;
pub mod extract;
pub mod llm;
