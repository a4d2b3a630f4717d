//! System prompts for LLM-based translation.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the translation instruction
//!    requires editing exactly one place, without touching retry or
//!    error-handling logic in the client.
//!
//! 2. **Testability** — unit tests can inspect the prompt directly without
//!    issuing a real API call.

/// Build the system instruction for translating a segment into
/// `target_language`.
///
/// The instruction asks the model to preserve paragraph breaks and
/// formatting so the chapter reassembly step can join segments without
/// losing document structure.
pub fn translation_system_prompt(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the following text from \
         English to {target_language} while preserving paragraph breaks, \
         formatting, and the original meaning as accurately as possible."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_target_language() {
        let prompt = translation_system_prompt("Portuguese");
        assert!(prompt.contains("Portuguese"));
        assert!(prompt.contains("paragraph breaks"));
    }
}
