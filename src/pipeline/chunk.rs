//! Fixed-width text chunking.
//!
//! No semantic awareness of sentence or paragraph boundaries: the only
//! contract is that segments are contiguous, non-overlapping, each at most
//! `max_chars` characters, and concatenate back to the original text
//! exactly. Splitting counts characters, not bytes, so multi-byte text is
//! never cut mid-codepoint.

/// Split `text` into segments of at most `max_chars` characters.
///
/// The final segment may be shorter. Empty text yields an empty vector.
/// A `max_chars` of zero is treated as one.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut segments = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            segments.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        segments.push(text[start..].to_string());
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_ascii() {
        let text = "The quick brown fox jumps over the lazy dog";
        for max in [1, 3, 7, 100] {
            let segments = split_text(text, max);
            assert!(segments.iter().all(|s| s.chars().count() <= max));
            assert_eq!(segments.concat(), text, "max={max}");
        }
    }

    #[test]
    fn round_trip_multibyte() {
        let text = "héllo wörld — 你好世界 🦀🦀";
        for max in [1, 2, 5, 64] {
            let segments = split_text(text, max);
            assert!(segments.iter().all(|s| s.chars().count() <= max));
            assert_eq!(segments.concat(), text, "max={max}");
        }
    }

    #[test]
    fn empty_text_yields_no_segments() {
        assert!(split_text("", 10).is_empty());
    }

    #[test]
    fn short_text_is_a_single_segment() {
        assert_eq!(split_text("abc", 10), vec!["abc"]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_segment() {
        let segments = split_text("abcdef", 2);
        assert_eq!(segments, vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn zero_width_is_treated_as_one() {
        assert_eq!(split_text("ab", 0), vec!["a", "b"]);
    }
}
