//! Text chunking: split extracted text into bounded windows for the
//! summarization API.
//!
//! The inference endpoint truncates long inputs, so documents are submitted
//! as consecutive fixed-width windows and summarized piecewise. Splits are
//! purely positional — no sentence- or word-boundary awareness. A chunk can
//! therefore cut a sentence in half; summarization quality tolerates this in
//! practice, and positional splitting keeps the operation total, trivially
//! testable, and exactly reconstructible.
//!
//! Window width is measured in Unicode scalar values, not bytes, so splits
//! never land inside a multi-byte UTF-8 sequence.

/// Split `text` into consecutive windows of at most `max_size` characters.
///
/// Every window except possibly the last has exactly `max_size` characters;
/// concatenating the windows reproduces `text` verbatim. Empty input (or a
/// zero width) yields an empty vector — this function has no failure mode.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.is_empty() || max_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::with_capacity(text.len() / max_size + 1);
    let mut current = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == max_size {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 2000).is_empty());
        assert!(chunk_text("", 1).is_empty());
    }

    #[test]
    fn zero_width_yields_no_chunks() {
        assert!(chunk_text("hello", 0).is_empty());
    }

    #[test]
    fn exact_windows_then_remainder() {
        let text = "a".repeat(2500);
        let chunks = chunk_text(&text, 1000);
        assert_eq!(
            chunks.iter().map(|c| c.chars().count()).collect::<Vec<_>>(),
            vec![1000, 1000, 500]
        );
    }

    #[test]
    fn concatenation_reconstructs_input() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(97);
        for size in [1, 7, 100, 1000] {
            let chunks = chunk_text(&text, size);
            assert_eq!(chunks.concat(), text, "size={size}");
            for (i, c) in chunks.iter().enumerate() {
                if i + 1 < chunks.len() {
                    assert_eq!(c.chars().count(), size);
                }
            }
        }
    }

    #[test]
    fn text_shorter_than_window_is_one_chunk() {
        let chunks = chunk_text("short", 2000);
        assert_eq!(chunks, vec!["short".to_string()]);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        // 3-byte chars; byte-positional splitting would panic or corrupt.
        let text = "日本語のテキスト要約".repeat(10);
        let chunks = chunk_text(&text, 7);
        assert_eq!(chunks.concat(), text);
        assert!(chunks[..chunks.len() - 1]
            .iter()
            .all(|c| c.chars().count() == 7));
    }

    #[test]
    fn input_length_a_multiple_of_window_has_no_short_tail() {
        let text = "x".repeat(3000);
        let chunks = chunk_text(&text, 1000);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 1000));
    }
}
