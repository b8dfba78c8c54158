//! Text chunking for ingestion.
//!
//! Short submissions pass through untouched; longer ones are split into
//! overlapping windows so each chunk embeds well on its own while retrieval
//! still sees the surrounding phrasing. Boundaries prefer paragraph breaks,
//! then line breaks, then sentence ends, with a hard character cut as the
//! fallback. Pure and stateless.

/// Submissions at or below this length are stored as a single chunk.
pub const CHUNK_THRESHOLD: usize = 400;
/// Target window size in characters.
pub const CHUNK_SIZE: usize = 512;
/// Characters shared between consecutive windows.
pub const CHUNK_OVERLAP: usize = 100;

/// Splits `text` into ordered, non-empty spans.
/// Lengths are counted in Unicode scalar values — learner content is
/// frequently non-ASCII.
pub fn split_text(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= CHUNK_THRESHOLD {
        return vec![text.to_string()];
    }

    let mut spans = Vec::new();
    let mut start = 0usize;

    loop {
        let hard_end = (start + CHUNK_SIZE).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            natural_boundary(&chars, start, hard_end)
        };

        let span: String = chars[start..end].iter().collect();
        let span = span.trim();
        if !span.is_empty() {
            spans.push(span.to_string());
        }

        if end == chars.len() {
            break;
        }
        // Boundaries land past the window midpoint, so this always advances.
        start = end - CHUNK_OVERLAP;
    }

    spans
}

/// Picks a cut point in `(floor, hard_end]` where `floor` is the window
/// midpoint. Paragraph breaks win over line breaks, line breaks over sentence
/// ends; falls back to the hard cut.
fn natural_boundary(chars: &[char], start: usize, hard_end: usize) -> usize {
    let floor = start + CHUNK_SIZE / 2;

    for i in (floor..hard_end).rev() {
        if chars[i] == '\n' && chars[i - 1] == '\n' {
            return i + 1;
        }
    }
    for i in (floor..hard_end).rev() {
        if chars[i] == '\n' {
            return i + 1;
        }
    }
    for i in (floor..hard_end).rev() {
        if matches!(chars[i], '.' | '!' | '?' | '。' | '！' | '？') {
            return i + 1;
        }
    }

    hard_end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_single_span() {
        let text = "a".repeat(100);
        let spans = split_text(&text);
        assert_eq!(spans, vec![text]);
    }

    #[test]
    fn test_threshold_input_single_span() {
        let text = "b".repeat(400);
        assert_eq!(split_text(&text).len(), 1);
    }

    #[test]
    fn test_long_input_splits_with_overlap() {
        let text = "x".repeat(1000);
        let spans = split_text(&text);

        assert!(spans.len() >= 2, "expected multiple spans, got {}", spans.len());
        for span in &spans {
            assert!(span.chars().count() <= CHUNK_SIZE);
        }
        // No boundary characters anywhere, so cuts are hard and the overlap exact:
        // [0..512], [412..924], [824..1000]
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].len(), 512);
        assert_eq!(spans[1].len(), 512);
        assert_eq!(spans[2].len(), 176);
        assert_eq!(&spans[0][412..], &spans[1][..100]);
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let mut text = "c".repeat(450);
        text.push_str("\n\n");
        text.push_str(&"d".repeat(400));
        let spans = split_text(&text);

        assert!(spans[0].chars().all(|ch| ch == 'c'));
        assert_eq!(spans[0].len(), 450);
    }

    #[test]
    fn test_prefers_sentence_end_over_hard_cut() {
        let mut text = "e".repeat(449);
        text.push('.');
        text.push_str(&"f".repeat(400));
        let spans = split_text(&text);

        assert!(spans[0].ends_with('.'));
        assert_eq!(spans[0].len(), 450);
    }

    #[test]
    fn test_spans_cover_tail() {
        let text = "g".repeat(1500);
        let spans = split_text(&text);
        let tail_len = spans.last().map(|s| s.len()).unwrap_or(0);
        assert!(tail_len > 0);
        // Total coverage: every char appears in at least one span.
        let total: usize = spans.iter().map(|s| s.len()).sum();
        assert!(total >= 1500);
    }

    #[test]
    fn test_unicode_counts_scalar_values() {
        let text = "语".repeat(500);
        let spans = split_text(&text);
        assert!(spans.len() >= 2);
        for span in &spans {
            assert!(span.chars().count() <= CHUNK_SIZE);
        }
    }
}
