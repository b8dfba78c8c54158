//! Deterministic rendering of retrieved contexts into a prompt block.
//!
//! Pure function of its input: the same contexts must always produce the
//! same prompt text.

use crate::models::learning::RetrievedContext;

/// Returned verbatim when retrieval produced nothing.
pub const NO_CONTEXT_SENTENCE: &str = "No relevant content found in your knowledge base yet.";

const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Renders contexts into numbered blocks joined by a separator line.
/// Tags and metadata lines appear only when present; the similarity is a
/// percentage with one decimal place.
pub fn build_context_prompt(contexts: &[RetrievedContext]) -> String {
    if contexts.is_empty() {
        return NO_CONTEXT_SENTENCE.to_string();
    }

    contexts
        .iter()
        .enumerate()
        .map(|(index, ctx)| render_block(index + 1, ctx))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

fn render_block(index: usize, ctx: &RetrievedContext) -> String {
    let mut block = format!(
        "[Knowledge {} - {}]\nContent: {}",
        index,
        ctx.content_type.label(),
        ctx.content
    );

    if !ctx.tags.is_empty() {
        block.push_str("\nTags: ");
        block.push_str(&ctx.tags.join(", "));
    }

    let has_metadata = ctx.metadata.as_object().is_some_and(|m| !m.is_empty());
    if has_metadata {
        block.push_str("\nAdditional info: ");
        block.push_str(&serde_json::to_string_pretty(&ctx.metadata).unwrap_or_default());
    }

    block.push_str(&format!("\nSimilarity: {:.1}%", ctx.similarity * 100.0));
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::learning::ContentType;
    use serde_json::json;
    use uuid::Uuid;

    fn make_context(
        content: &str,
        content_type: ContentType,
        tags: &[&str],
        metadata: serde_json::Value,
        similarity: f64,
    ) -> RetrievedContext {
        RetrievedContext {
            id: Uuid::new_v4(),
            content: content.to_string(),
            content_type,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            metadata,
            similarity,
        }
    }

    #[test]
    fn test_empty_contexts_fixed_sentence() {
        assert_eq!(build_context_prompt(&[]), NO_CONTEXT_SENTENCE);
    }

    #[test]
    fn test_single_vocabulary_block() {
        let ctx = make_context(
            "猫 (neko) — cat",
            ContentType::Vocabulary,
            &[],
            json!({}),
            0.873,
        );
        let prompt = build_context_prompt(&[ctx]);

        assert!(prompt.starts_with("[Knowledge 1 - Vocabulary]"));
        assert!(prompt.contains("Content: 猫 (neko) — cat"));
        assert!(prompt.contains("87.3%"));
        assert!(!prompt.contains("Tags:"));
        assert!(!prompt.contains("Additional info:"));
    }

    #[test]
    fn test_tags_and_metadata_rendered_when_present() {
        let ctx = make_context(
            "て-form connects clauses",
            ContentType::Grammar,
            &["grammar", "n5"],
            json!({"source": "textbook"}),
            0.92,
        );
        let prompt = build_context_prompt(&[ctx]);

        assert!(prompt.contains("Tags: grammar, n5"));
        assert!(prompt.contains("Additional info:"));
        assert!(prompt.contains("\"source\""));
        assert!(prompt.contains("92.0%"));
    }

    #[test]
    fn test_blocks_joined_by_separator_with_running_index() {
        let first = make_context("first", ContentType::Note, &[], json!({}), 0.9);
        let second = make_context("second", ContentType::Example, &[], json!({}), 0.8);
        let prompt = build_context_prompt(&[first, second]);

        assert!(prompt.contains("\n\n---\n\n"));
        assert!(prompt.contains("[Knowledge 1 - Note]"));
        assert!(prompt.contains("[Knowledge 2 - Example]"));
    }

    #[test]
    fn test_deterministic_for_same_input() {
        let ctx = make_context("stable", ContentType::Note, &["t"], json!({"k": 1}), 0.75);
        let a = build_context_prompt(std::slice::from_ref(&ctx));
        let b = build_context_prompt(std::slice::from_ref(&ctx));
        assert_eq!(a, b);
    }
}
