//! Keyword relevance and pairwise-similarity heuristics.
//!
//! Both scorers are declarative rule tables: each rule is a named function
//! contributing a score delta, summed by the driver. Rules are unit-tested
//! individually and extended by appending to the table.
//!
//! Neither scorer is a normalized metric — there is no IDF or length
//! normalization, so scores are sensitive to content length. Callers rank
//! and truncate; they must not compare scores across different libraries.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::models::learning::{ContentType, LearningChunkRow};

/// At most this many relevant chunks survive ranking.
pub const MAX_RELEVANT: usize = 5;

/// Pairs below this similarity are not considered related.
pub const RELATED_MIN_SIMILARITY: f32 = 0.1;

/// A question prepared for relevance scoring: lowercased once, with
/// whitespace tokens longer than one character kept as keywords.
#[derive(Debug, Clone)]
pub struct Question {
    pub lowered: String,
    pub keywords: Vec<String>,
}

impl Question {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let keywords = lowered
            .split_whitespace()
            .filter(|w| w.chars().count() > 1)
            .map(String::from)
            .collect();
        Self { lowered, keywords }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Relevance rules (question vs chunk)
// ────────────────────────────────────────────────────────────────────────────

pub struct RelevanceRule {
    pub name: &'static str,
    pub apply: fn(&Question, &LearningChunkRow) -> u32,
}

/// +1 per question keyword appearing as a substring of the chunk body.
fn keyword_in_content(q: &Question, chunk: &LearningChunkRow) -> u32 {
    let content = chunk.content.to_lowercase();
    q.keywords.iter().filter(|k| content.contains(k.as_str())).count() as u32
}

/// +2 per chunk tag appearing as a substring of the question.
fn tag_in_question(q: &Question, chunk: &LearningChunkRow) -> u32 {
    2 * chunk
        .tags
        .iter()
        .filter(|t| q.lowered.contains(&t.to_lowercase()))
        .count() as u32
}

/// +1 when the question asks about grammar and the chunk is grammar content.
fn grammar_affinity(q: &Question, chunk: &LearningChunkRow) -> u32 {
    u32::from(q.lowered.contains("grammar") && chunk.content_type == ContentType::Grammar)
}

pub const RELEVANCE_RULES: &[RelevanceRule] = &[
    RelevanceRule {
        name: "keyword-in-content",
        apply: keyword_in_content,
    },
    RelevanceRule {
        name: "tag-in-question",
        apply: tag_in_question,
    },
    RelevanceRule {
        name: "grammar-affinity",
        apply: grammar_affinity,
    },
];

/// Per-rule score deltas, in table order. Useful for tests and diagnostics.
pub fn relevance_breakdown(
    q: &Question,
    chunk: &LearningChunkRow,
) -> Vec<(&'static str, u32)> {
    RELEVANCE_RULES
        .iter()
        .map(|r| (r.name, (r.apply)(q, chunk)))
        .collect()
}

pub fn relevance_score(q: &Question, chunk: &LearningChunkRow) -> u32 {
    relevance_breakdown(q, chunk)
        .into_iter()
        .map(|(_, delta)| delta)
        .sum()
}

/// Scores `chunks` against `question`, drops zero-scored entries, sorts
/// descending by score and truncates to [`MAX_RELEVANT`]. The sort is stable:
/// equal scores keep the incoming (most-recent-first) order.
pub fn rank_by_relevance<'a>(
    question: &str,
    chunks: &'a [LearningChunkRow],
) -> Vec<(&'a LearningChunkRow, u32)> {
    let q = Question::parse(question);
    let mut scored: Vec<(&LearningChunkRow, u32)> = chunks
        .iter()
        .map(|c| (c, relevance_score(&q, c)))
        .filter(|(_, score)| *score > 0)
        .collect();
    scored.sort_by_key(|(_, score)| Reverse(*score));
    scored.truncate(MAX_RELEVANT);
    scored
}

// ────────────────────────────────────────────────────────────────────────────
// Similarity rules (chunk vs chunk)
// ────────────────────────────────────────────────────────────────────────────

pub struct SimilarityRule {
    pub name: &'static str,
    pub apply: fn(&LearningChunkRow, &LearningChunkRow) -> f32,
}

/// +0.3 per tag of `a` also carried by `b`. Duplicate tags on `a` count
/// each time they match.
fn shared_tags(a: &LearningChunkRow, b: &LearningChunkRow) -> f32 {
    a.tags.iter().filter(|t| b.tags.contains(*t)).count() as f32 * 0.3
}

/// +0.2 when both chunks have the same content type.
fn same_content_type(a: &LearningChunkRow, b: &LearningChunkRow) -> f32 {
    if a.content_type == b.content_type {
        0.2
    } else {
        0.0
    }
}

/// Up to +0.5 from body-word overlap: +0.1 per whitespace token of `a`
/// (longer than two characters) also present in `b`.
fn shared_words(a: &LearningChunkRow, b: &LearningChunkRow) -> f32 {
    let b_lowered = b.content.to_lowercase();
    let b_words: HashSet<&str> = b_lowered.split_whitespace().collect();
    let a_lowered = a.content.to_lowercase();
    let shared = a_lowered
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && b_words.contains(w))
        .count();
    (shared as f32 * 0.1).min(0.5)
}

pub const SIMILARITY_RULES: &[SimilarityRule] = &[
    SimilarityRule {
        name: "shared-tags",
        apply: shared_tags,
    },
    SimilarityRule {
        name: "same-content-type",
        apply: same_content_type,
    },
    SimilarityRule {
        name: "shared-words",
        apply: shared_words,
    },
];

/// Per-rule similarity deltas, in table order, before the cap.
pub fn similarity_breakdown(
    a: &LearningChunkRow,
    b: &LearningChunkRow,
) -> Vec<(&'static str, f32)> {
    SIMILARITY_RULES
        .iter()
        .map(|r| (r.name, (r.apply)(a, b)))
        .collect()
}

/// Heuristic similarity in [0, 1]: rule deltas summed and capped.
pub fn similarity_score(a: &LearningChunkRow, b: &LearningChunkRow) -> f32 {
    similarity_breakdown(a, b)
        .into_iter()
        .map(|(_, delta)| delta)
        .sum::<f32>()
        .min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn make_chunk(content: &str, content_type: ContentType, tags: &[&str]) -> LearningChunkRow {
        LearningChunkRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: content.to_string(),
            content_type,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            metadata: json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_question_keeps_tokens_longer_than_one_char() {
        let q = Question::parse("Is the word 'run' a verb?");
        assert!(q.keywords.iter().all(|k| k.chars().count() > 1));
        assert!(!q.keywords.contains(&"a".to_string()));
    }

    #[test]
    fn test_keyword_rule_counts_each_hit() {
        let q = Question::parse("passive voice usage");
        let chunk = make_chunk(
            "The passive voice moves the object forward.",
            ContentType::Grammar,
            &[],
        );
        assert_eq!(keyword_in_content(&q, &chunk), 2); // "passive", "voice"
    }

    #[test]
    fn test_tag_rule_scores_two_per_match() {
        let q = Question::parse("how does grammar work here");
        let chunk = make_chunk("irrelevant", ContentType::Note, &["grammar"]);
        assert_eq!(tag_in_question(&q, &chunk), 2);
    }

    #[test]
    fn test_grammar_affinity_requires_both_sides() {
        let q = Question::parse("explain this grammar point");
        let grammar = make_chunk("conjugation table", ContentType::Grammar, &[]);
        let vocab = make_chunk("conjugation table", ContentType::Vocabulary, &[]);
        assert_eq!(grammar_affinity(&q, &grammar), 1);
        assert_eq!(grammar_affinity(&q, &vocab), 0);
    }

    #[test]
    fn test_grammar_tag_and_term_scores_at_least_two() {
        let q = Question::parse("a grammar question");
        let chunk = make_chunk("some note body", ContentType::Note, &["grammar"]);
        assert!(relevance_score(&q, &chunk) >= 2);
    }

    #[test]
    fn test_no_overlap_scores_zero_and_is_excluded() {
        let chunks = vec![make_chunk("completely unrelated", ContentType::Note, &["food"])];
        let ranked = rank_by_relevance("weather tomorrow", &chunks);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_ranking_descending_and_truncated() {
        // Each chunk covers one more question keyword than the previous one.
        let keywords = ["verb", "tense", "past", "conjugation", "irregular", "ending", "stem"];
        let chunks: Vec<LearningChunkRow> = (0..keywords.len())
            .map(|i| make_chunk(&keywords[..=i].join(" "), ContentType::Note, &[]))
            .collect();

        let ranked = rank_by_relevance(&keywords.join(" "), &chunks);
        assert_eq!(ranked.len(), MAX_RELEVANT);
        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        // The full-coverage chunk wins.
        assert_eq!(ranked[0].1, keywords.len() as u32);
    }

    #[test]
    fn test_breakdown_names_match_table() {
        let q = Question::parse("a grammar question");
        let chunk = make_chunk("body", ContentType::Note, &["grammar"]);
        let breakdown = relevance_breakdown(&q, &chunk);
        let names: Vec<&str> = breakdown.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["keyword-in-content", "tag-in-question", "grammar-affinity"]
        );
    }

    #[test]
    fn test_ranking_ties_keep_incoming_order() {
        let first = make_chunk("the verb runs", ContentType::Note, &[]);
        let second = make_chunk("the verb walks", ContentType::Note, &[]);
        let chunks = vec![first.clone(), second.clone()];
        let ranked = rank_by_relevance("verb", &chunks);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0.id, first.id);
        assert_eq!(ranked[1].0.id, second.id);
    }

    #[test]
    fn test_similarity_shared_tags() {
        let a = make_chunk("x", ContentType::Note, &["travel", "idioms"]);
        let b = make_chunk("y", ContentType::Vocabulary, &["idioms"]);
        assert!((shared_tags(&a, &b) - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_same_type() {
        let a = make_chunk("x", ContentType::Note, &[]);
        let b = make_chunk("y", ContentType::Note, &[]);
        assert!((same_content_type(&a, &b) - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_shared_words_capped() {
        let body = "sakura blossom spring festival hanami picnic weather";
        let a = make_chunk(body, ContentType::Note, &[]);
        let b = make_chunk(body, ContentType::Note, &[]);
        // 7 shared words would give 0.7; the word rule caps at 0.5.
        assert!((shared_words(&a, &b) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_ignores_short_words() {
        let a = make_chunk("go to it", ContentType::Note, &[]);
        let b = make_chunk("go to it", ContentType::Example, &[]);
        assert_eq!(shared_words(&a, &b), 0.0);
    }

    #[test]
    fn test_similarity_total_capped_at_one() {
        let tags = ["a", "b", "c", "d"];
        let body = "morning evening afternoon nighttime weekend holiday";
        let a = make_chunk(body, ContentType::Note, &tags);
        let b = make_chunk(body, ContentType::Note, &tags);
        // 4*0.3 + 0.2 + 0.5 = 1.9 before the cap.
        assert!((similarity_score(&a, &b) - 1.0).abs() < f32::EPSILON);
    }
}
