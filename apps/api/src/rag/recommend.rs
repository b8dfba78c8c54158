//! Learning-recommendation rules.
//!
//! Suggestions are produced by fixed rule tables over aggregate library
//! signals — nothing here is learned or probabilistic. Each rule is a named
//! predicate with its message, testable on its own and extended by appending
//! to the table.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::learning::{ContentType, LearningChunkRow};

/// How many top tags count as "common" for the tag-based rules.
const COMMON_TAG_LIMIT: usize = 10;
/// Maximum suggested topics returned.
pub const MAX_TOPICS: usize = 5;
/// Maximum review candidates returned.
const MAX_REVIEW_CANDIDATES: usize = 5;
/// Content older than this is a review candidate.
const REVIEW_CANDIDATE_AGE_DAYS: i64 = 7;

pub const EMPTY_LIBRARY_RECOMMENDATION: &str =
    "Start by adding some learning content, such as vocabulary, grammar rules, or example sentences";
pub const STARTER_TOPICS: &[&str] = &["Basic grammar", "Common vocabulary", "Everyday conversation"];
pub const DEFAULT_RECOMMENDATION: &str = "Keep up the good learning habits!";
pub const DEFAULT_TOPICS: &[&str] = &[
    "Reading comprehension",
    "Writing practice",
    "Listening training",
];

/// Aggregate signals the rules read. Derived once per request.
#[derive(Debug, Default)]
pub struct RecommendationSignals {
    pub total_chunks: usize,
    pub vocabulary_count: usize,
    pub grammar_count: usize,
    pub note_count: usize,
    pub example_count: usize,
    pub distinct_types: usize,
    /// Top tags by frequency, most frequent first.
    pub common_tags: Vec<String>,
    /// User-authored messages across the most recent chat sessions.
    pub recent_user_questions: usize,
}

impl RecommendationSignals {
    pub fn from_library(chunks: &[LearningChunkRow], recent_user_questions: usize) -> Self {
        let mut signals = RecommendationSignals {
            total_chunks: chunks.len(),
            recent_user_questions,
            ..Default::default()
        };

        for chunk in chunks {
            match chunk.content_type {
                ContentType::Vocabulary => signals.vocabulary_count += 1,
                ContentType::Grammar => signals.grammar_count += 1,
                ContentType::Note => signals.note_count += 1,
                ContentType::Example => signals.example_count += 1,
            }
        }
        signals.distinct_types = [
            signals.vocabulary_count,
            signals.grammar_count,
            signals.note_count,
            signals.example_count,
        ]
        .iter()
        .filter(|count| **count > 0)
        .count();

        let mut tag_counts: HashMap<&str, usize> = HashMap::new();
        for chunk in chunks {
            for tag in &chunk.tags {
                *tag_counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        let mut ranked: Vec<(&str, usize)> = tag_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        signals.common_tags = ranked
            .into_iter()
            .take(COMMON_TAG_LIMIT)
            .map(|(tag, _)| tag.to_string())
            .collect();

        signals
    }

    fn has_common_tag(&self, tag: &str) -> bool {
        self.common_tags.iter().any(|t| t == tag)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendation rules
// ────────────────────────────────────────────────────────────────────────────

pub struct RecommendationRule {
    pub name: &'static str,
    pub applies: fn(&RecommendationSignals) -> bool,
    pub message: &'static str,
}

pub const RECOMMENDATION_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        name: "small-library",
        applies: |s| s.total_chunks < 10,
        message: "Keep adding more learning content to grow your knowledge base",
    },
    RecommendationRule {
        name: "vocabulary-without-examples",
        applies: |s| s.vocabulary_count > 0 && s.example_count == 0,
        message: "Consider adding example sentences to practice your vocabulary in context",
    },
    RecommendationRule {
        name: "grammar-theory-without-practice",
        applies: |s| s.has_common_tag("grammar") && !s.has_common_tag("practice"),
        message: "Consider adding some grammar exercises to reinforce the theory",
    },
    RecommendationRule {
        name: "active-chatter",
        applies: |s| s.recent_user_questions > 5,
        message: "You are very active! Consider turning the points you learned in chat into notes",
    },
];

/// Runs the rule table in order; falls back to the fixed encouragement line
/// when nothing fires.
pub fn build_recommendations(signals: &RecommendationSignals) -> Vec<String> {
    let mut recommendations: Vec<String> = RECOMMENDATION_RULES
        .iter()
        .filter(|rule| (rule.applies)(signals))
        .map(|rule| {
            tracing::debug!("recommendation rule '{}' fired", rule.name);
            rule.message.to_string()
        })
        .collect();

    if recommendations.is_empty() {
        recommendations.push(DEFAULT_RECOMMENDATION.to_string());
    }
    recommendations
}

// ────────────────────────────────────────────────────────────────────────────
// Topic rules
// ────────────────────────────────────────────────────────────────────────────

pub struct TopicRule {
    pub name: &'static str,
    pub applies: fn(&RecommendationSignals) -> bool,
    pub topics: &'static [&'static str],
}

pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        name: "grammar-focus",
        applies: |s| s.has_common_tag("grammar"),
        topics: &["Advanced grammar structures", "Grammar drills"],
    },
    TopicRule {
        name: "vocabulary-focus",
        applies: |s| s.has_common_tag("vocabulary"),
        topics: &["Synonym nuances", "Word collocations"],
    },
    TopicRule {
        name: "speaking-focus",
        applies: |s| s.has_common_tag("speaking"),
        topics: &["Pronunciation practice", "Everyday conversation"],
    },
    TopicRule {
        name: "single-modality",
        applies: |s| s.total_chunks > 0 && s.distinct_types == 1,
        topics: &["Listening material", "Video lessons"],
    },
];

/// Collects topics from every firing rule, fixed general topics when none
/// fires, truncated to [`MAX_TOPICS`].
pub fn suggest_topics(signals: &RecommendationSignals) -> Vec<String> {
    let mut topics: Vec<String> = TOPIC_RULES
        .iter()
        .filter(|rule| (rule.applies)(signals))
        .flat_map(|rule| {
            tracing::debug!("topic rule '{}' fired", rule.name);
            rule.topics.iter().map(|t| t.to_string())
        })
        .collect();

    if topics.is_empty() {
        topics = DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect();
    }
    topics.truncate(MAX_TOPICS);
    topics
}

/// Chunks older than a week, newest first (callers pass chunks already in
/// newest-first order), capped at [`MAX_REVIEW_CANDIDATES`].
pub fn review_candidates(
    chunks: &[LearningChunkRow],
    now: DateTime<Utc>,
) -> Vec<LearningChunkRow> {
    let cutoff = now - Duration::days(REVIEW_CANDIDATE_AGE_DAYS);
    chunks
        .iter()
        .filter(|chunk| chunk.created_at < cutoff)
        .take(MAX_REVIEW_CANDIDATES)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn make_chunk(
        content_type: ContentType,
        tags: &[&str],
        age_days: i64,
    ) -> LearningChunkRow {
        LearningChunkRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: "body".to_string(),
            content_type,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            metadata: json!({}),
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_signals_count_types_and_tags() {
        let chunks = vec![
            make_chunk(ContentType::Vocabulary, &["jlpt", "nouns"], 0),
            make_chunk(ContentType::Vocabulary, &["jlpt"], 0),
            make_chunk(ContentType::Grammar, &["jlpt"], 0),
        ];
        let signals = RecommendationSignals::from_library(&chunks, 0);

        assert_eq!(signals.total_chunks, 3);
        assert_eq!(signals.vocabulary_count, 2);
        assert_eq!(signals.grammar_count, 1);
        assert_eq!(signals.distinct_types, 2);
        assert_eq!(signals.common_tags[0], "jlpt");
    }

    #[test]
    fn test_small_library_rule_fires() {
        let chunks = vec![make_chunk(ContentType::Note, &[], 0)];
        let recommendations =
            build_recommendations(&RecommendationSignals::from_library(&chunks, 0));
        assert!(recommendations
            .iter()
            .any(|r| r.contains("Keep adding more learning content")));
    }

    #[test]
    fn test_vocabulary_without_examples_rule() {
        let signals = RecommendationSignals {
            total_chunks: 20,
            vocabulary_count: 20,
            ..Default::default()
        };
        let recommendations = build_recommendations(&signals);
        assert!(recommendations
            .iter()
            .any(|r| r.contains("example sentences")));
    }

    #[test]
    fn test_grammar_without_practice_rule() {
        let signals = RecommendationSignals {
            total_chunks: 15,
            common_tags: vec!["grammar".to_string()],
            ..Default::default()
        };
        let recommendations = build_recommendations(&signals);
        assert!(recommendations
            .iter()
            .any(|r| r.contains("grammar exercises")));

        let with_practice = RecommendationSignals {
            total_chunks: 15,
            common_tags: vec!["grammar".to_string(), "practice".to_string()],
            ..Default::default()
        };
        assert!(!build_recommendations(&with_practice)
            .iter()
            .any(|r| r.contains("grammar exercises")));
    }

    #[test]
    fn test_active_chatter_rule_needs_more_than_five() {
        let mut signals = RecommendationSignals {
            total_chunks: 15,
            recent_user_questions: 5,
            ..Default::default()
        };
        assert!(!build_recommendations(&signals)
            .iter()
            .any(|r| r.contains("very active")));

        signals.recent_user_questions = 6;
        assert!(build_recommendations(&signals)
            .iter()
            .any(|r| r.contains("very active")));
    }

    #[test]
    fn test_default_recommendation_when_nothing_fires() {
        let signals = RecommendationSignals {
            total_chunks: 15,
            example_count: 15,
            distinct_types: 2, // avoid the single-modality topic path mattering here
            ..Default::default()
        };
        assert_eq!(
            build_recommendations(&signals),
            vec![DEFAULT_RECOMMENDATION.to_string()]
        );
    }

    #[test]
    fn test_topic_rules_accumulate_and_truncate() {
        let signals = RecommendationSignals {
            total_chunks: 15,
            vocabulary_count: 15,
            distinct_types: 1,
            common_tags: vec![
                "grammar".to_string(),
                "vocabulary".to_string(),
                "speaking".to_string(),
            ],
            ..Default::default()
        };
        let topics = suggest_topics(&signals);
        // grammar(2) + vocabulary(2) + speaking(2) + single-modality(2) = 8, capped.
        assert_eq!(topics.len(), MAX_TOPICS);
        assert_eq!(topics[0], "Advanced grammar structures");
    }

    #[test]
    fn test_default_topics_when_nothing_fires() {
        let signals = RecommendationSignals {
            total_chunks: 15,
            vocabulary_count: 10,
            note_count: 5,
            distinct_types: 2,
            ..Default::default()
        };
        assert_eq!(
            suggest_topics(&signals),
            DEFAULT_TOPICS
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_review_candidates_old_content_only() {
        let chunks = vec![
            make_chunk(ContentType::Note, &[], 1),
            make_chunk(ContentType::Note, &[], 10),
            make_chunk(ContentType::Note, &[], 30),
        ];
        let candidates = review_candidates(&chunks, Utc::now());
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_review_candidates_capped_at_five() {
        let chunks: Vec<LearningChunkRow> =
            (0..8).map(|_| make_chunk(ContentType::Note, &[], 20)).collect();
        assert_eq!(review_candidates(&chunks, Utc::now()).len(), 5);
    }
}
