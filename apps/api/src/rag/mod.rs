// Retrieval-augmented learning pipeline.
// Implements: content chunking, ingestion with embeddings, context retrieval
// (vector and keyword strategies), prompt construction, relevance scoring and
// recommendations. All LLM calls go through llm_client — no direct provider
// calls here.

pub mod assistant;
pub mod chunker;
pub mod handlers;
pub mod ingest;
pub mod prompt;
pub mod recommend;
pub mod relevance;
pub mod retrieval;

/// Minimum similarity a retrieved chunk must reach to ground an answer.
pub const MATCH_THRESHOLD: f64 = 0.7;
/// Maximum number of chunks retrieved per query.
pub const MATCH_COUNT: i64 = 5;

/// Renders an embedding as the pgvector text literal (`[x1,x2,...]`).
/// sqlx has no native vector type, so queries bind this and cast with `::vector`.
pub(crate) fn vector_literal(embedding: &[f32]) -> String {
    let mut out = String::with_capacity(embedding.len() * 10 + 2);
    out.push('[');
    for (i, v) in embedding.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_literal_format() {
        assert_eq!(vector_literal(&[0.25, -1.0, 3.5]), "[0.25,-1,3.5]");
    }

    #[test]
    fn test_vector_literal_empty() {
        assert_eq!(vector_literal(&[]), "[]");
    }
}
