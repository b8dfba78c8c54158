//! Spaced-repetition scheduling math. Pure functions over explicit inputs —
//! callers pass `now` so every path is deterministic under test.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Days until the next review, indexed by review count and clamped at the top.
pub const REVIEW_INTERVALS_DAYS: [i64; 7] = [1, 2, 4, 7, 15, 30, 60];

/// Review urgency buckets, ordered most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPriority {
    High,
    Medium,
    Low,
}

impl ReviewPriority {
    /// Sort rank: high before medium before low.
    pub fn rank(self) -> u8 {
        match self {
            ReviewPriority::High => 0,
            ReviewPriority::Medium => 1,
            ReviewPriority::Low => 2,
        }
    }
}

/// Computes the next review timestamp from the interval ladder.
///
/// `_mastery_level` does not influence the interval — only `review_count`
/// drives the ladder. Long-standing client-visible behavior; kept as-is for
/// compatibility (see DESIGN.md) rather than folded into the index.
pub fn next_review_date(
    now: DateTime<Utc>,
    _mastery_level: i32,
    review_count: i32,
) -> DateTime<Utc> {
    let index = (review_count.max(0) as usize).min(REVIEW_INTERVALS_DAYS.len() - 1);
    now + Duration::days(REVIEW_INTERVALS_DAYS[index])
}

/// Buckets an item by urgency: `days_since_review × (6 − mastery_level)`.
/// Lower mastery and longer elapsed time both raise urgency.
pub fn review_priority(days_since_review: i64, mastery_level: i32) -> ReviewPriority {
    let urgency = days_since_review * (6 - mastery_level) as i64;

    if urgency >= 20 {
        ReviewPriority::High
    } else if urgency >= 10 {
        ReviewPriority::Medium
    } else {
        ReviewPriority::Low
    }
}

/// Whole days elapsed since the last review; a never-reviewed item counts
/// as reviewed just now.
pub fn days_since_review(now: DateTime<Utc>, last_reviewed: Option<DateTime<Utc>>) -> i64 {
    match last_reviewed {
        Some(reviewed) => (now - reviewed).num_days().max(0),
        None => 0,
    }
}
