// Learning statistics.
// Pure aggregation over two independent queries (chunks, progress) — no join.

pub mod handlers;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::learning::ContentType;

/// Days covered by the weekly window, today inclusive.
const WEEKLY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Serialize, PartialEq)]
pub struct MasteryBucket {
    pub level: i32,
    pub count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailyProgress {
    pub date: String,
    pub items_added: usize,
    pub items_reviewed: usize,
}

#[derive(Debug, Serialize)]
pub struct LearningStats {
    pub total_items: usize,
    pub vocabulary_count: usize,
    pub grammar_count: usize,
    pub note_count: usize,
    pub example_count: usize,
    pub mastery_distribution: Vec<MasteryBucket>,
    pub weekly_progress: Vec<DailyProgress>,
}

/// Aggregates a user's library into the stats view.
///
/// `chunks` carries (content_type, created_at) pairs, `progress` carries
/// (mastery_level, last_reviewed) pairs. Timestamps match window days by
/// their `YYYY-MM-DD` prefix in UTC. The weekly window runs oldest → today.
pub fn aggregate_stats(
    now: DateTime<Utc>,
    chunks: &[(ContentType, DateTime<Utc>)],
    progress: &[(i32, Option<DateTime<Utc>>)],
) -> LearningStats {
    let count_type = |wanted: ContentType| chunks.iter().filter(|(t, _)| *t == wanted).count();

    let mastery_distribution = (0..=5)
        .map(|level| MasteryBucket {
            level,
            count: progress.iter().filter(|(m, _)| *m == level).count(),
        })
        .collect();

    let weekly_progress = (0..WEEKLY_WINDOW_DAYS)
        .rev()
        .map(|days_back| {
            let date = day_key(now - Duration::days(days_back));
            DailyProgress {
                items_added: chunks.iter().filter(|(_, at)| day_key(*at) == date).count(),
                items_reviewed: progress
                    .iter()
                    .filter(|(_, reviewed)| {
                        reviewed.map(day_key).as_deref() == Some(date.as_str())
                    })
                    .count(),
                date,
            }
        })
        .collect();

    LearningStats {
        total_items: chunks.len(),
        vocabulary_count: count_type(ContentType::Vocabulary),
        grammar_count: count_type(ContentType::Grammar),
        note_count: count_type(ContentType::Note),
        example_count: count_type(ContentType::Example),
        mastery_distribution,
        weekly_progress,
    }
}

fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_counts_by_type() {
        let chunks = vec![
            (ContentType::Vocabulary, now()),
            (ContentType::Vocabulary, now()),
            (ContentType::Grammar, now()),
            (ContentType::Example, now()),
        ];
        let stats = aggregate_stats(now(), &chunks, &[]);

        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.vocabulary_count, 2);
        assert_eq!(stats.grammar_count, 1);
        assert_eq!(stats.note_count, 0);
        assert_eq!(stats.example_count, 1);
    }

    #[test]
    fn test_mastery_histogram_covers_all_levels() {
        let progress = vec![(0, None), (0, None), (3, None), (5, None)];
        let stats = aggregate_stats(now(), &[], &progress);

        assert_eq!(stats.mastery_distribution.len(), 6);
        assert_eq!(stats.mastery_distribution[0], MasteryBucket { level: 0, count: 2 });
        assert_eq!(stats.mastery_distribution[3], MasteryBucket { level: 3, count: 1 });
        assert_eq!(stats.mastery_distribution[4], MasteryBucket { level: 4, count: 0 });
        assert_eq!(stats.mastery_distribution[5], MasteryBucket { level: 5, count: 1 });
    }

    #[test]
    fn test_weekly_window_oldest_to_today() {
        let stats = aggregate_stats(now(), &[], &[]);

        assert_eq!(stats.weekly_progress.len(), 7);
        assert_eq!(stats.weekly_progress[0].date, "2024-05-14");
        assert_eq!(stats.weekly_progress[6].date, "2024-05-20");
    }

    #[test]
    fn test_weekly_counts_match_by_day_prefix() {
        let yesterday = now() - Duration::days(1);
        let chunks = vec![
            (ContentType::Note, now()),
            (ContentType::Note, yesterday),
            (ContentType::Note, yesterday),
            // Outside the window entirely.
            (ContentType::Note, now() - Duration::days(30)),
        ];
        let progress = vec![(2, Some(yesterday)), (1, None)];
        let stats = aggregate_stats(now(), &chunks, &progress);

        let today = &stats.weekly_progress[6];
        assert_eq!(today.items_added, 1);
        assert_eq!(today.items_reviewed, 0);

        let day_before = &stats.weekly_progress[5];
        assert_eq!(day_before.items_added, 2);
        assert_eq!(day_before.items_reviewed, 1);
    }

    #[test]
    fn test_never_reviewed_rows_count_nowhere_in_window() {
        let progress = vec![(0, None); 5];
        let stats = aggregate_stats(now(), &[], &progress);
        assert!(stats.weekly_progress.iter().all(|d| d.items_reviewed == 0));
    }
}
