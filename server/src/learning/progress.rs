use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{SkillLevel, topics_for};

/// Completed challenges needed to reach intermediate / advanced.
const INTERMEDIATE_THRESHOLD: usize = 10;
const ADVANCED_THRESHOLD: usize = 40;

/// Scores below this send the learner back to review the same topic.
const REVIEW_SCORE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ChallengeCompleted,
    LessonFinished,
    ProjectDone,
}

/// A learning activity reported by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
    /// Minutes spent.
    #[serde(default)]
    pub time_spent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub user_id: String,
    pub activity: ActivityKind,
    pub topic: Option<String>,
    pub score: Option<u32>,
    pub time_spent: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub topic: String,
    pub difficulty: SkillLevel,
    pub estimated_time: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub progress: ProgressEntry,
    pub next_recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub total_activities: usize,
    pub completed_challenges: usize,
    pub lessons_finished: usize,
    pub projects_done: usize,
    pub total_time_minutes: u64,
    pub level: SkillLevel,
    /// Consecutive days with activity, ending today or yesterday.
    pub streak_days: u32,
}

/// In-memory activity log per user. Lives for the process lifetime.
#[derive(Default)]
pub struct ProgressTracker {
    entries: DashMap<String, Vec<ProgressEntry>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, user_id: &str, activity: Activity) -> ProgressUpdate {
        let entry = ProgressEntry {
            user_id: user_id.to_string(),
            activity: activity.kind,
            topic: activity.topic,
            score: activity.score,
            time_spent: activity.time_spent,
            timestamp: Utc::now(),
        };

        let mut log = self.entries.entry(user_id.to_string()).or_default();
        log.push(entry.clone());
        let next = recommend(&log);
        drop(log);

        info!(%user_id, activity = ?entry.activity, "progress tracked");
        ProgressUpdate {
            progress: entry,
            next_recommendation: next,
        }
    }

    pub fn stats(&self, user_id: &str) -> LearningStats {
        self.stats_on(user_id, Utc::now().date_naive())
    }

    fn stats_on(&self, user_id: &str, today: NaiveDate) -> LearningStats {
        let empty = Vec::new();
        let log = self.entries.get(user_id);
        let entries = log.as_deref().unwrap_or(&empty);

        let count = |kind| entries.iter().filter(|e| e.activity == kind).count();
        let completed_challenges = count(ActivityKind::ChallengeCompleted);

        LearningStats {
            total_activities: entries.len(),
            completed_challenges,
            lessons_finished: count(ActivityKind::LessonFinished),
            projects_done: count(ActivityKind::ProjectDone),
            total_time_minutes: entries
                .iter()
                .map(|e| u64::from(e.time_spent.unwrap_or(0)))
                .sum(),
            level: level_for(completed_challenges),
            streak_days: streak(entries, today),
        }
    }
}

fn level_for(completed_challenges: usize) -> SkillLevel {
    if completed_challenges >= ADVANCED_THRESHOLD {
        SkillLevel::Advanced
    } else if completed_challenges >= INTERMEDIATE_THRESHOLD {
        SkillLevel::Intermediate
    } else {
        SkillLevel::Beginner
    }
}

/// Review the last topic after a weak score, otherwise move on to the next
/// catalog topic for the learner's level.
fn recommend(log: &[ProgressEntry]) -> Recommendation {
    let completed = log
        .iter()
        .filter(|e| e.activity == ActivityKind::ChallengeCompleted)
        .count();
    let level = level_for(completed);
    let topics = topics_for(level);
    let last = log.last();

    if let Some(last) = last
        && let (Some(topic), Some(score)) = (&last.topic, last.score)
        && score < REVIEW_SCORE
    {
        return Recommendation {
            kind: "review",
            topic: topic.clone(),
            difficulty: level,
            estimated_time: "20 minutes",
        };
    }

    let next_topic = last
        .and_then(|e| e.topic.as_deref())
        .and_then(|t| topics.iter().position(|c| *c == t))
        .map(|i| topics[(i + 1) % topics.len()])
        .unwrap_or(topics[0]);

    Recommendation {
        kind: "challenge",
        topic: next_topic.to_string(),
        difficulty: level,
        estimated_time: "30 minutes",
    }
}

fn streak(entries: &[ProgressEntry], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = entries.iter().map(|e| e.timestamp.date_naive()).collect();

    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut count = 0;
    while days.contains(&cursor) {
        count += 1;
        match cursor.checked_sub_days(Days::new(1)) {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(kind: ActivityKind, topic: Option<&str>, score: Option<u32>) -> Activity {
        Activity {
            kind,
            topic: topic.map(String::from),
            score,
            time_spent: Some(15),
        }
    }

    fn entry_on(date: NaiveDate) -> ProgressEntry {
        ProgressEntry {
            user_id: "u".into(),
            activity: ActivityKind::LessonFinished,
            topic: None,
            score: None,
            time_spent: None,
            timestamp: date.and_hms_opt(12, 0, 0).unwrap().and_utc(),
        }
    }

    #[test]
    fn test_activity_deserializes_type_field() {
        let a: Activity = serde_json::from_str(
            r#"{"type": "challenge_completed", "topic": "Arrays and Objects", "score": 90, "timeSpent": 25}"#,
        )
        .unwrap();
        assert_eq!(a.kind, ActivityKind::ChallengeCompleted);
        assert_eq!(a.time_spent, Some(25));
    }

    #[test]
    fn test_track_recommends_next_topic() {
        let tracker = ProgressTracker::new();
        let update = tracker.track(
            "u1",
            activity(
                ActivityKind::ChallengeCompleted,
                Some("Functions and Scope"),
                Some(85),
            ),
        );
        assert_eq!(update.progress.user_id, "u1");
        assert_eq!(update.next_recommendation.kind, "challenge");
        assert_eq!(update.next_recommendation.topic, "Arrays and Objects");
        assert_eq!(update.next_recommendation.difficulty, SkillLevel::Beginner);
    }

    #[test]
    fn test_low_score_recommends_review() {
        let tracker = ProgressTracker::new();
        let update = tracker.track(
            "u1",
            activity(ActivityKind::ChallengeCompleted, Some("Event Handling"), Some(30)),
        );
        assert_eq!(update.next_recommendation.kind, "review");
        assert_eq!(update.next_recommendation.topic, "Event Handling");
    }

    #[test]
    fn test_unknown_topic_starts_at_first() {
        let tracker = ProgressTracker::new();
        let update = tracker.track("u1", activity(ActivityKind::ProjectDone, Some("Todo app"), None));
        assert_eq!(update.next_recommendation.topic, "Variables and Data Types");
    }

    #[test]
    fn test_stats_counts_and_level() {
        let tracker = ProgressTracker::new();
        for _ in 0..10 {
            tracker.track("u1", activity(ActivityKind::ChallengeCompleted, None, Some(80)));
        }
        tracker.track("u1", activity(ActivityKind::LessonFinished, None, None));
        tracker.track("u2", activity(ActivityKind::ProjectDone, None, None));

        let stats = tracker.stats("u1");
        assert_eq!(stats.total_activities, 11);
        assert_eq!(stats.completed_challenges, 10);
        assert_eq!(stats.lessons_finished, 1);
        assert_eq!(stats.projects_done, 0);
        assert_eq!(stats.total_time_minutes, 165);
        assert_eq!(stats.level, SkillLevel::Intermediate);
        assert_eq!(stats.streak_days, 1);
    }

    #[test]
    fn test_stats_for_unknown_user() {
        let stats = ProgressTracker::new().stats("nobody");
        assert_eq!(stats.total_activities, 0);
        assert_eq!(stats.level, SkillLevel::Beginner);
        assert_eq!(stats.streak_days, 0);
    }

    #[test]
    fn test_streak() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();

        let entries = vec![entry_on(day(10)), entry_on(day(9)), entry_on(day(8)), entry_on(day(6))];
        assert_eq!(streak(&entries, today), 3);

        // Streak still counts when the latest activity was yesterday.
        let entries = vec![entry_on(day(9)), entry_on(day(8))];
        assert_eq!(streak(&entries, today), 2);

        let entries = vec![entry_on(day(7))];
        assert_eq!(streak(&entries, today), 0);
    }
}
