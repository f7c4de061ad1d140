//! Learning paths: a fixed topic catalog per skill level, AI-assisted
//! assessment and plan generation, and in-memory progress tracking.

pub mod generator;
pub mod progress;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use generator::{
    Assessment, Challenge, LearningPath, assess_coding_level, daily_challenge,
    generate_learning_path,
};
pub use progress::{Activity, ActivityKind, LearningStats, ProgressTracker, ProgressUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Case-insensitive parse. Anything unrecognized is treated as beginner.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "intermediate" => SkillLevel::Intermediate,
            "advanced" => SkillLevel::Advanced,
            _ => SkillLevel::Beginner,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl From<String> for SkillLevel {
    fn from(s: String) -> Self {
        SkillLevel::parse(&s)
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BEGINNER_TOPICS: [&str; 7] = [
    "Variables and Data Types",
    "Control Flow (if/else, loops)",
    "Functions and Scope",
    "Arrays and Objects",
    "Basic DOM Manipulation",
    "Event Handling",
    "Async/Await Basics",
];

const INTERMEDIATE_TOPICS: [&str; 7] = [
    "ES6+ Features",
    "Promises and Async Programming",
    "REST API Integration",
    "Error Handling",
    "Testing Basics",
    "Git and Version Control",
    "Package Management (npm/yarn)",
];

const ADVANCED_TOPICS: [&str; 7] = [
    "Design Patterns",
    "Performance Optimization",
    "Security Best Practices",
    "Microservices Architecture",
    "CI/CD Pipelines",
    "Cloud Deployment (AWS)",
    "System Design",
];

/// The curriculum for a level, in teaching order.
pub fn topics_for(level: SkillLevel) -> &'static [&'static str] {
    match level {
        SkillLevel::Beginner => &BEGINNER_TOPICS,
        SkillLevel::Intermediate => &INTERMEDIATE_TOPICS,
        SkillLevel::Advanced => &ADVANCED_TOPICS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(SkillLevel::parse("Advanced"), SkillLevel::Advanced);
        assert_eq!(SkillLevel::parse(" intermediate "), SkillLevel::Intermediate);
        assert_eq!(SkillLevel::parse("wizard"), SkillLevel::Beginner);
    }

    #[test]
    fn test_serde_roundtrip_is_lenient() {
        let level: SkillLevel = serde_json::from_str(r#""ADVANCED""#).unwrap();
        assert_eq!(level, SkillLevel::Advanced);
        let level: SkillLevel = serde_json::from_str(r#""guru""#).unwrap();
        assert_eq!(level, SkillLevel::Beginner);
        assert_eq!(
            serde_json::to_string(&SkillLevel::Intermediate).unwrap(),
            r#""intermediate""#
        );
    }

    #[test]
    fn test_each_level_has_seven_topics() {
        for level in [
            SkillLevel::Beginner,
            SkillLevel::Intermediate,
            SkillLevel::Advanced,
        ] {
            assert_eq!(topics_for(level).len(), 7);
        }
        assert_eq!(topics_for(SkillLevel::Advanced)[6], "System Design");
    }
}
