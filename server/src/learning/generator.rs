use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{SkillLevel, topics_for};
use crate::ai::{AiError, GenerationParams, TextGenerator};

pub const DEFAULT_GOAL: &str = "full-stack";
pub const DEFAULT_LANGUAGE: &str = "hindi";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(default)]
    pub level: SkillLevel,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default = "default_score")]
    pub score: u32,
    #[serde(default)]
    pub reasoning: String,
}

fn default_score() -> u32 {
    50
}

impl Assessment {
    fn fallback(raw: String) -> Self {
        Self {
            level: SkillLevel::Beginner,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            score: default_score(),
            reasoning: raw,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanDay {
    pub day: u32,
    pub topic: String,
    pub description: String,
    pub exercises: Vec<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanWeek {
    pub week: u32,
    pub focus: String,
    pub days: Vec<PlanDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default)]
    pub weeks: Vec<PlanWeek>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<String>,
    /// Unparsed model output, kept when the reply was not valid JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_plan: Option<String>,
}

fn default_duration() -> String {
    "30 days".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeExample {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub examples: Vec<ChallengeExample>,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approach: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_complexity: Option<String>,
}

/// Ask the model to grade a code sample. Replies that are not valid JSON
/// yield a beginner assessment carrying the raw reply as reasoning.
pub async fn assess_coding_level(
    generator: &dyn TextGenerator,
    code: &str,
    answers: &[serde_json::Value],
) -> Result<Assessment, AiError> {
    let answers = serde_json::to_string(answers).unwrap_or_else(|_| "[]".into());
    let prompt = format!(
        "Determine the developer's skill level (beginner/intermediate/advanced) \
         from this code sample and quiz answers.\n\n```\n{code}\n```\n\n\
         Quiz answers: {answers}\n\n\
         Reply with JSON only: {{\"level\": \"beginner|intermediate|advanced\", \
         \"strengths\": [], \"weaknesses\": [], \"score\": 0-100, \"reasoning\": \"\"}}"
    );

    let reply = generator
        .generate(&prompt, &GenerationParams::with_temperature(0.3))
        .await?;

    Ok(match parse_reply::<Assessment>(&reply) {
        Some(mut assessment) => {
            assessment.score = assessment.score.min(100);
            assessment
        }
        None => Assessment::fallback(reply),
    })
}

/// Build a 30-day plan around the catalog topics for the assessed level.
pub async fn generate_learning_path(
    generator: &dyn TextGenerator,
    assessment: &Assessment,
    goal: Option<&str>,
    language: Option<&str>,
) -> Result<LearningPath, AiError> {
    let goal = goal.unwrap_or(DEFAULT_GOAL);
    let language = language.unwrap_or(DEFAULT_LANGUAGE);
    let topics = topics_for(assessment.level).join(", ");

    let prompt = format!(
        "Create a 30-day learning plan.\n\
         Current level: {level}\nStrengths: {strengths}\nWeaknesses: {weaknesses}\n\
         Goal: {goal}\nPreferred language: {language}\nTopics to cover: {topics}\n\n\
         Include daily topics, practice exercises, projects and resources in {language}. \
         Reply with JSON only: {{\"duration\": \"30 days\", \"weeks\": [{{\"week\": 1, \
         \"focus\": \"\", \"days\": [{{\"day\": 1, \"topic\": \"\", \"description\": \"\", \
         \"exercises\": [], \"resources\": []}}]}}], \"projects\": [], \"milestones\": []}}",
        level = assessment.level,
        strengths = assessment.strengths.join(", "),
        weaknesses = assessment.weaknesses.join(", "),
    );

    let params = GenerationParams {
        temperature: 0.7,
        max_tokens: 4096,
    };
    let reply = generator.generate(&prompt, &params).await?;

    Ok(parse_reply::<LearningPath>(&reply).unwrap_or_else(|| LearningPath {
        duration: default_duration(),
        weeks: Vec::new(),
        projects: Vec::new(),
        milestones: Vec::new(),
        raw_plan: Some(reply),
    }))
}

pub async fn daily_challenge(
    generator: &dyn TextGenerator,
    level: SkillLevel,
    language: Option<&str>,
) -> Result<Challenge, AiError> {
    let language = language.unwrap_or(DEFAULT_LANGUAGE);
    let prompt = format!(
        "Create a coding challenge for a {level} developer, written in {language}. \
         Give a problem statement, example input/output, hints, a solution approach \
         (not the full solution) and the target time complexity.\n\n\
         Reply with JSON only: {{\"title\": \"\", \"description\": \"\", \
         \"difficulty\": \"{level}\", \"examples\": [{{\"input\": \"\", \"output\": \"\"}}], \
         \"hints\": [], \"approach\": \"\", \"timeComplexity\": \"\"}}"
    );

    let reply = generator
        .generate(&prompt, &GenerationParams::with_temperature(0.8))
        .await?;

    Ok(parse_reply::<Challenge>(&reply).unwrap_or_else(|| Challenge {
        title: "Daily Challenge".into(),
        description: reply,
        difficulty: level.to_string(),
        examples: Vec::new(),
        hints: Vec::new(),
        approach: None,
        time_complexity: None,
    }))
}

/// Pull a JSON object out of a model reply, tolerating markdown fences and
/// surrounding prose.
fn parse_reply<T: DeserializeOwned>(reply: &str) -> Option<T> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str(&reply[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "model reply was not the expected JSON");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Returns a canned reply and remembers the last prompt.
    struct Canned {
        reply: String,
        last_prompt: Mutex<Option<String>>,
    }

    impl Canned {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_prompt: Mutex::new(None),
            }
        }

        fn prompt(&self) -> String {
            self.last_prompt.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, AiError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_assessment_parsed_from_fenced_json() {
        let generator = Canned::new(
            "Here you go:\n```json\n{\"level\": \"Intermediate\", \"strengths\": [\"naming\"], \
             \"weaknesses\": [], \"score\": 140, \"reasoning\": \"solid\"}\n```",
        );
        let assessment = assess_coding_level(&generator, "let x = 1;", &[])
            .await
            .unwrap();
        assert_eq!(assessment.level, SkillLevel::Intermediate);
        assert_eq!(assessment.strengths, vec!["naming".to_string()]);
        assert_eq!(assessment.score, 100);
        assert!(generator.prompt().contains("let x = 1;"));
    }

    #[tokio::test]
    async fn test_assessment_fallback() {
        let generator = Canned::new("I think they are a beginner.");
        let assessment = assess_coding_level(&generator, "x", &[]).await.unwrap();
        assert_eq!(assessment, Assessment::fallback("I think they are a beginner.".into()));
    }

    #[tokio::test]
    async fn test_path_uses_level_topics() {
        let generator = Canned::new(
            r#"{"weeks": [{"week": 1, "focus": "Patterns", "days": [{"day": 1, "topic": "Design Patterns"}]}], "projects": ["blog"]}"#,
        );
        let assessment = Assessment {
            level: SkillLevel::Advanced,
            strengths: vec!["testing".into()],
            weaknesses: vec!["security".into()],
            score: 80,
            reasoning: String::new(),
        };
        let path = generate_learning_path(&generator, &assessment, None, Some("tamil"))
            .await
            .unwrap();

        assert_eq!(path.duration, "30 days");
        assert_eq!(path.weeks[0].days[0].topic, "Design Patterns");
        assert_eq!(path.projects, vec!["blog".to_string()]);
        assert!(path.raw_plan.is_none());

        let prompt = generator.prompt();
        assert!(prompt.contains("System Design"));
        assert!(prompt.contains("Goal: full-stack"));
        assert!(prompt.contains("tamil"));
    }

    #[tokio::test]
    async fn test_path_fallback_keeps_raw_plan() {
        let generator = Canned::new("Week 1: basics");
        let assessment = Assessment::fallback(String::new());
        let path = generate_learning_path(&generator, &assessment, None, None)
            .await
            .unwrap();
        assert!(path.weeks.is_empty());
        assert_eq!(path.raw_plan.as_deref(), Some("Week 1: basics"));
    }

    #[tokio::test]
    async fn test_challenge_fallback() {
        let generator = Canned::new("Reverse a string.");
        let challenge = daily_challenge(&generator, SkillLevel::Intermediate, None)
            .await
            .unwrap();
        assert_eq!(challenge.title, "Daily Challenge");
        assert_eq!(challenge.description, "Reverse a string.");
        assert_eq!(challenge.difficulty, "intermediate");
    }

    #[tokio::test]
    async fn test_challenge_parsed() {
        let generator = Canned::new(
            r#"{"title": "Two Sum", "description": "...", "difficulty": "beginner", "examples": [{"input": "[1,2], 3", "output": "[0,1]"}], "timeComplexity": "O(n)"}"#,
        );
        let challenge = daily_challenge(&generator, SkillLevel::Beginner, Some("english"))
            .await
            .unwrap();
        assert_eq!(challenge.title, "Two Sum");
        assert_eq!(challenge.examples.len(), 1);
        assert_eq!(challenge.time_complexity.as_deref(), Some("O(n)"));
    }

    #[tokio::test]
    async fn test_generator_error_propagates() {
        let err = daily_challenge(&crate::ai::DisabledTextGenerator, SkillLevel::Beginner, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::NotConfigured));
    }
}
