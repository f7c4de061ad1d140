//! Text generation collaborator.
//!
//! The registry never talks to a model. Route handlers hold an
//! `Arc<dyn TextGenerator>` and pass whatever it produces into the registry.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpTextGenerator;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("text generation is not configured")]
    NotConfigured,

    #[error("request to text generation backend failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("text generation backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("text generation backend returned no content")]
    EmptyResponse,
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

impl GenerationParams {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, AiError>;
}

/// Generator used when no backend is configured. Every call fails with
/// `AiError::NotConfigured`.
pub struct DisabledTextGenerator;

#[async_trait]
impl TextGenerator for DisabledTextGenerator {
    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }
}

/// Prompt asking for a review of a session's shared buffer.
pub fn suggestion_prompt(language: &str, code: &str, focus: Option<&str>) -> String {
    let focus = focus.unwrap_or("correctness, readability and idiomatic style");
    format!(
        "You are pair-programming in a shared {language} editor.\n\
         Review the code below and give one concise, actionable suggestion \
         focused on {focus}.\n\n```{language}\n{code}\n```"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_generator_errors() {
        let err = DisabledTextGenerator
            .generate("hi", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::NotConfigured));
    }

    #[test]
    fn test_suggestion_prompt_embeds_code() {
        let prompt = suggestion_prompt("rust", "fn main() {}", None);
        assert!(prompt.contains("```rust\nfn main() {}\n```"));
        assert!(prompt.contains("idiomatic style"));

        let prompt = suggestion_prompt("python", "x=1", Some("performance"));
        assert!(prompt.contains("focused on performance"));
    }

    #[test]
    fn test_params_defaults() {
        let p = GenerationParams::with_temperature(0.3);
        assert_eq!(p.temperature, 0.3);
        assert_eq!(p.max_tokens, 4096);
    }
}
