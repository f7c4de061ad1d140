use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::engine::registry::{DEFAULT_MAX_CODE_LENGTH, RegistryConfig};
use crate::engine::session::DEFAULT_MAX_PARTICIPANTS;

/// Top-level server configuration, loaded from codecollab.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub collaboration: CollaborationSection,
    pub ai: AiSection,
    pub rate_limit: RateLimitSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub web_address: String,
    /// Public base URL, used for join links and CORS.
    pub public_url: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            web_address: "0.0.0.0:8080".into(),
            public_url: "http://localhost:8080".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CollaborationSection {
    pub default_max_participants: usize,
    /// Maximum size of a session's code buffer, in bytes.
    pub max_code_length: usize,
}

impl Default for CollaborationSection {
    fn default() -> Self {
        Self {
            default_max_participants: DEFAULT_MAX_PARTICIPANTS,
            max_code_length: DEFAULT_MAX_CODE_LENGTH,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AiSection {
    /// Base URL of a messages-API compatible endpoint. Empty disables AI features.
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: "claude-3-5-sonnet-20241022".into(),
            timeout_secs: 60,
        }
    }
}

impl AiSection {
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty() && !self.api_key.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// Requests a client may burst.
    pub burst: u32,
    /// Seconds to refill one request.
    pub per_seconds: f64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            burst: 60,
            per_seconds: 1.0,
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file doesn't exist.
    /// Environment variables override TOML values.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path}"))?;
            Self::parse(&contents).with_context(|| format!("failed to parse config file {path}"))?
        } else {
            info!("No config file found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("WEB_ADDRESS") {
            self.server.web_address = v;
        }
        if let Some(v) = var("PUBLIC_URL").or_else(|| var("BASE_URL")) {
            self.server.public_url = v;
        }
        if let Some(v) = var("MAX_CODE_LENGTH")
            && let Ok(len) = v.parse()
        {
            self.collaboration.max_code_length = len;
        }
        if let Some(v) = var("AI_ENDPOINT") {
            self.ai.endpoint = v;
        }
        if let Some(v) = var("AI_API_KEY") {
            self.ai.api_key = v;
        }
        if let Some(v) = var("AI_MODEL") {
            self.ai.model = v;
        }
    }

    /// Convert into the registry's tunables.
    pub fn to_registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            public_url: self.server.public_url.clone(),
            default_max_participants: self.collaboration.default_max_participants,
            max_code_length: self.collaboration.max_code_length,
        }
    }
}
