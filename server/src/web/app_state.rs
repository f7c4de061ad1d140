use std::sync::Arc;

use crate::ai::TextGenerator;
use crate::config::ServerConfig;
use crate::engine::rate_limiter::RateLimiter;
use crate::engine::registry::SessionRegistry;
use crate::learning::ProgressTracker;

/// Shared state handed to every handler.
pub struct AppState {
    pub registry: SessionRegistry,
    pub generator: Arc<dyn TextGenerator>,
    pub progress: ProgressTracker,
    pub public_url: String,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
    pub api_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: &ServerConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let registry_config = config.to_registry_config();
        // Room for JSON escaping of a full code buffer plus the envelope.
        let max_body_bytes = registry_config.max_code_length.saturating_mul(2) + 64 * 1024;

        Self {
            registry: SessionRegistry::new(registry_config),
            generator,
            progress: ProgressTracker::new(),
            public_url: config.server.public_url.clone(),
            max_body_bytes,
            api_limiter: Arc::new(RateLimiter::new(
                config.rate_limit.burst,
                config.rate_limit.per_seconds,
            )),
        }
    }
}
