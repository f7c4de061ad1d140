use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use codecollab_server::ai::{DisabledTextGenerator, HttpTextGenerator, TextGenerator};
use codecollab_server::config::ServerConfig;
use codecollab_server::web::app_state::AppState;
use codecollab_server::web::router::build_router;

/// How often idle rate-limit buckets are dropped.
const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(version, about = "Collaborative coding sessions with AI assistance")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "codecollab.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?;

    let generator: Arc<dyn TextGenerator> = if config.ai.is_configured() {
        let http = HttpTextGenerator::new(
            &config.ai.endpoint,
            &config.ai.api_key,
            &config.ai.model,
            config.ai.timeout(),
        )
        .context("failed to build text generation client")?;
        info!(model = %http.model(), "text generation enabled");
        Arc::new(http)
    } else {
        warn!("AI endpoint not configured, AI features disabled");
        Arc::new(DisabledTextGenerator)
    };

    let state = Arc::new(AppState::new(&config, generator));

    let limiter = state.api_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            limiter.prune(LIMITER_PRUNE_INTERVAL);
        }
    });

    let app = build_router(state);

    info!(
        "CodeCollab server starting on {} (public URL {})",
        config.server.web_address, config.server.public_url
    );

    let listener = tokio::net::TcpListener::bind(&config.server.web_address)
        .await
        .with_context(|| format!("failed to bind {}", config.server.web_address))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
