use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};

use super::app_state::AppState;
use super::rate_limit::api_rate_limit;
use super::{collab_api, learning_api};

/// Build the axum router with all HTTP routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Restrict CORS to the configured public_url origin (or allow any for localhost dev)
    let public_url = &state.public_url;
    let cors = if public_url.contains("localhost") || public_url.contains("127.0.0.1") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origin = public_url
            .trim_end_matches('/')
            .parse::<HeaderValue>()
            .unwrap_or_else(|_| HeaderValue::from_static("https://localhost"));
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let collaboration = Router::new()
        .route("/create", post(collab_api::create_session))
        .route("/join", post(collab_api::join_session))
        .route("/update-code", put(collab_api::update_code))
        .route("/ai-suggestion", post(collab_api::add_suggestion))
        .route(
            "/generate-suggestion",
            post(collab_api::generate_suggestion),
        )
        .route("/suggestions/apply", post(collab_api::apply_suggestion))
        .route("/session/{id}", get(collab_api::get_session))
        .route("/leave", post(collab_api::leave_session))
        .route("/active", get(collab_api::active_sessions));

    let learning = Router::new()
        .route("/assess", post(learning_api::assess))
        .route("/generate-path", post(learning_api::generate_path))
        .route("/daily-challenge", get(learning_api::daily_challenge))
        .route("/track-progress", post(learning_api::track_progress))
        .route("/stats/{user_id}", get(learning_api::stats));

    Router::new()
        .route("/api/health", get(collab_api::health))
        .nest("/api/collaboration", collaboration)
        .nest("/api/learning", learning)
        .layer(axum::middleware::from_fn(api_rate_limit))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(cors)
        // Inject the limiter into all request extensions
        .layer(axum::Extension(state.api_limiter.clone()))
        .with_state(state)
}
