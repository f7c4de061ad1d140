pub mod app_state;
pub mod collab_api;
pub mod error;
pub mod learning_api;
pub mod rate_limit;
pub mod router;
