pub mod error;
pub mod rate_limiter;
pub mod registry;
pub mod session;
pub mod validation;
pub mod views;
