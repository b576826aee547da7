//! Axum HTTP API for triggering and inspecting processing.
//!
//! The process trigger is fire-and-forget: it enqueues a job and returns
//! `202 Accepted` without awaiting the run. Identity arrives as an
//! `X-User-Id` header set by the fronting gateway; authentication itself
//! lives there, not here.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
