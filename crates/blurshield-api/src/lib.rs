//! Axum HTTP surface for the face anonymization pipeline: upload,
//! progress-streamed detection, pixelation export, and single-frame
//! detection endpoints over a shared detector pool.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
