//! `review-rag-web` serves a single-page form and a small JSON API over a
//! shared [`review_rag::ReviewRagService`]: index an upload or the bundled
//! sample, check the chunk count, and ask questions in any answer mode.

pub mod error;
pub mod protocol;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, ServerConfig, app_router, run_server};
