use std::sync::Arc;

use review_rag::{ReviewRagConfig, ReviewRagService};
use review_rag_web::server::{AppState, ServerConfig, run_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ReviewRagConfig::from_env()?;
    let service = Arc::new(ReviewRagService::from_config(config).await?);
    let sample_path = std::env::var("REVIEW_RAG_SAMPLE_PATH")
        .unwrap_or_else(|_| "data/sample_reviews.json".to_string());

    run_server(ServerConfig::from_env(), AppState::new(service, sample_path)).await
}
