use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use datecourse_api::{
    config::Config,
    repository::InMemoryCourseRepository,
    routes::{create_router, AppState},
    services::{engine::RecommendationEngine, providers::LiveGateway},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let gateway = Arc::new(LiveGateway::new(&config));
    let ai_credentialed = gateway.ai_credentialed();
    let engine = Arc::new(RecommendationEngine::new(
        gateway.clone(),
        config.ai_enabled(),
        ai_credentialed,
        Duration::from_secs(config.recommend_deadline_secs),
    ));

    let state = Arc::new(AppState {
        engine,
        gateway,
        repository: Arc::new(InMemoryCourseRepository::new()),
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
