use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    repository::CourseRepository,
    services::{engine::RecommendationEngine, providers::ProviderGateway},
};

pub mod culture;
pub mod recommend;

/// Shared application state
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub gateway: Arc<dyn ProviderGateway>,
    pub repository: Arc<dyn CourseRepository>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/date-courses/recommend", post(recommend::recommend))
        .route("/culture/movies", get(culture::movies))
        .route("/culture/exhibitions", get(culture::exhibitions))
        .route("/culture/performances", get(culture::performances))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
