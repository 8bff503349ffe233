use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{EventRecord, MovieRecord},
    routes::AppState,
};

/// Query parameters shared by the culture lookup endpoints
#[derive(Debug, Deserialize)]
pub struct CultureQuery {
    pub location: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub genre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub movies: Vec<MovieRecord>,
}

#[derive(Debug, Serialize)]
pub struct ExhibitionsResponse {
    pub exhibitions: Vec<EventRecord>,
}

#[derive(Debug, Serialize)]
pub struct PerformancesResponse {
    pub performances: Vec<EventRecord>,
}

/// Handler for the now-playing movie lookup
///
/// Unlike the recommendation flow, these endpoints surface provider failures
/// to the caller instead of absorbing them.
pub async fn movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CultureQuery>,
) -> AppResult<Json<MoviesResponse>> {
    let movies = state.gateway.fetch_movies(&query.location, query.date).await?;
    Ok(Json(MoviesResponse { movies }))
}

/// Handler for the exhibition lookup
pub async fn exhibitions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CultureQuery>,
) -> AppResult<Json<ExhibitionsResponse>> {
    let exhibitions = state
        .gateway
        .fetch_exhibitions(&query.location, query.date)
        .await?;
    Ok(Json(ExhibitionsResponse { exhibitions }))
}

/// Handler for the performance lookup, with an optional genre filter
pub async fn performances(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CultureQuery>,
) -> AppResult<Json<PerformancesResponse>> {
    let performances = state
        .gateway
        .fetch_performances(&query.location, query.date, query.genre)
        .await?;
    Ok(Json(PerformancesResponse { performances }))
}
