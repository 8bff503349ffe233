//! TMDB movie listings client
//!
//! Fetches the now-playing list for the Korean region. Rows that fail to
//! deserialize are skipped individually so one malformed entry cannot empty
//! the whole listing.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
    services::providers::PROVIDER_TIMEOUT,
};

const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Deserialize)]
struct NowPlayingResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

impl TmdbClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_api_url(api_key, DEFAULT_API_URL.to_string())
    }

    pub fn with_api_url(api_key: Option<String>, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    /// Movies currently in theaters
    pub async fn now_playing(&self) -> AppResult<Vec<MovieRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("tmdb"))?;

        let url = format!("{}/movie/now_playing", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .timeout(PROVIDER_TIMEOUT)
            .query(&[
                ("api_key", api_key),
                ("language", "ko-KR"),
                ("region", "KR"),
                ("page", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let listing: NowPlayingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("TMDB now-playing payload: {}", e)))?;

        let movies: Vec<MovieRecord> = listing
            .results
            .into_iter()
            .filter_map(|row| serde_json::from_value::<MovieRecord>(row).ok())
            .collect();

        tracing::info!(
            results = movies.len(),
            provider = "tmdb",
            "Movie listings fetched"
        );

        Ok(movies)
    }
}
