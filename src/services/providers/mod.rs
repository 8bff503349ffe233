//! External data provider abstraction
//!
//! A pluggable capability set over the upstream data sources (movie
//! listings, culture portal events, local place search, and the
//! generative-AI provider). The engine only ever talks to the
//! `ProviderGateway` trait; one live implementation composes the concrete
//! clients.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    config::Config,
    error::AppResult,
    models::{EventRecord, MovieRecord, PlaceRecord, Preference},
};

pub mod culture;
pub mod kakao;
pub mod openai;
pub mod tmdb;

/// Per-request timeout applied to every upstream call
///
/// A slow provider only ever stalls its own interest's sub-result.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Capability set consumed by the recommendation engine
///
/// Every method is independent: a failure in one capability must never be
/// allowed to poison another, so callers catch errors per call site.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Movies currently playing near the location
    async fn fetch_movies(&self, location: &str, date: NaiveDate) -> AppResult<Vec<MovieRecord>>;

    /// Exhibitions open on the date
    async fn fetch_exhibitions(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<EventRecord>>;

    /// Performances on the date, optionally filtered by genre
    async fn fetch_performances(
        &self,
        location: &str,
        date: NaiveDate,
        genre: Option<String>,
    ) -> AppResult<Vec<EventRecord>>;

    /// Keyword place search scoped to the location
    async fn search_places(
        &self,
        query: &str,
        category_code: Option<String>,
        location: &str,
    ) -> AppResult<Vec<PlaceRecord>>;

    /// Free-form AI suggestion text for the preference, `None` when the model
    /// returned nothing usable
    async fn generate_ai(&self, preference: &Preference) -> AppResult<Option<String>>;
}

/// Live gateway composing one client per upstream service
pub struct LiveGateway {
    movies: tmdb::TmdbClient,
    culture: culture::CultureClient,
    places: kakao::KakaoClient,
    ai: openai::OpenAiClient,
}

impl LiveGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            movies: tmdb::TmdbClient::new(config.tmdb_api_key.clone()),
            culture: culture::CultureClient::new(config.culture_api_key.clone()),
            places: kakao::KakaoClient::new(config.kakao_api_key.clone()),
            ai: openai::OpenAiClient::new(
                config.ai_api_key.clone(),
                config.ai_api_url.clone(),
                config.ai_model.clone(),
            ),
        }
    }

    /// True when the AI provider has a configured credential
    pub fn ai_credentialed(&self) -> bool {
        self.ai.credentialed()
    }
}

#[async_trait::async_trait]
impl ProviderGateway for LiveGateway {
    async fn fetch_movies(&self, _location: &str, _date: NaiveDate) -> AppResult<Vec<MovieRecord>> {
        // The listings API is regional, not city-scoped
        self.movies.now_playing().await
    }

    async fn fetch_exhibitions(
        &self,
        _location: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<EventRecord>> {
        self.culture.exhibitions(date).await
    }

    async fn fetch_performances(
        &self,
        _location: &str,
        date: NaiveDate,
        genre: Option<String>,
    ) -> AppResult<Vec<EventRecord>> {
        self.culture.performances(date, genre.as_deref()).await
    }

    async fn search_places(
        &self,
        query: &str,
        category_code: Option<String>,
        location: &str,
    ) -> AppResult<Vec<PlaceRecord>> {
        self.places
            .search(query, category_code.as_deref(), location)
            .await
    }

    async fn generate_ai(&self, preference: &Preference) -> AppResult<Option<String>> {
        self.ai.generate(preference).await
    }
}

/// Returns the first non-blank text value among the candidate keys
///
/// Upstream payloads name the same logical field inconsistently, so fields
/// are resolved by trying each key in a fixed priority order. Numbers are
/// accepted and stringified; other value types are skipped.
pub fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        let Some(field) = value.get(*key) else {
            continue;
        };
        let text = match field {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}
