//! Kakao Local keyword-search client (place search)
//!
//! The search query is the location prefixed onto the interest query, with an
//! optional category group code to narrow results. Kakao carries no ratings,
//! so hits get a neutral default.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::PlaceRecord,
    services::providers::PROVIDER_TIMEOUT,
};

const DEFAULT_API_URL: &str = "https://dapi.kakao.com/v2/local";
const SEARCH_RADIUS_METERS: u32 = 5000;
const DEFAULT_RATING: f64 = 4.0;

#[derive(Debug, Deserialize)]
struct KakaoSearchResponse {
    #[serde(default)]
    documents: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct KakaoDocument {
    id: String,
    place_name: String,
    #[serde(default)]
    address_name: String,
    #[serde(default)]
    road_address_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    category_name: String,
    #[serde(default)]
    place_url: String,
}

impl From<KakaoDocument> for PlaceRecord {
    fn from(doc: KakaoDocument) -> Self {
        // Road addresses are newer and more precise when present
        let address = if doc.road_address_name.trim().is_empty() {
            doc.address_name
        } else {
            doc.road_address_name
        };

        PlaceRecord {
            id: doc.id,
            name: doc.place_name,
            address,
            category: doc.category_name,
            phone: doc.phone,
            place_url: doc.place_url,
            rating: DEFAULT_RATING,
        }
    }
}

#[derive(Clone)]
pub struct KakaoClient {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

impl KakaoClient {
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

    /// Keyword place search scoped to the location
    pub async fn search(
        &self,
        query: &str,
        category_code: Option<&str>,
        location: &str,
    ) -> AppResult<Vec<PlaceRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("kakao"))?;

        let search_query = format!("{} {}", location, query);
        let radius = SEARCH_RADIUS_METERS.to_string();
        let mut params = vec![
            ("query", search_query.as_str()),
            ("radius", radius.as_str()),
            ("size", "15"),
        ];
        if let Some(code) = category_code {
            params.push(("category_group_code", code));
        }

        let url = format!("{}/search/keyword.json", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .timeout(PROVIDER_TIMEOUT)
            .header("Authorization", format!("KakaoAK {}", api_key))
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Kakao API returned status {}: {}",
                status, body
            )));
        }

        let search: KakaoSearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Kakao search payload: {}", e)))?;

        let places: Vec<PlaceRecord> = search
            .documents
            .into_iter()
            .filter_map(|doc| {
                serde_json::from_value::<KakaoDocument>(doc)
                    .map(PlaceRecord::from)
                    .ok()
            })
            .collect();

        tracing::info!(
            query = %search_query,
            results = places.len(),
            provider = "kakao",
            "Place search completed"
        );

        Ok(places)
    }
}
