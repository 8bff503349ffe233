//! Culture open-data portal client (exhibitions and performances)
//!
//! The portal's list APIs wrap their items at varying depths and name the
//! same logical field differently between services, so items are located by
//! probing the known nestings and fields are resolved through ordered
//! extraction.
use chrono::NaiveDate;
use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::EventRecord,
    services::providers::{first_text, PROVIDER_TIMEOUT},
};

const DEFAULT_API_URL: &str = "http://apis.data.go.kr/1262000";
const EXHIBITION_PATH: &str = "ExhibitionService/getExhibitionList";
const PERFORMANCE_PATH: &str = "PerformanceService/getPerformanceList";

const ID_KEYS: &[&str] = &["seq", "mt20id", "id"];
const TITLE_KEYS: &[&str] = &["prfnm", "title", "exhibitionname"];
const PLACE_KEYS: &[&str] = &["fcltynm", "place", "area"];
const START_KEYS: &[&str] = &["prfpdfrom", "startdate", "stdate"];
const END_KEYS: &[&str] = &["prfpdto", "enddate", "eddate"];
const DESC_KEYS: &[&str] = &["prfcast", "description", "pcseguidance", "exhibitiondesc"];
const GENRE_KEYS: &[&str] = &["genrenm", "genre"];

#[derive(Clone)]
pub struct CultureClient {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

impl CultureClient {
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

    /// Exhibitions open on the date
    pub async fn exhibitions(&self, date: NaiveDate) -> AppResult<Vec<EventRecord>> {
        let body = self.fetch_list(EXHIBITION_PATH, date, None, 10).await?;
        let events = Self::parse_events(&body, None);

        tracing::info!(
            results = events.len(),
            provider = "culture",
            "Exhibition listings fetched"
        );

        Ok(events)
    }

    /// Performances on the date, optionally filtered by genre
    pub async fn performances(
        &self,
        date: NaiveDate,
        genre: Option<&str>,
    ) -> AppResult<Vec<EventRecord>> {
        let body = self.fetch_list(PERFORMANCE_PATH, date, genre, 15).await?;
        let events = Self::parse_events(&body, genre);

        tracing::info!(
            results = events.len(),
            genre = genre.unwrap_or("any"),
            provider = "culture",
            "Performance listings fetched"
        );

        Ok(events)
    }

    async fn fetch_list(
        &self,
        path: &str,
        date: NaiveDate,
        genre: Option<&str>,
        rows: u32,
    ) -> AppResult<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("culture"))?;

        let date = date.format("%Y%m%d").to_string();
        let rows = rows.to_string();
        let mut params = vec![
            ("serviceKey", api_key),
            ("numOfRows", rows.as_str()),
            ("pageNo", "1"),
            ("stdate", date.as_str()),
            ("eddate", date.as_str()),
            ("_type", "json"),
        ];
        if let Some(genre) = genre {
            params.push(("genre", genre));
        }

        let url = format!("{}/{}", self.api_url, path);
        let response = self
            .http_client
            .get(&url)
            .timeout(PROVIDER_TIMEOUT)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Culture portal returned status {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Culture portal payload: {}", e)))
    }

    /// Collects event items from the known response nestings
    fn parse_events(body: &Value, fallback_genre: Option<&str>) -> Vec<EventRecord> {
        Self::locate_items(body)
            .iter()
            .filter_map(|item| Self::event_from_value(item, fallback_genre))
            .collect()
    }

    /// The portal nests items as response.body.items.item, items.item, or a
    /// bare items array depending on the service
    fn locate_items(body: &Value) -> Vec<Value> {
        let nestings = [
            &["response", "body", "items", "item"][..],
            &["items", "item"][..],
            &["items"][..],
            &["item"][..],
        ];

        for path in nestings {
            let mut node = Some(body);
            for key in path {
                node = node.and_then(|value| value.get(*key));
            }
            match node {
                Some(Value::Array(items)) => return items.clone(),
                // A single item is returned bare rather than as a one-element array
                Some(item @ Value::Object(_)) => return vec![item.clone()],
                _ => continue,
            }
        }

        Vec::new()
    }

    fn event_from_value(item: &Value, fallback_genre: Option<&str>) -> Option<EventRecord> {
        let title = first_text(item, TITLE_KEYS)?;

        Some(EventRecord {
            id: first_text(item, ID_KEYS).unwrap_or_default(),
            title,
            place: first_text(item, PLACE_KEYS).unwrap_or_default(),
            start_date: first_text(item, START_KEYS).unwrap_or_default(),
            end_date: first_text(item, END_KEYS).unwrap_or_default(),
            description: first_text(item, DESC_KEYS).unwrap_or_default(),
            genre: first_text(item, GENRE_KEYS).or_else(|| fallback_genre.map(String::from)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_credential_skips_call() {
        let client = CultureClient::new(None);
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let result = client.exhibitions(date).await;
        assert!(matches!(result, Err(AppError::MissingCredential("culture"))));
    }

    #[test]
    fn test_parse_events_nested_response() {
        let body = json!({
            "response": {
                "body": {
                    "items": {
                        "item": [
                            { "seq": "101", "prfnm": "Cats", "fcltynm": "Blue Square", "genrenm": "musical" },
                            { "seq": "102", "title": "Van Gogh Light", "place": "DDP" }
                        ]
                    }
                }
            }
        });

        let events = CultureClient::parse_events(&body, None);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Cats");
        assert_eq!(events[0].place, "Blue Square");
        assert_eq!(events[0].genre.as_deref(), Some("musical"));
        assert_eq!(events[1].title, "Van Gogh Light");
    }

    #[test]
    fn test_parse_events_single_bare_item() {
        let body = json!({
            "items": { "item": { "seq": "7", "prfnm": "Nutcracker" } }
        });
        let events = CultureClient::parse_events(&body, Some("ballet"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].genre.as_deref(), Some("ballet"));
    }

    #[test]
    fn test_parse_events_drops_untitled_items() {
        let body = json!({
            "items": [
                { "seq": "1" },
                { "seq": "2", "title": "Kept" }
            ]
        });
        let events = CultureClient::parse_events(&body, None);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Kept");
    }

    #[test]
    fn test_parse_events_empty_on_unknown_shape() {
        let body = json!({ "unexpected": [1, 2, 3] });
        assert!(CultureClient::parse_events(&body, None).is_empty());
    }
}
