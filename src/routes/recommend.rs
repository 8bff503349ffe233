use std::{collections::HashMap, sync::Arc};

use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Candidate, Preference, PriceTier, TimeOfDay},
    routes::AppState,
};

/// Request body for the recommendation endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub preference: PreferenceDto,
}

/// Wire-format preference, camelCase per the public API contract
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceDto {
    pub budget: PriceTier,
    pub location: String,
    pub interests: Vec<String>,
    #[serde(default)]
    pub interest_details: Vec<InterestDetailDto>,
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub weather: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InterestDetailDto {
    pub interest: String,
    pub details: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub courses: Vec<Candidate>,
    pub count: usize,
}

impl PreferenceDto {
    fn into_domain(self) -> AppResult<Preference> {
        let interest_details: HashMap<String, Vec<String>> = self
            .interest_details
            .into_iter()
            .map(|detail| (detail.interest, detail.details))
            .collect();

        Preference::new(
            self.budget,
            self.location,
            self.interests,
            interest_details,
            self.date,
            self.time_of_day,
            self.weather,
        )
    }
}

/// Handler for the recommendation endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendResponse>> {
    let preference = request.preference.into_domain()?;

    tracing::info!(
        request_id = %request_id,
        location = %preference.location,
        interests = preference.interests.len(),
        time_of_day = %preference.time_of_day,
        "Processing recommendation request"
    );

    let existing = state.repository.find_matching(&preference).await;
    let courses = state.engine.recommend(&preference, existing).await;
    state.repository.save_all(&courses).await;

    tracing::info!(
        request_id = %request_id,
        count = courses.len(),
        "Recommendation completed"
    );

    let count = courses.len();
    Ok(Json(RecommendResponse { courses, count }))
}
