use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::{
    error::AppError,
    models::{Candidate, EventRecord, MovieRecord, PlaceRecord, Preference, PriceTier, Source},
    services::providers::ProviderGateway,
};

const MOVIE_CAP: usize = 10;
const EVENT_CAP: usize = 5;
const PLACE_CAP: usize = 3;

const MOVIE_DURATION_MINUTES: i64 = 120;
const EXHIBITION_DURATION_MINUTES: i64 = 90;
const PERFORMANCE_DURATION_MINUTES: i64 = 120;

/// Neutral rating for records whose source carries none
const DEFAULT_EVENT_RATING: f64 = 4.0;

/// Search profile for a place-family interest: query, category group code,
/// duration and price tier
struct PlaceProfile {
    query: &'static str,
    category_code: Option<&'static str>,
    duration_minutes: i64,
    price_tier: PriceTier,
}

/// Fixed per-interest place lookup; unresolved interests search by the
/// interest text itself with middle-of-the-road defaults
fn place_profile(interest: &str) -> PlaceProfile {
    match interest {
        "cafe" => PlaceProfile {
            query: "cafe",
            category_code: Some("CE7"),
            duration_minutes: 60,
            price_tier: PriceTier::Cheap,
        },
        "restaurant" => PlaceProfile {
            query: "restaurant",
            category_code: Some("FD6"),
            duration_minutes: 90,
            price_tier: PriceTier::Moderate,
        },
        "park" | "walk" => PlaceProfile {
            query: "park",
            category_code: Some("PK6"),
            duration_minutes: 120,
            price_tier: PriceTier::Cheap,
        },
        "shopping" => PlaceProfile {
            query: "shopping mall",
            category_code: Some("MT1"),
            duration_minutes: 180,
            price_tier: PriceTier::Moderate,
        },
        "indoor" => PlaceProfile {
            query: "indoor activity",
            category_code: Some("CT1"),
            duration_minutes: 120,
            price_tier: PriceTier::Cheap,
        },
        "outdoor" => PlaceProfile {
            query: "outdoor activity",
            category_code: Some("PK6"),
            duration_minutes: 180,
            price_tier: PriceTier::Cheap,
        },
        _ => PlaceProfile {
            query: "",
            category_code: None,
            duration_minutes: 120,
            price_tier: PriceTier::Moderate,
        },
    }
}

/// Resolves a performance genre from the user's culture detail options
///
/// Unresolved details mean no genre filter, never an error.
fn resolve_genre(details: &[String]) -> Option<String> {
    details.iter().find_map(|detail| {
        let genre = match detail.trim().to_lowercase().as_str() {
            "musical" => "musical",
            "concert" => "concert",
            "play" | "theater" | "theatre" => "theater",
            "opera" => "opera",
            "dance" | "ballet" => "dance",
            _ => return None,
        };
        Some(genre.to_string())
    })
}

/// Aggregates candidates across all requested interests
///
/// One task per interest (fan-out); sub-results are joined and concatenated
/// in interest-declaration order so output is deterministic regardless of
/// completion order. A failing provider empties only its own interest's
/// sub-result; aggregation itself never fails.
///
/// Joins are bounded by `deadline`. When it expires, unfinished fetches are
/// aborted and the sub-results that already arrived are kept.
pub async fn aggregate(
    gateway: Arc<dyn ProviderGateway>,
    preference: &Preference,
    deadline: Duration,
) -> Vec<Candidate> {
    let mut tasks = Vec::new();

    for interest in &preference.interests {
        let gateway = gateway.clone();
        let preference = preference.clone();
        let task_interest = interest.clone();
        let task = tokio::spawn(async move {
            fetch_interest(gateway.as_ref(), &preference, &task_interest).await
        });
        tasks.push((interest.clone(), task));
    }

    let expires_at = Instant::now() + deadline;
    let mut candidates = Vec::new();
    for (interest, mut task) in tasks {
        match tokio::time::timeout_at(expires_at, &mut task).await {
            Ok(Ok(sub_result)) => candidates.extend(sub_result),
            Ok(Err(e)) => {
                tracing::error!(interest = %interest, error = %e, "Aggregation task join error");
            }
            Err(_) => {
                task.abort();
                tracing::warn!(
                    interest = %interest,
                    deadline_secs = deadline.as_secs(),
                    "Deadline expired; dropping unfinished fetch"
                );
            }
        }
    }

    tracing::info!(
        interests = preference.interests.len(),
        candidates = candidates.len(),
        "Aggregation completed"
    );

    candidates
}

/// Fetches and normalizes candidates for a single interest
///
/// All provider failures are absorbed here: a missing credential skips
/// silently, transient and parse failures are logged and skipped.
async fn fetch_interest(
    gateway: &dyn ProviderGateway,
    preference: &Preference,
    interest: &str,
) -> Vec<Candidate> {
    let result = match interest {
        "movie" => gateway
            .fetch_movies(&preference.location, preference.date)
            .await
            .map(|records| map_movies(records, &preference.location)),
        "exhibition" => gateway
            .fetch_exhibitions(&preference.location, preference.date)
            .await
            .map(|records| map_exhibitions(records, &preference.location)),
        "culture" | "performance" => {
            // Genre details for the whole family live under the "culture" key
            let mut details = preference.details_for(interest);
            if details.is_empty() {
                details = preference.details_for("culture");
            }
            let genre = resolve_genre(details);
            gateway
                .fetch_performances(&preference.location, preference.date, genre.clone())
                .await
                .map(|records| map_performances(records, &preference.location, genre.as_deref()))
        }
        _ => {
            let profile = place_profile(interest);
            // Detail options refine the search query (e.g. cuisine under
            // restaurant)
            let base_query = if profile.query.is_empty() {
                interest.to_string()
            } else {
                profile.query.to_string()
            };
            let query = match preference.details_for(interest).first() {
                Some(detail) => format!("{} {}", detail, base_query),
                None => base_query,
            };
            gateway
                .search_places(
                    &query,
                    profile.category_code.map(String::from),
                    &preference.location,
                )
                .await
                .map(|records| map_places(records, interest, &profile, &preference.location))
        }
    };

    match result {
        Ok(candidates) => {
            tracing::debug!(
                interest = %interest,
                candidates = candidates.len(),
                "Interest sub-result ready"
            );
            candidates
        }
        Err(AppError::MissingCredential(provider)) => {
            tracing::debug!(interest = %interest, provider = %provider, "Provider not configured; skipping");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(interest = %interest, error = %e, "Provider call failed; skipping interest");
            Vec::new()
        }
    }
}

fn map_movies(records: Vec<MovieRecord>, location: &str) -> Vec<Candidate> {
    records
        .into_iter()
        .take(MOVIE_CAP)
        .filter_map(|record| {
            let title = record.display_title().to_string();
            let description = if record.overview.trim().is_empty() {
                format!("See {} in theaters.", title)
            } else {
                record.overview.clone()
            };
            Candidate::normalized(
                format!("movie:{}", record.id),
                &title,
                description,
                location,
                "movie",
                MOVIE_DURATION_MINUTES,
                PriceTier::Moderate,
                vec!["movie".to_string(), "date".to_string()],
                // Source rating scale is 0-10
                record.vote_average / 2.0,
                Source::Movie,
            )
        })
        .collect()
}

fn map_exhibitions(records: Vec<EventRecord>, location: &str) -> Vec<Candidate> {
    records
        .into_iter()
        .take(EVENT_CAP)
        .filter_map(|record| {
            let location = if record.place.is_empty() {
                location.to_string()
            } else {
                record.place.clone()
            };
            Candidate::normalized(
                format!("exhibition:{}", record.id),
                &record.title,
                record.description,
                location,
                "exhibition",
                EXHIBITION_DURATION_MINUTES,
                PriceTier::Moderate,
                vec!["exhibition".to_string(), "culture".to_string()],
                DEFAULT_EVENT_RATING,
                Source::Exhibition,
            )
        })
        .collect()
}

fn map_performances(
    records: Vec<EventRecord>,
    location: &str,
    genre: Option<&str>,
) -> Vec<Candidate> {
    records
        .into_iter()
        .take(EVENT_CAP)
        .filter_map(|record| {
            let category = record
                .genre
                .clone()
                .or_else(|| genre.map(String::from))
                .unwrap_or_else(|| "culture".to_string());
            let location = if record.place.is_empty() {
                location.to_string()
            } else {
                record.place.clone()
            };
            Candidate::normalized(
                format!("performance:{}", record.id),
                &record.title,
                record.description,
                location,
                category,
                PERFORMANCE_DURATION_MINUTES,
                PriceTier::Expensive,
                vec!["performance".to_string(), "culture".to_string()],
                DEFAULT_EVENT_RATING,
                Source::Performance,
            )
        })
        .collect()
}

fn map_places(
    records: Vec<PlaceRecord>,
    interest: &str,
    profile: &PlaceProfile,
    location: &str,
) -> Vec<Candidate> {
    records
        .into_iter()
        .take(PLACE_CAP)
        .filter_map(|record| {
            let description = if record.address.is_empty() {
                format!("{} near {}", record.name, location)
            } else {
                record.address.clone()
            };
            Candidate::normalized(
                format!("place:{}:{}", interest, record.id),
                &record.name,
                description,
                location,
                interest,
                profile.duration_minutes,
                profile.price_tier,
                vec![interest.to_string(), "date".to_string()],
                record.rating,
                Source::Place(interest.to_string()),
            )
        })
        .collect()
}
