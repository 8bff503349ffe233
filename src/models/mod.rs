use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};

use crate::error::{AppError, AppResult};

/// Price tier used both for preference budgets and for candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Cheap,
    Moderate,
    Expensive,
}

impl PriceTier {
    /// Coerces an untrusted upstream label into a tier
    ///
    /// Upstream data is not rejected for a bad tier; unknown labels fall back
    /// to `Moderate`.
    pub fn from_untrusted(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "cheap" | "low" | "budget" => PriceTier::Cheap,
            "expensive" | "high" | "premium" => PriceTier::Expensive,
            _ => PriceTier::Moderate,
        }
    }
}

impl Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PriceTier::Cheap => "cheap",
            PriceTier::Moderate => "moderate",
            PriceTier::Expensive => "expensive",
        };
        write!(f, "{}", s)
    }
}

/// Time slot the date is planned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Lunch,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Sensible course duration for the slot when no source supplies one
    pub fn default_duration_minutes(self) -> i64 {
        match self {
            TimeOfDay::Morning => 120,
            TimeOfDay::Lunch => 180,
            TimeOfDay::Afternoon => 240,
            TimeOfDay::Evening => 180,
            TimeOfDay::Night => 150,
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Lunch => "lunch",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        };
        write!(f, "{}", s)
    }
}

/// Validated user request, immutable once constructed
///
/// `budget` and `time_of_day` are enums, so malformed values are rejected at
/// deserialization before the engine is ever entered. `interest_details` maps
/// an interest tag to its refinement options and defaults to empty lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub budget: PriceTier,
    pub location: String,
    pub interests: Vec<String>,
    #[serde(default)]
    pub interest_details: HashMap<String, Vec<String>>,
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub weather: Option<String>,
}

impl Preference {
    /// Creates a preference, rejecting blank locations
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        budget: PriceTier,
        location: impl Into<String>,
        interests: Vec<String>,
        interest_details: HashMap<String, Vec<String>>,
        date: NaiveDate,
        time_of_day: TimeOfDay,
        weather: Option<String>,
    ) -> AppResult<Self> {
        let location = location.into().trim().to_string();
        if location.is_empty() {
            return Err(AppError::InvalidInput(
                "Location cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            budget,
            location,
            interests,
            interest_details,
            date,
            time_of_day,
            weather,
        })
    }

    /// Detail options for an interest, empty when the user gave none
    pub fn details_for(&self, interest: &str) -> &[String] {
        self.interest_details
            .get(interest)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }
}

/// Provenance of a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Movie,
    Exhibition,
    Performance,
    /// Place search, tagged with the interest that triggered it
    Place(String),
    Ai,
    Static,
    Synthetic,
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Movie => write!(f, "movie"),
            Source::Exhibition => write!(f, "exhibition"),
            Source::Performance => write!(f, "performance"),
            Source::Place(interest) => write!(f, "place:{}", interest),
            Source::Ai => write!(f, "ai"),
            Source::Static => write!(f, "static"),
            Source::Synthetic => write!(f, "synthetic"),
        }
    }
}

impl Serialize for Source {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single normalized recommendable place, activity or event
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Candidate {
    /// Opaque, provider-namespaced identifier
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub duration_minutes: u32,
    pub price_tier: PriceTier,
    pub tags: Vec<String>,
    /// Star rating in [0, 5]
    pub rating: f32,
    pub source: Source,
}

impl Candidate {
    /// Builds a candidate from untrusted upstream fields
    ///
    /// Out-of-range ratings and durations are coerced to the nearest legal
    /// value rather than rejected. Returns `None` when the title is blank;
    /// such records are dropped at ingestion with no error raised.
    #[allow(clippy::too_many_arguments)]
    pub fn normalized(
        id: impl Into<String>,
        title: &str,
        description: impl Into<String>,
        location: impl Into<String>,
        category: impl Into<String>,
        duration_minutes: i64,
        price_tier: PriceTier,
        tags: Vec<String>,
        rating: f64,
        source: Source,
    ) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        Some(Self {
            id: id.into(),
            title: title.to_string(),
            description: description.into(),
            location: location.into(),
            category: category.into(),
            duration_minutes: duration_minutes.clamp(1, i64::from(u32::MAX)) as u32,
            price_tier,
            tags,
            rating: rating.clamp(0.0, 5.0) as f32,
            source,
        })
    }

    /// Title key used for deduplication: trimmed and case-normalized
    pub fn title_key(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

/// A candidate with its derived ranking terms
///
/// Internal to the ranking pipeline, discarded after composition.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub match_score: f32,
    pub time_priority: f32,
}

impl ScoredCandidate {
    /// Final rank key combining time affinity and preference match
    pub fn rank_key(&self) -> f32 {
        self.time_priority + self.match_score
    }
}

// ============================================================================
// Raw provider record types
// ============================================================================

/// Raw movie listing as returned by the movie provider (0-10 rating scale)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl MovieRecord {
    /// Display title, falling back to the original-language title
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            self.original_title.trim()
        } else {
            self.title.trim()
        }
    }
}

/// Raw exhibition or performance listing from the culture portal
///
/// The portal exposes several list APIs with inconsistent field names, so
/// records are assembled through ordered field extraction rather than direct
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Raw place search hit from the local-search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub place_url: String,
    /// The local-search API carries no ratings; the client fills a default
    #[serde(default)]
    pub rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_tier_from_untrusted() {
        assert_eq!(PriceTier::from_untrusted("cheap"), PriceTier::Cheap);
        assert_eq!(PriceTier::from_untrusted(" EXPENSIVE "), PriceTier::Expensive);
        assert_eq!(PriceTier::from_untrusted("???"), PriceTier::Moderate);
        assert_eq!(PriceTier::from_untrusted(""), PriceTier::Moderate);
    }

    #[test]
    fn test_budget_rejects_unknown_value() {
        let result: Result<PriceTier, _> = serde_json::from_str(r#""luxury""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_time_of_day_lowercase_wire_form() {
        let tod: TimeOfDay = serde_json::from_str(r#""evening""#).unwrap();
        assert_eq!(tod, TimeOfDay::Evening);
        assert!(serde_json::from_str::<TimeOfDay>(r#""midnight""#).is_err());
    }

    #[test]
    fn test_preference_rejects_blank_location() {
        let result = Preference::new(
            PriceTier::Moderate,
            "   ",
            vec!["movie".to_string()],
            HashMap::new(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            TimeOfDay::Afternoon,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_preference_details_default_empty() {
        let pref = Preference::new(
            PriceTier::Cheap,
            "Hongdae",
            vec!["cafe".to_string()],
            HashMap::new(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            TimeOfDay::Morning,
            None,
        )
        .unwrap();
        assert!(pref.details_for("cafe").is_empty());
        assert!(pref.details_for("unknown").is_empty());
    }

    #[test]
    fn test_candidate_normalized_clamps_rating_and_duration() {
        let candidate = Candidate::normalized(
            "movie:1",
            "Inception",
            "",
            "Gangnam",
            "movie",
            -30,
            PriceTier::Moderate,
            vec![],
            9.7,
            Source::Movie,
        )
        .unwrap();
        assert_eq!(candidate.duration_minutes, 1);
        assert_eq!(candidate.rating, 5.0);
    }

    #[test]
    fn test_candidate_normalized_drops_blank_title() {
        let candidate = Candidate::normalized(
            "movie:2",
            "   ",
            "",
            "Gangnam",
            "movie",
            120,
            PriceTier::Moderate,
            vec![],
            3.0,
            Source::Movie,
        );
        assert!(candidate.is_none());
    }

    #[test]
    fn test_source_wire_form() {
        assert_eq!(
            serde_json::to_string(&Source::Place("cafe".to_string())).unwrap(),
            r#""place:cafe""#
        );
        assert_eq!(
            serde_json::to_string(&Source::Synthetic).unwrap(),
            r#""synthetic""#
        );
    }

    #[test]
    fn test_movie_record_title_fallback() {
        let record = MovieRecord {
            id: 1,
            title: "  ".to_string(),
            original_title: "Oldboy".to_string(),
            overview: String::new(),
            release_date: String::new(),
            vote_average: 8.4,
            poster_path: None,
        };
        assert_eq!(record.display_title(), "Oldboy");
    }
}
