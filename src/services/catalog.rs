use uuid::Uuid;

use crate::models::{Candidate, Preference, PriceTier, Source};

/// One curated place: title, description, category, duration, tier, tags,
/// rating
type Entry = (
    &'static str,
    &'static str,
    &'static str,
    i64,
    PriceTier,
    &'static [&'static str],
    f64,
);

/// Curated fallback catalog keyed by location
///
/// Consulted only when every data-backed tier came up empty, so the entries
/// favor well-known, hard-to-close spots.
static CATALOG: &[(&str, &[Entry])] = &[
    (
        "seoul",
        &[
            (
                "Namsan Seoul Tower",
                "Cable car up Namsan for the classic city panorama.",
                "viewpoint",
                120,
                PriceTier::Moderate,
                &["viewpoint", "walk", "night-view"],
                4.5,
            ),
            (
                "Han River Picnic at Banpo",
                "Rent a mat, grab fried chicken, and watch the bridge fountain show.",
                "park",
                150,
                PriceTier::Cheap,
                &["park", "walk", "outdoor"],
                4.4,
            ),
            (
                "Bukchon Hanok Village Stroll",
                "Wander the hanok alleys between Gyeongbokgung and Changdeokgung.",
                "walk",
                90,
                PriceTier::Cheap,
                &["walk", "culture"],
                4.3,
            ),
        ],
    ),
    (
        "gangnam",
        &[
            (
                "Starfield COEX Mall",
                "Shopping, aquarium, and the Byeolmadang library under one roof.",
                "shopping",
                180,
                PriceTier::Moderate,
                &["shopping", "indoor"],
                4.2,
            ),
            (
                "Bongeunsa Temple",
                "A quiet temple walk right across from COEX.",
                "walk",
                60,
                PriceTier::Cheap,
                &["walk", "culture"],
                4.3,
            ),
            (
                "Garosu-gil Cafe Hopping",
                "Tree-lined street of designer cafes and boutiques.",
                "cafe",
                90,
                PriceTier::Moderate,
                &["cafe", "shopping"],
                4.1,
            ),
        ],
    ),
    (
        "hongdae",
        &[
            (
                "Hongdae Street Performance Walk",
                "Busking alley from the main gate to the playground park.",
                "performance",
                90,
                PriceTier::Cheap,
                &["performance", "walk", "night-view"],
                4.2,
            ),
            (
                "Yeonnam-dong Gyeongui Line Forest",
                "Rail-trail park lined with brunch spots and cafes.",
                "park",
                120,
                PriceTier::Cheap,
                &["park", "walk", "brunch", "cafe"],
                4.4,
            ),
        ],
    ),
    (
        "busan",
        &[
            (
                "Haeundae Beach Walk",
                "Beach boardwalk out to Dongbaek Island and the APEC house.",
                "walk",
                120,
                PriceTier::Cheap,
                &["walk", "outdoor", "viewpoint"],
                4.5,
            ),
            (
                "Gamcheon Culture Village",
                "Hillside maze of murals, workshops, and tiny cafes.",
                "culture",
                150,
                PriceTier::Cheap,
                &["culture", "walk", "cafe"],
                4.4,
            ),
        ],
    ),
    (
        "jeju",
        &[
            (
                "Seongsan Ilchulbong Sunrise Peak",
                "Short crater hike with the island's best viewpoint.",
                "outdoor",
                150,
                PriceTier::Cheap,
                &["outdoor", "walk", "viewpoint"],
                4.6,
            ),
            (
                "Woljeong-ri Beach Cafes",
                "Emerald water and a strip of sea-view cafes.",
                "cafe",
                120,
                PriceTier::Moderate,
                &["cafe", "viewpoint", "outdoor"],
                4.3,
            ),
        ],
    ),
];

/// Curated candidates for a location
///
/// Key matching degrades: exact match, else substring match against table
/// keys. Locations with no catalog affinity yield nothing so the chain can
/// proceed to its guaranteed synthetic candidate.
pub fn static_candidates(location: &str) -> Vec<Candidate> {
    let needle = location.trim().to_lowercase();

    let selected: Vec<&(&str, &[Entry])> =
        if let Some(exact) = CATALOG.iter().find(|(key, _)| *key == needle) {
            vec![exact]
        } else {
            CATALOG
                .iter()
                .filter(|(key, _)| needle.contains(key) || key.contains(needle.as_str()))
                .collect()
        };

    selected
        .into_iter()
        .flat_map(|(key, entries)| {
            entries.iter().enumerate().filter_map(move |(index, entry)| {
                let (title, description, category, duration, tier, tags, rating) = entry;
                Candidate::normalized(
                    format!("static:{}:{}", key, index),
                    title,
                    *description,
                    *key,
                    *category,
                    *duration,
                    *tier,
                    tags.iter().map(|t| t.to_string()).collect(),
                    *rating,
                    Source::Static,
                )
            })
        })
        .collect()
}

/// Terminal fallback: exactly one candidate built purely from the preference
///
/// Cannot fail, which is what guarantees `recommend()` never returns an
/// empty list.
pub fn synthetic_candidate(preference: &Preference) -> Candidate {
    let category = preference
        .interests
        .first()
        .cloned()
        .unwrap_or_else(|| "date".to_string());

    Candidate {
        id: format!("synthetic:{}", Uuid::new_v4()),
        title: format!("{} date course", preference.location),
        description: format!(
            "Budget: {}, date: {}, time of day: {}, weather: {}, interests: {}",
            preference.budget,
            preference.date,
            preference.time_of_day,
            preference.weather.as_deref().unwrap_or("clear"),
            preference.interests.join(", "),
        ),
        location: preference.location.clone(),
        category,
        duration_minutes: preference.time_of_day.default_duration_minutes() as u32,
        price_tier: preference.budget,
        tags: preference.interests.clone(),
        rating: 4.0,
        source: Source::Synthetic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[test]
    fn test_exact_key_match() {
        let candidates = static_candidates("Gangnam");
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.id.starts_with("static:gangnam:")));
    }

    #[test]
    fn test_substring_key_match() {
        let candidates = static_candidates("Seoul Gangnam-gu");
        assert!(!candidates.is_empty());
        // Both "seoul" and "gangnam" keys appear in the query
        assert!(candidates.iter().any(|c| c.id.starts_with("static:seoul:")));
        assert!(candidates.iter().any(|c| c.id.starts_with("static:gangnam:")));
    }

    #[test]
    fn test_unknown_location_yields_nothing() {
        assert!(static_candidates("Daejeon").is_empty());
    }

    #[test]
    fn test_synthetic_candidate_mirrors_preference() {
        let preference = Preference::new(
            PriceTier::Cheap,
            "Suwon",
            vec!["park".to_string(), "cafe".to_string()],
            HashMap::new(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            TimeOfDay::Night,
            Some("rain".to_string()),
        )
        .unwrap();

        let candidate = synthetic_candidate(&preference);
        assert!(candidate.title.contains("Suwon"));
        assert_eq!(candidate.price_tier, PriceTier::Cheap);
        assert_eq!(candidate.category, "park");
        assert_eq!(candidate.duration_minutes, 150);
        assert_eq!(candidate.rating, 4.0);
        assert!(candidate.description.contains("rain"));
        assert!(candidate.description.contains("park, cafe"));
        assert_eq!(candidate.source, Source::Synthetic);
    }

    #[test]
    fn test_synthetic_candidate_without_interests() {
        let preference = Preference::new(
            PriceTier::Moderate,
            "Suwon",
            vec![],
            HashMap::new(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            TimeOfDay::Morning,
            None,
        )
        .unwrap();

        let candidate = synthetic_candidate(&preference);
        assert_eq!(candidate.category, "date");
        assert_eq!(candidate.duration_minutes, 120);
    }
}
