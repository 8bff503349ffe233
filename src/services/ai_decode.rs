use serde_json::Value;
use uuid::Uuid;

use crate::{
    models::{Candidate, Preference, PriceTier, Source},
    services::providers::first_text,
};

/// Cap on raw text carried into the single-candidate wrap
const RAW_WRAP_CHARS: usize = 500;

const TITLE_KEYS: &[&str] = &["title", "name"];
const DESCRIPTION_KEYS: &[&str] = &["description", "overview", "desc", "summary"];
const CATEGORY_KEYS: &[&str] = &["category", "type"];
const PRICE_KEYS: &[&str] = &["price_tier", "price_range", "budget"];

/// Decodes raw AI text into at most `limit` candidates
///
/// The model is asked for a JSON array but treated as untrusted: the text may
/// wrap the payload in a fenced block, use an object envelope, or be prose.
/// Structured parse failure degrades to wrapping the leading raw text as a
/// single candidate description; blank input yields nothing. This function
/// never errors.
pub fn decode(raw: &str, preference: &Preference, limit: usize) -> Vec<Candidate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let body = extract_fenced(raw).unwrap_or(raw);

    match parse_items(body) {
        Some(items) => {
            let candidates: Vec<Candidate> = items
                .iter()
                .take(limit)
                .filter_map(|item| candidate_from_item(item, preference))
                .collect();
            tracing::debug!(
                parsed = items.len(),
                decoded = candidates.len(),
                "AI response decoded"
            );
            candidates
        }
        None => {
            tracing::debug!("AI response not structured; wrapping raw text");
            vec![wrap_raw(raw, preference)]
        }
    }
}

/// Extracts the contents of the first fenced block, if any
///
/// Handles an optional language tag after the opening fence.
fn extract_fenced(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let after = &raw[start + 3..];
    let end = after.find("```")?;
    let mut body = after[..end].trim();
    if let Some(stripped) = body.strip_prefix("json") {
        body = stripped.trim_start();
    }
    Some(body)
}

/// Attempts a structured-list parse: bare array, or an object envelope with a
/// known list key
fn parse_items(body: &str) -> Option<Vec<Value>> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => ["courses", "items", "candidates", "recommendations"]
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(Value::Array(items)) => Some(items.clone()),
                _ => None,
            }),
        _ => None,
    }
}

/// Builds a candidate from one structured item, filling missing fields with
/// preference-derived defaults
fn candidate_from_item(item: &Value, preference: &Preference) -> Option<Candidate> {
    let title = first_text(item, TITLE_KEYS)?;

    let description = first_text(item, DESCRIPTION_KEYS)
        .unwrap_or_else(|| summary_description(preference));
    let category = first_text(item, CATEGORY_KEYS).unwrap_or_else(|| default_category(preference));
    let duration_minutes = item
        .get("duration_minutes")
        .or_else(|| item.get("duration"))
        .and_then(Value::as_i64)
        .unwrap_or_else(|| preference.time_of_day.default_duration_minutes());
    let price_tier = first_text(item, PRICE_KEYS)
        .map(|raw| PriceTier::from_untrusted(&raw))
        .unwrap_or(preference.budget);
    let tags = match item.get("tags") {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(|tag| tag.as_str().map(str::to_string))
            .collect(),
        _ => preference.interests.clone(),
    };
    let rating = item
        .get("rating")
        .and_then(Value::as_f64)
        .unwrap_or(4.0);

    Candidate::normalized(
        format!("ai:{}", Uuid::new_v4()),
        &title,
        description,
        preference.location.clone(),
        category,
        duration_minutes,
        price_tier,
        tags,
        rating,
        Source::Ai,
    )
}

/// Wraps unstructured raw text as a single candidate
fn wrap_raw(raw: &str, preference: &Preference) -> Candidate {
    let description: String = raw.chars().take(RAW_WRAP_CHARS).collect();

    Candidate {
        id: format!("ai:{}", Uuid::new_v4()),
        title: format!("{} date idea", preference.location),
        description,
        location: preference.location.clone(),
        category: default_category(preference),
        duration_minutes: preference.time_of_day.default_duration_minutes() as u32,
        price_tier: preference.budget,
        tags: preference.interests.clone(),
        rating: 4.0,
        source: Source::Ai,
    }
}

fn default_category(preference: &Preference) -> String {
    preference
        .interests
        .first()
        .cloned()
        .unwrap_or_else(|| "date".to_string())
}

fn summary_description(preference: &Preference) -> String {
    format!(
        "A {} {} course in {} for {}.",
        preference.budget,
        preference.time_of_day,
        preference.location,
        preference.date,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn preference() -> Preference {
        Preference::new(
            PriceTier::Moderate,
            "Gangnam",
            vec!["cafe".to_string()],
            HashMap::new(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            TimeOfDay::Evening,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_decode_bare_json_array() {
        let raw = r#"[
            { "title": "Han River Picnic", "category": "park", "duration_minutes": 90 },
            { "title": "Jazz Bar", "price_tier": "expensive" }
        ]"#;

        let candidates = decode(raw, &preference(), 3);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Han River Picnic");
        assert_eq!(candidates[0].duration_minutes, 90);
        assert_eq!(candidates[1].price_tier, PriceTier::Expensive);
        assert_eq!(candidates[1].source, Source::Ai);
    }

    #[test]
    fn test_decode_fenced_block_with_language_tag() {
        let raw = "Here are some ideas:\n```json\n[{\"title\": \"Gallery Walk\"}]\n```\nEnjoy!";
        let candidates = decode(raw, &preference(), 3);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Gallery Walk");
    }

    #[test]
    fn test_decode_object_envelope() {
        let raw = r#"{ "courses": [ { "title": "A" }, { "title": "B" }, { "title": "C" }, { "title": "D" } ] }"#;
        let candidates = decode(raw, &preference(), 3);
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_decode_fills_preference_defaults() {
        let candidates = decode(r#"[{ "title": "Mystery Spot" }]"#, &preference(), 3);
        let c = &candidates[0];
        assert_eq!(c.price_tier, PriceTier::Moderate);
        assert_eq!(c.category, "cafe");
        assert_eq!(c.duration_minutes, 180);
        assert_eq!(c.tags, vec!["cafe".to_string()]);
        assert_eq!(c.rating, 4.0);
    }

    #[test]
    fn test_decode_prose_wraps_raw_text() {
        let raw = "x".repeat(800);
        let candidates = decode(&raw, &preference(), 3);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].description.chars().count(), 500);
        assert!(candidates[0].title.contains("Gangnam"));
    }

    #[test]
    fn test_decode_blank_yields_nothing() {
        assert!(decode("   ", &preference(), 3).is_empty());
    }

    #[test]
    fn test_decode_skips_untitled_items() {
        let raw = r#"[ { "description": "no title" }, { "title": "Named" } ]"#;
        let candidates = decode(raw, &preference(), 3);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Named");
    }

    #[test]
    fn test_decode_clamps_model_rating() {
        let candidates = decode(r#"[{ "title": "Hype Spot", "rating": 11.0 }]"#, &preference(), 3);
        assert_eq!(candidates[0].rating, 5.0);
    }
}
