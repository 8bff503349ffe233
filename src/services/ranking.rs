use std::collections::HashSet;

use crate::models::{Candidate, Preference, ScoredCandidate, TimeOfDay};

/// Score bump for every preferred-category match in the active time slot
const TIME_PRIORITY_BONUS: f32 = 2.0;

/// Preferred categories per time slot
///
/// Matched against a candidate's category and tags during composition.
fn preferred_categories(time_of_day: TimeOfDay) -> &'static [&'static str] {
    match time_of_day {
        TimeOfDay::Morning => &["cafe", "brunch", "walk"],
        TimeOfDay::Lunch => &["restaurant", "cafe", "market"],
        TimeOfDay::Afternoon => &["exhibition", "park", "shopping"],
        TimeOfDay::Evening => &["restaurant", "viewpoint", "performance"],
        TimeOfDay::Night => &["bar", "viewpoint", "night-view"],
    }
}

/// Removes duplicate candidates by normalized title
///
/// Key is the trimmed, case-normalized title; the first occurrence per key
/// wins and the order of first occurrences is preserved. O(n) over a
/// seen-key set.
pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.title_key()))
        .collect()
}

/// Computes the preference match score for one candidate
///
/// Base score is 1.0 on a budget/price-tier match, else 0.5; a mismatched
/// budget penalizes but never excludes. Each interest matching the tags or
/// category adds 1.0, and each of that interest's detail options matching a
/// tag or appearing (case-insensitively) in the title adds 0.5. The base
/// term keeps every score strictly positive.
pub fn score(candidate: &Candidate, preference: &Preference) -> f32 {
    let mut total = if candidate.price_tier == preference.budget {
        1.0
    } else {
        0.5
    };

    let title_lower = candidate.title.to_lowercase();

    for interest in &preference.interests {
        let interest_matches = candidate.category == *interest
            || candidate.tags.iter().any(|tag| tag == interest);
        if !interest_matches {
            continue;
        }
        total += 1.0;

        for detail in preference.details_for(interest) {
            let detail_lower = detail.to_lowercase();
            let detail_matches = candidate
                .tags
                .iter()
                .any(|tag| tag.to_lowercase() == detail_lower)
                || title_lower.contains(&detail_lower);
            if detail_matches {
                total += 0.5;
            }
        }
    }

    total
}

/// Scores all candidates and orders them by descending match score
///
/// The sort is stable, so ties keep their input order.
pub fn score_all(candidates: Vec<Candidate>, preference: &Preference) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let match_score = score(&candidate, preference);
            ScoredCandidate {
                candidate,
                match_score,
                time_priority: 0.0,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

/// Re-ranks scored candidates by time-of-day category affinity
///
/// Every preferred-category term matching the candidate's category or tags
/// adds to its time priority; the final ordering key is time priority plus
/// match score, stable on ties. This is the terminal ordering handed to the
/// fallback chain for truncation.
pub fn compose(mut scored: Vec<ScoredCandidate>, time_of_day: TimeOfDay) -> Vec<Candidate> {
    let preferred = preferred_categories(time_of_day);

    for entry in &mut scored {
        for term in preferred {
            let matches = entry.candidate.category == *term
                || entry.candidate.tags.iter().any(|tag| tag == term);
            if matches {
                entry.time_priority += TIME_PRIORITY_BONUS;
            }
        }
    }

    scored.sort_by(|a, b| {
        b.rank_key()
            .partial_cmp(&a.rank_key())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::debug!(
        time_of_day = %time_of_day,
        composed = scored.len(),
        "Time-slot composition completed"
    );

    scored.into_iter().map(|entry| entry.candidate).collect()
}

/// Full ranking pass: dedupe, score, compose
pub fn rank(
    candidates: Vec<Candidate>,
    preference: &Preference,
) -> Vec<Candidate> {
    let deduped = dedupe(candidates);
    let scored = score_all(deduped, preference);
    compose(scored, preference.time_of_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceTier, Source};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn candidate(title: &str, tier: PriceTier, category: &str, tags: &[&str]) -> Candidate {
        Candidate::normalized(
            format!("test:{}", title),
            title,
            "",
            "Gangnam",
            category,
            60,
            tier,
            tags.iter().map(|t| t.to_string()).collect(),
            4.0,
            Source::Static,
        )
        .unwrap()
    }

    fn preference(
        budget: PriceTier,
        interests: &[&str],
        details: &[(&str, &[&str])],
        time_of_day: TimeOfDay,
    ) -> Preference {
        let interest_details: HashMap<String, Vec<String>> = details
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    v.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect();
        Preference::new(
            budget,
            "Gangnam",
            interests.iter().map(|i| i.to_string()).collect(),
            interest_details,
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            time_of_day,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_dedupe_first_occurrence_wins() {
        let candidates = vec![
            candidate("Foo", PriceTier::Cheap, "cafe", &[]),
            candidate("foo ", PriceTier::Moderate, "bar", &[]),
            candidate("Bar", PriceTier::Cheap, "cafe", &[]),
        ];

        let deduped = dedupe(candidates);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "Foo");
        assert_eq!(deduped[0].category, "cafe");
        assert_eq!(deduped[1].title, "Bar");
    }

    #[test]
    fn test_score_budget_and_interest_matches() {
        let pref = preference(
            PriceTier::Cheap,
            &["cafe", "walk"],
            &[],
            TimeOfDay::Morning,
        );
        let matching = candidate("Quiet Cafe", PriceTier::Cheap, "cafe", &["walk"]);
        let mismatched = candidate("Pricey Bar", PriceTier::Expensive, "bar", &[]);

        // 1.0 base + 1.0 per matched interest
        assert_eq!(score(&matching, &pref), 3.0);
        assert_eq!(score(&mismatched, &pref), 0.5);
    }

    #[test]
    fn test_score_detail_options_add_half_point() {
        let pref = preference(
            PriceTier::Moderate,
            &["restaurant"],
            &[("restaurant", &["pasta", "terrace"])],
            TimeOfDay::Evening,
        );
        let candidate = candidate(
            "La Pasta House",
            PriceTier::Moderate,
            "restaurant",
            &["terrace"],
        );

        // 1.0 base + 1.0 interest + 0.5 title substring + 0.5 tag
        assert_eq!(score(&candidate, &pref), 3.0);
    }

    #[test]
    fn test_score_detail_requires_interest_match() {
        let pref = preference(
            PriceTier::Moderate,
            &["restaurant"],
            &[("restaurant", &["pasta"])],
            TimeOfDay::Evening,
        );
        let unrelated = candidate("Pasta Museum", PriceTier::Moderate, "exhibition", &[]);

        // Title mentions a detail, but its interest does not match
        assert_eq!(score(&unrelated, &pref), 1.0);
    }

    #[test]
    fn test_score_all_stable_on_ties() {
        let pref = preference(PriceTier::Cheap, &[], &[], TimeOfDay::Morning);
        let scored = score_all(
            vec![
                candidate("First", PriceTier::Cheap, "cafe", &[]),
                candidate("Second", PriceTier::Cheap, "cafe", &[]),
            ],
            &pref,
        );
        assert_eq!(scored[0].candidate.title, "First");
        assert_eq!(scored[1].candidate.title, "Second");
    }

    #[test]
    fn test_compose_morning_prefers_cafe_over_bar() {
        let pref = preference(PriceTier::Cheap, &[], &[], TimeOfDay::Morning);
        let scored = score_all(
            vec![
                candidate("Night Bar", PriceTier::Cheap, "bar", &[]),
                candidate("Morning Cafe", PriceTier::Cheap, "cafe", &[]),
            ],
            &pref,
        );

        let composed = compose(scored, TimeOfDay::Morning);
        assert_eq!(composed[0].title, "Morning Cafe");
        assert_eq!(composed[1].title, "Night Bar");
    }

    #[test]
    fn test_compose_counts_each_preferred_term() {
        let scored = vec![
            ScoredCandidate {
                candidate: candidate("Walkable Cafe", PriceTier::Cheap, "cafe", &["walk"]),
                match_score: 0.5,
                time_priority: 0.0,
            },
            ScoredCandidate {
                candidate: candidate("Brunch Spot", PriceTier::Cheap, "brunch", &[]),
                match_score: 1.5,
                time_priority: 0.0,
            },
        ];

        // cafe + walk = 4.0 + 0.5 beats brunch = 2.0 + 1.5
        let composed = compose(scored, TimeOfDay::Morning);
        assert_eq!(composed[0].title, "Walkable Cafe");
    }

    #[test]
    fn test_rank_end_to_end_order() {
        let pref = preference(PriceTier::Cheap, &["cafe"], &[], TimeOfDay::Morning);
        let ranked = rank(
            vec![
                candidate("Dull Bar", PriceTier::Expensive, "bar", &[]),
                candidate("Good Cafe", PriceTier::Cheap, "cafe", &[]),
                candidate("good cafe", PriceTier::Cheap, "cafe", &[]),
            ],
            &pref,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "Good Cafe");
    }
}
