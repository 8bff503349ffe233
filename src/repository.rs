use std::collections::HashSet;

use tokio::sync::RwLock;

use crate::models::{Candidate, Preference};

/// Course persistence collaborator
///
/// Feeds the engine's existing-data shortcut and stores what the engine
/// produced. The engine itself never persists anything.
#[async_trait::async_trait]
pub trait CourseRepository: Send + Sync {
    /// Previously served courses matching the preference
    async fn find_matching(&self, preference: &Preference) -> Vec<Candidate>;

    /// Stores new courses, skipping titles already present
    async fn save_all(&self, courses: &[Candidate]);
}

/// In-memory course store
#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: RwLock<Vec<Candidate>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn find_matching(&self, preference: &Preference) -> Vec<Candidate> {
        let location = preference.location.to_lowercase();
        let courses = self.courses.read().await;

        courses
            .iter()
            .filter(|course| {
                let course_location = course.location.to_lowercase();
                let location_matches = course_location.contains(&location)
                    || location.contains(&course_location);
                let interest_matches = preference.interests.is_empty()
                    || preference.interests.iter().any(|interest| {
                        course.category == *interest
                            || course.tags.iter().any(|tag| tag == interest)
                    });
                location_matches && interest_matches
            })
            .cloned()
            .collect()
    }

    async fn save_all(&self, new_courses: &[Candidate]) {
        let mut courses = self.courses.write().await;
        let mut known: HashSet<String> = courses.iter().map(Candidate::title_key).collect();

        for course in new_courses {
            if known.insert(course.title_key()) {
                courses.push(course.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceTier, Source, TimeOfDay};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn course(title: &str, location: &str, category: &str) -> Candidate {
        Candidate::normalized(
            format!("course:{}", title),
            title,
            "",
            location,
            category,
            60,
            PriceTier::Moderate,
            vec![],
            4.0,
            Source::Static,
        )
        .unwrap()
    }

    fn preference(location: &str, interests: &[&str]) -> Preference {
        Preference::new(
            PriceTier::Moderate,
            location,
            interests.iter().map(|s| s.to_string()).collect(),
            HashMap::new(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            TimeOfDay::Afternoon,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_matching_by_location_and_interest() {
        let repo = InMemoryCourseRepository::new();
        repo.save_all(&[
            course("Cafe Walk", "Gangnam", "cafe"),
            course("Beach Day", "Busan", "outdoor"),
            course("Mall Trip", "Gangnam", "shopping"),
        ])
        .await;

        let found = repo.find_matching(&preference("Gangnam", &["cafe"])).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Cafe Walk");
    }

    #[tokio::test]
    async fn test_find_matching_without_interests_matches_on_location() {
        let repo = InMemoryCourseRepository::new();
        repo.save_all(&[course("Cafe Walk", "Gangnam", "cafe")]).await;

        let found = repo.find_matching(&preference("Gangnam", &[])).await;
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_save_all_skips_known_titles() {
        let repo = InMemoryCourseRepository::new();
        repo.save_all(&[course("Cafe Walk", "Gangnam", "cafe")]).await;
        repo.save_all(&[
            course("cafe walk", "Gangnam", "cafe"),
            course("New Spot", "Gangnam", "cafe"),
        ])
        .await;

        let found = repo.find_matching(&preference("Gangnam", &[])).await;
        assert_eq!(found.len(), 2);
    }
}
