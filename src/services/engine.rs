use std::sync::Arc;
use std::time::Duration;

use crate::{
    models::{Candidate, Preference},
    services::{aggregator, ai_decode, catalog, providers::ProviderGateway, ranking},
};

/// Hard cap on any result handed back to the caller
const MAX_RESULTS: usize = 10;
/// Cap on the existing-data shortcut
const EXISTING_CAP: usize = 3;
/// Real-data results below this count trigger AI augmentation
const AI_AUGMENT_THRESHOLD: usize = 5;
/// Cap on candidates taken from one AI call
const AI_CAP: usize = 3;
/// Cap on the static-catalog tier
const STATIC_CAP: usize = 3;

/// Recommendation composition engine
///
/// Stateless per invocation; the AI-use policy and outer deadline are the
/// only engine-lifetime state, resolved once at construction and read-only
/// afterwards, so one engine serves concurrent recommend() calls.
pub struct RecommendationEngine {
    gateway: Arc<dyn ProviderGateway>,
    ai_enabled: bool,
    ai_credentialed: bool,
    deadline: Duration,
}

impl RecommendationEngine {
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        ai_enabled: bool,
        ai_credentialed: bool,
        deadline: Duration,
    ) -> Self {
        Self {
            gateway,
            ai_enabled,
            ai_credentialed,
            deadline,
        }
    }

    fn ai_allowed(&self) -> bool {
        self.ai_enabled && self.ai_credentialed
    }

    /// Produces a ranked, deduplicated result of 1 to 10 candidates
    ///
    /// Degrades through tiers; upstream unavailability is absorbed and never
    /// surfaces, so this call cannot fail and cannot return an empty list.
    pub async fn recommend(
        &self,
        preference: &Preference,
        existing: Vec<Candidate>,
    ) -> Vec<Candidate> {
        // 1. Existing-data shortcut: known matching courses win outright
        if !existing.is_empty() {
            tracing::info!(existing = existing.len(), "Serving existing courses");
            return existing.into_iter().take(EXISTING_CAP).collect();
        }

        // 2. Real-data tier, bounded by the outer deadline. Fetches still
        // outstanding at expiry are cancelled inside the aggregator and the
        // pipeline continues with whatever arrived in time.
        let aggregated =
            aggregator::aggregate(self.gateway.clone(), preference, self.deadline).await;

        let mut ranked = ranking::rank(aggregated, preference);
        if !ranked.is_empty() {
            if self.ai_allowed() && ranked.len() < AI_AUGMENT_THRESHOLD {
                ranked = self.augment_with_ai(ranked, preference).await;
            }
            ranked.truncate(MAX_RESULTS);
            tracing::info!(results = ranked.len(), tier = "real-data", "Recommendation ready");
            return ranked;
        }

        // 3. AI-only tier
        if self.ai_allowed() {
            let ai_candidates = self.ai_candidates(preference).await;
            if !ai_candidates.is_empty() {
                tracing::info!(results = ai_candidates.len(), tier = "ai", "Recommendation ready");
                return ai_candidates;
            }
        }

        // 4. Static-catalog tier
        let curated = ranking::rank(catalog::static_candidates(&preference.location), preference);
        if !curated.is_empty() {
            let result: Vec<Candidate> = curated.into_iter().take(STATIC_CAP).collect();
            tracing::info!(results = result.len(), tier = "static", "Recommendation ready");
            return result;
        }

        // 5. Synthetic fallback, terminal
        tracing::info!(tier = "synthetic", "Recommendation ready");
        vec![catalog::synthetic_candidate(preference)]
    }

    /// Tops up a sparse real-data result with AI candidates
    ///
    /// Real data stays authoritative: AI candidates only ever append after
    /// it, and an AI failure leaves the real-data result untouched.
    async fn augment_with_ai(
        &self,
        real: Vec<Candidate>,
        preference: &Preference,
    ) -> Vec<Candidate> {
        let extra = self.ai_candidates(preference).await;
        if extra.is_empty() {
            return real;
        }

        tracing::info!(real = real.len(), ai = extra.len(), "Augmenting with AI candidates");

        let mut merged = real;
        merged.extend(extra);
        let mut merged = ranking::dedupe(merged);
        merged.truncate(MAX_RESULTS);
        merged
    }

    /// One bounded AI call decoded to candidates; any failure yields nothing
    async fn ai_candidates(&self, preference: &Preference) -> Vec<Candidate> {
        match self.gateway.generate_ai(preference).await {
            Ok(Some(text)) => ai_decode::decode(&text, preference, AI_CAP),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "AI call failed; proceeding without AI candidates");
                Vec::new()
            }
        }
    }
}
