//! Candidate ranking.
//!
//! One index query for unseen items, then a combined score over the returned
//! hits:
//!
//! ```text
//! score = relevance
//!       + affinity * (tag_boost * tag_overlap + follow_boost * is_followee)
//!       - age_hours / freshness_scale_hours
//! ```
//!
//! The decay term is linear in age, so newer items never score lower than
//! older ones with identical other signals. Ties break on raw relevance, then
//! on identifier, which keeps output order deterministic.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::ident;
use crate::models::{Candidate, UserSignals};
use crate::search::SearchIndex;

#[derive(Debug, Clone)]
pub struct RankingWeights {
    pub tag_boost: f64,
    pub follow_boost: f64,
    pub freshness_scale_hours: f64,
}

impl From<&crate::config::RankingConfig> for RankingWeights {
    fn from(config: &crate::config::RankingConfig) -> Self {
        RankingWeights {
            tag_boost: config.tag_boost,
            follow_boost: config.follow_boost,
            freshness_scale_hours: config.freshness_scale_hours.max(f64::EPSILON),
        }
    }
}

pub struct CandidateRanker {
    index: Arc<dyn SearchIndex>,
    weights: RankingWeights,
}

impl CandidateRanker {
    pub fn new(index: Arc<dyn SearchIndex>, weights: RankingWeights) -> Self {
        Self { index, weights }
    }

    /// Retrieve and score up to `limit` unseen candidates, ordered best-first.
    ///
    /// Index failures propagate; an empty candidate set is not an error.
    pub async fn rank(
        &self,
        user_id: Uuid,
        signals: &UserSignals,
        excluded: &HashSet<String>,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = self.index.query(user_id, signals, excluded, limit).await?;

        // The index already filters seen ids; re-filter here so a lagging
        // index replica cannot resurface them.
        candidates.retain(|c| !excluded.contains(&c.id));

        // Candidate ids must be unique within one response.
        let mut seen_ids: HashSet<String> = HashSet::with_capacity(candidates.len());
        candidates.retain(|c| seen_ids.insert(c.id.clone()));

        let now = Utc::now();
        for candidate in &mut candidates {
            candidate.score = combined_score(&self.weights, signals, candidate, now);
        }

        candidates.sort_by(compare_candidates);
        candidates.truncate(limit);

        debug!(
            "Ranked {} candidates for user {} (limit: {})",
            candidates.len(),
            user_id,
            limit
        );

        Ok(candidates)
    }
}

/// Combined score for one candidate. Personalization boosts are weighted by
/// the user's affinity factor, so a fresh account with weight 0 gets a purely
/// relevance/recency feed.
pub fn combined_score(
    weights: &RankingWeights,
    signals: &UserSignals,
    candidate: &Candidate,
    now: DateTime<Utc>,
) -> f64 {
    let overlap = candidate
        .tags
        .iter()
        .filter(|tag| signals.top_tags.iter().any(|t| t == *tag))
        .count() as f64;

    let followed = ident::reconcile(&candidate.author_id)
        .map(|author| signals.followee_ids.contains(&author))
        .unwrap_or(false);
    let follow_boost = if followed { weights.follow_boost } else { 0.0 };

    let age_hours = (now - candidate.created_at).num_minutes().max(0) as f64 / 60.0;
    let decay = age_hours / weights.freshness_scale_hours.max(f64::EPSILON);

    candidate.relevance
        + signals.affinity_weight * (weights.tag_boost * overlap + follow_boost)
        - decay
}

// NaN-safe: an unscorable candidate sorts as equal rather than panicking.
fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn weights() -> RankingWeights {
        RankingWeights {
            tag_boost: 0.5,
            follow_boost: 1.0,
            freshness_scale_hours: 24.0,
        }
    }

    fn candidate(id: &str, relevance: f64, age_hours: i64) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: "t".to_string(),
            excerpt: "e".to_string(),
            tags: vec![],
            author_id: Uuid::new_v4().to_string(),
            media_type: "image".to_string(),
            media_url: None,
            like_count: 0,
            created_at: Utc::now() - Duration::hours(age_hours),
            relevance,
            score: 0.0,
        }
    }

    #[test]
    fn newer_candidate_never_scores_lower() {
        let now = Utc::now();
        let signals = UserSignals::default();
        let newer = candidate("a", 5.0, 1);
        let older = candidate("b", 5.0, 48);

        let score_newer = combined_score(&weights(), &signals, &newer, now);
        let score_older = combined_score(&weights(), &signals, &older, now);
        assert!(score_newer >= score_older);
    }

    #[test]
    fn tag_overlap_boosts_score() {
        let now = Utc::now();
        let signals = UserSignals {
            top_tags: vec!["rust".to_string(), "systems".to_string()],
            followee_ids: HashSet::new(),
            affinity_weight: 1.0,
        };
        let mut matching = candidate("a", 1.0, 1);
        matching.tags = vec!["rust".to_string(), "systems".to_string()];
        let plain = candidate("b", 1.0, 1);

        let boosted = combined_score(&weights(), &signals, &matching, now);
        let base = combined_score(&weights(), &signals, &plain, now);
        assert!((boosted - base - 1.0).abs() < 1e-9); // two overlaps * 0.5
    }

    #[test]
    fn followee_boost_applies_through_reconciliation() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let mut followees = HashSet::new();
        followees.insert(author);
        let signals = UserSignals {
            top_tags: vec![],
            followee_ids: followees,
            affinity_weight: 1.0,
        };

        let mut followed = candidate("a", 1.0, 1);
        followed.author_id = author.to_string();
        // Malformed author id never panics, just misses the boost.
        let mut malformed = candidate("b", 1.0, 1);
        malformed.author_id = "deleted-user".to_string();

        let with_boost = combined_score(&weights(), &signals, &followed, now);
        let without = combined_score(&weights(), &signals, &malformed, now);
        assert!((with_boost - without - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_affinity_ignores_personalization() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let signals = UserSignals {
            top_tags: vec!["rust".to_string()],
            followee_ids: [author].into_iter().collect(),
            affinity_weight: 0.0,
        };
        let mut boosted = candidate("a", 1.0, 1);
        boosted.tags = vec!["rust".to_string()];
        boosted.author_id = author.to_string();
        let plain = candidate("b", 1.0, 1);

        let a = combined_score(&weights(), &signals, &boosted, now);
        let b = combined_score(&weights(), &signals, &plain, now);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn ties_break_on_relevance_then_id() {
        let mut a = candidate("b", 2.0, 0);
        let mut b = candidate("a", 2.0, 0);
        a.score = 1.0;
        b.score = 1.0;
        // Equal score and relevance: id ascending wins.
        assert_eq!(compare_candidates(&a, &b), Ordering::Greater);

        b.relevance = 3.0;
        // Higher raw relevance wins before the id tie-break.
        assert_eq!(compare_candidates(&a, &b), Ordering::Greater);
    }

    #[test]
    fn nan_scores_do_not_panic() {
        let mut a = candidate("a", 1.0, 0);
        let mut b = candidate("b", 1.0, 0);
        a.score = f64::NAN;
        b.score = 2.0;
        let mut list = vec![a, b];
        list.sort_by(compare_candidates);
        assert_eq!(list.len(), 2);
    }
}
