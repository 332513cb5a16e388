//! End-to-end feed pipeline.
//!
//! Two sequential phases: (1) signal retrieval + ranking, (2) concurrent
//! batch enrichment, then a pure assembly step. Only phase-1 failures
//! propagate to the caller; everything downstream degrades.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::ident;
use crate::metrics;
use crate::models::FeedResponse;
use crate::search::SearchIndex;
use crate::services::assembler::assemble;
use crate::services::enrichment::{
    enrich, AuthorStore, CommentStore, EnrichmentPolicy, PostStore,
};
use crate::services::ranking::{CandidateRanker, RankingWeights};
use crate::services::signals::SignalProvider;

/// The pipeline facade. All collaborators are explicit trait objects so tests
/// can substitute fakes per component.
pub struct FeedPipeline {
    signals: Arc<dyn SignalProvider>,
    ranker: CandidateRanker,
    posts: Arc<dyn PostStore>,
    authors: Arc<dyn AuthorStore>,
    comments: Arc<dyn CommentStore>,
    policy: EnrichmentPolicy,
}

impl FeedPipeline {
    pub fn new(
        signals: Arc<dyn SignalProvider>,
        index: Arc<dyn SearchIndex>,
        posts: Arc<dyn PostStore>,
        authors: Arc<dyn AuthorStore>,
        comments: Arc<dyn CommentStore>,
        weights: RankingWeights,
        policy: EnrichmentPolicy,
    ) -> Self {
        Self {
            signals,
            ranker: CandidateRanker::new(index, weights),
            posts,
            authors,
            comments,
            policy,
        }
    }

    /// Produce the ordered feed for one request.
    ///
    /// `seen` is advisory exclusion; malformed entries are ignored. A `size`
    /// of zero short-circuits before any backing-store call.
    pub async fn recommend(
        &self,
        user_id: Uuid,
        size: usize,
        seen: &[String],
    ) -> Result<FeedResponse> {
        if size == 0 {
            return Ok(FeedResponse::empty());
        }

        let excluded: HashSet<String> = seen
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect();

        let rank_start = Instant::now();
        let signals = self.signals.signals(user_id).await?;
        let candidates = self
            .ranker
            .rank(user_id, &signals, &excluded, size)
            .await?;
        metrics::record_phase_duration("rank", rank_start.elapsed());

        if candidates.is_empty() {
            debug!("No candidates for user {} (excluded: {})", user_id, excluded.len());
            return Ok(FeedResponse::empty());
        }

        let keys = ident::keys_for(&candidates);
        let post_keys = ident::post_key_set(&keys);
        let author_keys = ident::author_key_set(&keys);

        let enrich_start = Instant::now();
        let enrichment = enrich(
            self.posts.as_ref(),
            self.authors.as_ref(),
            self.comments.as_ref(),
            &post_keys,
            &author_keys,
            &self.policy,
        )
        .await;
        metrics::record_phase_duration("enrich", enrich_start.elapsed());

        let results = assemble(&candidates, &keys, &enrichment, chrono::Utc::now());

        info!(
            "Feed generated for user {}: {} items ({} post details, {} profiles, {} comments)",
            user_id,
            results.len(),
            enrichment.posts.len(),
            enrichment.authors.len(),
            enrichment.comments.len()
        );

        Ok(FeedResponse {
            count: results.len(),
            results,
        })
    }
}
