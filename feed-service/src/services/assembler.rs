//! Feed assembly.
//!
//! Pure merge of ranked candidates with whatever enrichment arrived. The
//! ranker's order is the display order; nothing here re-sorts, and enrichment
//! is additive only: every candidate yields exactly one item.

use chrono::{DateTime, Utc};

use crate::ident::CandidateKeys;
use crate::models::{Candidate, FeedAuthor, FeedCommentBlock, FeedItem};
use crate::services::enrichment::Enrichment;

/// Merge each candidate with its (possibly absent) enrichment records.
///
/// `keys` must be the reconciled keys for `candidates`, in the same order.
/// When the authoritative post detail is present its media/tags/like-count
/// win over the index's denormalized copies; otherwise the candidate's own
/// fields pass through unchanged.
pub fn assemble(
    candidates: &[Candidate],
    keys: &[CandidateKeys],
    enrichment: &Enrichment,
    now: DateTime<Utc>,
) -> Vec<FeedItem> {
    candidates
        .iter()
        .zip(keys.iter())
        .map(|(candidate, keys)| assemble_one(candidate, keys, enrichment, now))
        .collect()
}

fn assemble_one(
    candidate: &Candidate,
    keys: &CandidateKeys,
    enrichment: &Enrichment,
    now: DateTime<Utc>,
) -> FeedItem {
    let detail = keys.post.and_then(|id| enrichment.posts.get(&id));
    let author = keys.author.and_then(|id| enrichment.authors.get(&id));
    let best_comment = keys.post.and_then(|id| enrichment.comments.get(&id));

    let created_at = detail.map(|d| d.created_at).unwrap_or(candidate.created_at);
    let created_ago_hours = (now - created_at).num_hours().max(0);

    FeedItem {
        id: candidate.id.clone(),
        title: candidate.title.clone(),
        excerpt: candidate.excerpt.clone(),
        media_type: detail
            .map(|d| d.media_type.clone())
            .unwrap_or_else(|| candidate.media_type.clone()),
        media_url: detail
            .map(|d| d.media_url.clone())
            .unwrap_or_else(|| candidate.media_url.clone()),
        tags: detail
            .map(|d| d.tags.clone())
            .unwrap_or_else(|| candidate.tags.clone()),
        like_count: detail
            .map(|d| d.like_count)
            .unwrap_or(candidate.like_count as i64),
        comment_count: detail.map(|d| d.comment_count).unwrap_or(0),
        created_at,
        created_ago_hours,
        score: candidate.score,
        author: author.map(FeedAuthor::from),
        best_comment: best_comment.map(FeedCommentBlock::from),
        // Populated by the moderation subsystem, not here.
        hidden_users: Vec::new(),
        moderation_exclusions: Vec::new(),
    }
}
