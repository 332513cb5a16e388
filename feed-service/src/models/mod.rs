use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Scored item returned by the search index before enrichment.
///
/// This is the index's denormalized copy of a post. It deliberately stays a
/// separate type from [`PostDetail`] (the relational source of truth); the two
/// are only ever joined by identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author_id: String,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub like_count: u32,
    pub created_at: DateTime<Utc>,
    /// Raw index relevance, as returned by the search engine.
    #[serde(default)]
    pub relevance: f64,
    /// Combined score assigned by the ranker.
    #[serde(default)]
    pub score: f64,
}

/// Authoritative relational record for a post. May be missing for a
/// candidate when the index is ahead of the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostDetail {
    pub id: Uuid,
    pub media_type: String,
    pub media_url: Option<String>,
    pub tags: Vec<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Author profile; may be missing (denormalization lag, deleted user).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthorProfile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Highest-ranked comment of a post. Absence is a normal outcome.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BestComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

/// Personalization signals for one user, assembled per request.
#[derive(Debug, Clone, Default)]
pub struct UserSignals {
    /// Top interest tags, strongest first.
    pub top_tags: Vec<String>,
    pub followee_ids: HashSet<Uuid>,
    /// Onboarding/behavioral weighting factor in [0, 1].
    pub affinity_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedAuthor {
    pub id: Uuid,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<&AuthorProfile> for FeedAuthor {
    fn from(profile: &AuthorProfile) -> Self {
        FeedAuthor {
            id: profile.id,
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCommentBlock {
    pub author_id: Uuid,
    pub content: String,
}

impl From<&BestComment> for FeedCommentBlock {
    fn from(comment: &BestComment) -> Self {
        FeedCommentBlock {
            author_id: comment.author_id,
            content: comment.content.clone(),
        }
    }
}

/// Final feed item: one candidate merged with whatever enrichment arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub tags: Vec<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    /// Hours since creation, clamped to [0, i64::MAX].
    pub created_ago_hours: i64,
    pub score: f64,
    /// Omitted entirely when no profile was found for the author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<FeedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_comment: Option<FeedCommentBlock>,
    /// Owned by the moderation subsystem; always empty here.
    #[serde(default)]
    pub hidden_users: Vec<String>,
    #[serde(default)]
    pub moderation_exclusions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub results: Vec<FeedItem>,
    pub count: usize,
}

impl FeedResponse {
    pub fn empty() -> Self {
        FeedResponse {
            results: Vec::new(),
            count: 0,
        }
    }
}
