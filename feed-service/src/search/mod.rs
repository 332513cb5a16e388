//! Search index boundary.
//!
//! The pipeline treats the index as a scored-candidate provider: one query,
//! unseen items only, at most `limit` hits with relevance metadata. Index
//! schema and maintenance live elsewhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use elasticsearch::{
    http::transport::{BuildError, SingleNodeConnectionPool, TransportBuilder},
    Elasticsearch, SearchParts,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Candidate, UserSignals};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] BuildError),
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::IndexUnavailable(err.to_string())
    }
}

/// Scored-candidate provider.
///
/// An unreachable index must surface as `AppError::IndexUnavailable`, never
/// as a silent empty list: callers distinguish "no candidates" from "ranking
/// failed".
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn query(
        &self,
        user_id: Uuid,
        signals: &UserSignals,
        excluded: &HashSet<String>,
        limit: usize,
    ) -> Result<Vec<Candidate>>;
}

#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Elasticsearch,
    post_index: String,
    freshness_scale_hours: f64,
}

/// Denormalized post document as stored in the index.
#[derive(Debug, Deserialize)]
struct CandidateSource {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    tags: Vec<String>,
    author_id: String,
    #[serde(default)]
    media_type: String,
    #[serde(default)]
    media_url: Option<String>,
    #[serde(default)]
    like_count: u32,
    created_at: DateTime<Utc>,
}

impl ElasticsearchIndex {
    pub fn new(
        url: &str,
        post_index: &str,
        freshness_scale_hours: f64,
    ) -> std::result::Result<Self, SearchError> {
        let parsed = Url::parse(url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).build()?;
        let client = Elasticsearch::new(transport);

        Ok(Self {
            client,
            post_index: post_index.to_string(),
            freshness_scale_hours,
        })
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn query(
        &self,
        user_id: Uuid,
        signals: &UserSignals,
        excluded: &HashSet<String>,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let size = limit.min(1000);
        let excluded_ids: Vec<&str> = excluded.iter().map(String::as_str).collect();
        let followees: Vec<String> = signals.followee_ids.iter().map(|id| id.to_string()).collect();

        // Seen-id exclusion and recency decay are applied index-side; the
        // authoritative combined score is recomputed by the ranker over the
        // returned hits.
        let body = json!({
            "size": size,
            "query": {
                "function_score": {
                    "query": {
                        "bool": {
                            "must": [
                                {
                                    "bool": {
                                        "should": [
                                            { "match_all": {} },
                                            { "terms": { "tags": signals.top_tags } },
                                            { "terms": { "author_id": followees } }
                                        ]
                                    }
                                }
                            ],
                            "must_not": [
                                { "ids": { "values": excluded_ids } }
                            ]
                        }
                    },
                    "functions": [
                        {
                            "gauss": {
                                "created_at": {
                                    "origin": "now",
                                    "scale": format!("{}h", self.freshness_scale_hours.max(1.0) as u64),
                                    "decay": 0.5
                                }
                            }
                        }
                    ],
                    "score_mode": "sum",
                    "boost_mode": "sum"
                }
            },
            "sort": [
                { "_score": { "order": "desc" } },
                { "id": { "order": "asc" } }
            ]
        });

        debug!(
            "Querying post index {} for user {} (limit: {}, excluded: {})",
            self.post_index,
            user_id,
            size,
            excluded.len()
        );

        let response = self
            .client
            .search(SearchParts::Index(&[self.post_index.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(SearchError::from)?;

        let payload = response
            .json::<serde_json::Value>()
            .await
            .map_err(SearchError::from)?;

        let hits = payload["hits"]["hits"].as_array().cloned().unwrap_or_default();

        let mut candidates = Vec::with_capacity(hits.len());
        for hit in hits {
            let relevance = hit["_score"].as_f64().unwrap_or(0.0);
            let source: CandidateSource =
                serde_json::from_value(hit["_source"].clone()).map_err(SearchError::from)?;
            candidates.push(Candidate {
                id: source.id,
                title: source.title,
                excerpt: source.excerpt,
                tags: source.tags,
                author_id: source.author_id,
                media_type: source.media_type,
                media_url: source.media_url,
                like_count: source.like_count,
                created_at: source.created_at,
                relevance,
                score: relevance,
            });
        }

        Ok(candidates)
    }
}
