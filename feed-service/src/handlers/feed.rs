use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::Result;
use crate::metrics;
use crate::services::FeedPipeline;

#[derive(Debug, Deserialize)]
pub struct FeedQueryParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Comma-separated previously seen item ids. Advisory exclusion;
    /// malformed entries are ignored, not rejected.
    #[serde(default)]
    pub seen: Option<String>,
}

fn default_limit() -> usize {
    20
}

impl FeedQueryParams {
    fn seen_ids(&self) -> Vec<String> {
        match &self.seen {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => Vec::new(),
        }
    }
}

pub struct FeedHandlerState {
    pub pipeline: Arc<FeedPipeline>,
    pub max_page_size: usize,
}

/// GET /api/v1/users/{user_id}/feed
///
/// A degraded request (failed enrichment) still returns 200 with fewer
/// populated fields; only a ranking-phase failure surfaces as an error.
#[get("/users/{user_id}/feed")]
pub async fn get_feed(
    path: web::Path<Uuid>,
    query: web::Query<FeedQueryParams>,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let limit = query.limit.min(state.max_page_size);
    let seen = query.seen_ids();

    debug!(
        "Feed request: user={} limit={} seen={}",
        user_id,
        limit,
        seen.len()
    );

    match state.pipeline.recommend(user_id, limit, &seen).await {
        Ok(response) => {
            metrics::record_request("ok");
            Ok(HttpResponse::Ok().json(response))
        }
        Err(err) => {
            metrics::record_request("error");
            error!("Feed request failed for user {}: {}", user_id, err);
            Err(err)
        }
    }
}
