/// Best Comment Repository
///
/// One comment per post at most: the most-liked, oldest-first on ties. Posts
/// without comments simply have no entry in the result mapping.
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::error;
use uuid::Uuid;

use crate::error::Result;
use crate::models::BestComment;
use crate::services::enrichment::CommentStore;

pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn batch_fetch(&self, keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, BestComment>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Uuid> = keys.iter().copied().collect();
        let rows: Vec<BestComment> = sqlx::query_as(
            r#"
            SELECT DISTINCT ON (post_id) post_id, author_id, content
            FROM comments
            WHERE post_id = ANY($1)
            ORDER BY post_id, like_count DESC, created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Batch comment lookup failed for {} keys: {}", ids.len(), e);
            e
        })?;

        Ok(rows.into_iter().map(|row| (row.post_id, row)).collect())
    }
}
