/// Post Detail Repository
///
/// Batch read of authoritative post records. The feed pipeline never writes.
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::error;
use uuid::Uuid;

use crate::error::Result;
use crate::models::PostDetail;
use crate::services::enrichment::PostStore;

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn batch_fetch(&self, keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, PostDetail>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Uuid> = keys.iter().copied().collect();
        let rows: Vec<PostDetail> = sqlx::query_as(
            r#"
            SELECT id, media_type, media_url, tags, like_count, comment_count, created_at
            FROM posts
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Batch post lookup failed for {} keys: {}", ids.len(), e);
            e
        })?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }
}
