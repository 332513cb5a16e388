/// User Signal Repository
///
/// Assembles the per-request personalization signals: top interest tags,
/// followed-author set, and the onboarding affinity weight. Users with no
/// recorded signals get neutral defaults rather than an error.
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::models::UserSignals;
use crate::services::signals::SignalProvider;

const TOP_TAG_LIMIT: i64 = 10;

pub struct PgSignalProvider {
    pool: PgPool,
}

impl PgSignalProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SignalProvider for PgSignalProvider {
    async fn signals(&self, user_id: Uuid) -> Result<UserSignals> {
        let top_tags: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT tag
            FROM user_interest_tags
            WHERE user_id = $1
            ORDER BY weight DESC, tag ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(TOP_TAG_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let followees: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT followee_id
            FROM follows
            WHERE follower_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let affinity_weight: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT affinity_weight
            FROM user_onboarding
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let signals = UserSignals {
            top_tags,
            followee_ids: followees.into_iter().collect::<HashSet<Uuid>>(),
            affinity_weight: affinity_weight.unwrap_or(1.0).clamp(0.0, 1.0),
        };

        debug!(
            "Signals for user {}: {} tags, {} followees, affinity {}",
            user_id,
            signals.top_tags.len(),
            signals.followee_ids.len(),
            signals.affinity_weight
        );

        Ok(signals)
    }
}
