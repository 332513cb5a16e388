//! Batch enrichment against the relational stores.
//!
//! Three independent lookups (post detail, author profile, best comment) run
//! concurrently, each with its own timeout. A failed or timed-out source
//! contributes an empty mapping for the whole request; it never aborts the
//! other two and never fails the request. All-or-nothing per enricher: a
//! partially received mapping is not used.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;
use crate::metrics;
use crate::models::{AuthorProfile, BestComment, PostDetail};

/// Batch post-detail lookup. Absent key = absent entry, not an error.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn batch_fetch(&self, keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, PostDetail>>;
}

/// Batch author-profile lookup.
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn batch_fetch(&self, keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, AuthorProfile>>;
}

/// Batch best-comment lookup, keyed by post id.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn batch_fetch(&self, keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, BestComment>>;
}

/// No profile provider configured. Indistinguishable from "provider returned
/// no match", which is exactly what the assembler expects.
pub struct NullAuthorStore;

#[async_trait]
impl AuthorStore for NullAuthorStore {
    async fn batch_fetch(&self, _keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, AuthorProfile>> {
        Ok(HashMap::new())
    }
}

/// Enrichment mappings for one request. A missing key in any map is a normal
/// outcome the assembler degrades around.
#[derive(Debug, Default)]
pub struct Enrichment {
    pub posts: HashMap<Uuid, PostDetail>,
    pub authors: HashMap<Uuid, AuthorProfile>,
    pub comments: HashMap<Uuid, BestComment>,
}

#[derive(Debug, Clone)]
pub struct EnrichmentPolicy {
    pub timeout: Duration,
    pub retry_once: bool,
}

impl From<&crate::config::EnrichmentConfig> for EnrichmentPolicy {
    fn from(config: &crate::config::EnrichmentConfig) -> Self {
        EnrichmentPolicy {
            timeout: Duration::from_millis(config.timeout_ms),
            retry_once: config.retry_once,
        }
    }
}

/// Fan out the three batch lookups concurrently.
///
/// Empty key sets short-circuit without touching the backing store. Post and
/// comment lookups share the post-key set; the profile lookup uses the
/// author-key set.
pub async fn enrich(
    posts: &dyn PostStore,
    authors: &dyn AuthorStore,
    comments: &dyn CommentStore,
    post_keys: &HashSet<Uuid>,
    author_keys: &HashSet<Uuid>,
    policy: &EnrichmentPolicy,
) -> Enrichment {
    let posts_fut = async {
        if post_keys.is_empty() {
            HashMap::new()
        } else {
            fetch_or_empty("post", policy, || posts.batch_fetch(post_keys)).await
        }
    };
    let authors_fut = async {
        if author_keys.is_empty() {
            HashMap::new()
        } else {
            fetch_or_empty("author", policy, || authors.batch_fetch(author_keys)).await
        }
    };
    let comments_fut = async {
        if post_keys.is_empty() {
            HashMap::new()
        } else {
            fetch_or_empty("comment", policy, || comments.batch_fetch(post_keys)).await
        }
    };

    let (posts, authors, comments) = tokio::join!(posts_fut, authors_fut, comments_fut);

    Enrichment {
        posts,
        authors,
        comments,
    }
}

/// Run one batch lookup under the policy timeout, degrading to an empty map
/// on failure. Retries once when configured.
async fn fetch_or_empty<T, F, Fut>(
    source: &'static str,
    policy: &EnrichmentPolicy,
    call: F,
) -> HashMap<Uuid, T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<HashMap<Uuid, T>>>,
{
    let attempts = if policy.retry_once { 2 } else { 1 };

    let mut reason = "error";
    for attempt in 1..=attempts {
        match tokio::time::timeout(policy.timeout, call()).await {
            Ok(Ok(map)) => return map,
            Ok(Err(e)) => {
                reason = "error";
                warn!(
                    "Batch {} lookup failed (attempt {}/{}): {}",
                    source, attempt, attempts, e
                );
            }
            Err(_) => {
                reason = "timeout";
                warn!(
                    "Batch {} lookup timed out after {:?} (attempt {}/{})",
                    source, policy.timeout, attempt, attempts
                );
            }
        }
    }

    metrics::record_enrichment_degraded(source, reason);
    warn!("Continuing with empty {} enrichment for this request", source);
    HashMap::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingPostStore;

    #[async_trait]
    impl PostStore for FailingPostStore {
        async fn batch_fetch(&self, _keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, PostDetail>> {
            Err(AppError::DatabaseError("connection refused".into()))
        }
    }

    struct CountingCommentStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CommentStore for CountingCommentStore {
        async fn batch_fetch(&self, _keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, BestComment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HashMap::new())
        }
    }

    struct SlowPostStore;

    #[async_trait]
    impl PostStore for SlowPostStore {
        async fn batch_fetch(&self, _keys: &HashSet<Uuid>) -> Result<HashMap<Uuid, PostDetail>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(HashMap::new())
        }
    }

    fn policy() -> EnrichmentPolicy {
        EnrichmentPolicy {
            timeout: Duration::from_millis(50),
            retry_once: false,
        }
    }

    #[tokio::test]
    async fn failed_store_degrades_to_empty_map() {
        let keys: HashSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        let comments = CountingCommentStore {
            calls: AtomicUsize::new(0),
        };

        let enrichment = enrich(
            &FailingPostStore,
            &NullAuthorStore,
            &comments,
            &keys,
            &keys,
            &policy(),
        )
        .await;

        assert!(enrichment.posts.is_empty());
        // The comment lookup is unaffected by the post store failure.
        assert_eq!(comments.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_key_set_skips_backing_store() {
        let comments = CountingCommentStore {
            calls: AtomicUsize::new(0),
        };

        let enrichment = enrich(
            &FailingPostStore,
            &NullAuthorStore,
            &comments,
            &HashSet::new(),
            &HashSet::new(),
            &policy(),
        )
        .await;

        assert!(enrichment.posts.is_empty());
        assert!(enrichment.comments.is_empty());
        assert_eq!(comments.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn timed_out_store_degrades_to_empty_map() {
        let keys: HashSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        let comments = CountingCommentStore {
            calls: AtomicUsize::new(0),
        };

        let enrichment = enrich(
            &SlowPostStore,
            &NullAuthorStore,
            &comments,
            &keys,
            &keys,
            &policy(),
        )
        .await;

        assert!(enrichment.posts.is_empty());
        assert_eq!(comments.calls.load(Ordering::SeqCst), 1);
    }
}
