//! Identifier reconciliation between the search index and the relational
//! stores.
//!
//! The index hands out opaque string identifiers; the stores are keyed by
//! `Uuid`. This module is the single chokepoint for that conversion: a string
//! that does not match the canonical UUID grammar maps to `None` and the
//! candidate simply becomes enrichment-optional. Nothing here can fail a
//! request.

use std::collections::HashSet;
use uuid::Uuid;

use crate::models::Candidate;

/// Convert an opaque index identifier into a typed store key.
///
/// Pure and total: malformed input (empty, wrong length, non-hex) yields
/// `None`, never an error.
pub fn reconcile(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Reconciled keys for one candidate. A malformed author id does not
/// invalidate the post id, and vice versa.
#[derive(Debug, Clone, Copy)]
pub struct CandidateKeys {
    pub post: Option<Uuid>,
    pub author: Option<Uuid>,
}

impl CandidateKeys {
    pub fn of(candidate: &Candidate) -> Self {
        CandidateKeys {
            post: reconcile(&candidate.id),
            author: reconcile(&candidate.author_id),
        }
    }
}

/// Reconcile every candidate, preserving order (the assembler zips these back
/// against the candidate list).
pub fn keys_for(candidates: &[Candidate]) -> Vec<CandidateKeys> {
    candidates.iter().map(CandidateKeys::of).collect()
}

/// Deduplicated post-key set for the post and comment batch lookups.
pub fn post_key_set(keys: &[CandidateKeys]) -> HashSet<Uuid> {
    keys.iter().filter_map(|k| k.post).collect()
}

/// Deduplicated author-key set for the profile batch lookup.
pub fn author_key_set(keys: &[CandidateKeys]) -> HashSet<Uuid> {
    keys.iter().filter_map(|k| k.author).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate(id: &str, author_id: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: "t".to_string(),
            excerpt: "e".to_string(),
            tags: vec![],
            author_id: author_id.to_string(),
            media_type: "image".to_string(),
            media_url: None,
            like_count: 0,
            created_at: Utc::now(),
            relevance: 0.0,
            score: 0.0,
        }
    }

    #[test]
    fn reconcile_accepts_canonical_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(reconcile(&id.to_string()), Some(id));
    }

    #[test]
    fn reconcile_rejects_malformed_strings() {
        for raw in ["", "id-1", "not-hex", "1234", "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"] {
            assert_eq!(reconcile(raw), None, "expected None for {:?}", raw);
        }
    }

    #[test]
    fn reconcile_is_idempotent() {
        let raw = Uuid::new_v4().to_string();
        assert_eq!(reconcile(&raw), reconcile(&raw));
        assert_eq!(reconcile("garbage"), reconcile("garbage"));
    }

    #[test]
    fn malformed_author_id_keeps_post_key() {
        let post_id = Uuid::new_v4();
        let keys = CandidateKeys::of(&candidate(&post_id.to_string(), "deleted-user"));
        assert_eq!(keys.post, Some(post_id));
        assert_eq!(keys.author, None);
    }

    #[test]
    fn key_sets_are_deduplicated() {
        let post_id = Uuid::new_v4();
        let author_id = Uuid::new_v4();
        let candidates = vec![
            candidate(&post_id.to_string(), &author_id.to_string()),
            candidate(&post_id.to_string(), &author_id.to_string()),
            candidate("malformed", &author_id.to_string()),
        ];
        let keys = keys_for(&candidates);
        assert_eq!(keys.len(), 3);
        assert_eq!(post_key_set(&keys).len(), 1);
        assert_eq!(author_key_set(&keys).len(), 1);
    }
}
