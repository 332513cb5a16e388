//! Service layer for feed-service
//!
//! - ranking: candidate retrieval + combined scoring
//! - signals: per-user personalization signal contract
//! - enrichment: concurrent batch lookups against the relational stores
//! - assembler: pure merge of candidates with enrichment
//! - pipeline: end-to-end request orchestration

pub mod assembler;
pub mod enrichment;
pub mod pipeline;
pub mod ranking;
pub mod signals;

pub use assembler::assemble;
pub use enrichment::{
    AuthorStore, CommentStore, Enrichment, EnrichmentPolicy, NullAuthorStore, PostStore,
};
pub use pipeline::FeedPipeline;
pub use ranking::{CandidateRanker, RankingWeights};
pub use signals::SignalProvider;
