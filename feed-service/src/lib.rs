pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod ident;
pub mod metrics;
pub mod models;
pub mod openapi;
pub mod search;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

pub use services::{
    AuthorStore, CandidateRanker, CommentStore, Enrichment, EnrichmentPolicy, FeedPipeline,
    NullAuthorStore, PostStore, RankingWeights, SignalProvider,
};
