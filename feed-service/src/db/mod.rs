pub mod comment_repo;
pub mod post_repo;
pub mod signals_repo;

pub use comment_repo::PgCommentStore;
pub use post_repo::PgPostStore;
pub use signals_repo::PgSignalProvider;
