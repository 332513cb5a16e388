pub mod feed;

pub use feed::{get_feed, FeedHandlerState};
