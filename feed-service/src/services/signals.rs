//! Per-user personalization signal contract.
//!
//! The signals themselves are owned by other systems; the pipeline only
//! depends on this output shape.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::UserSignals;

#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Assemble the user's ranking signals for one request. Nothing is
    /// persisted by the pipeline.
    async fn signals(&self, user_id: Uuid) -> Result<UserSignals>;
}
