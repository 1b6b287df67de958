mod error;
mod memory;
mod turso;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use turso::TursoClient;

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::types::UserId;

use crate::service::{RequestKind, UserProfile, UserTier};

/// Narrow view of the persistent store: a `users` table and an append-only `requests` log.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Creates the user or refreshes its profile fields. An existing tier is kept.
    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), StorageError>;

    /// Unknown users are on the free tier.
    async fn get_tier(&self, user_id: UserId) -> Result<UserTier, StorageError>;

    async fn set_tier(&self, user_id: UserId, tier: UserTier) -> Result<(), StorageError>;

    /// Number of requests whose UTC date is today.
    async fn count_requests_today(&self, user_id: UserId) -> Result<u32, StorageError>;

    /// Appends one request, creating a bare user row first if needed.
    async fn append_request(&self, user_id: UserId, kind: RequestKind) -> Result<(), StorageError>;
}

/// Opens the store named by `url`: `:memory:` keeps everything in process,
/// anything else goes through libsql (remote or local file).
pub async fn open_store(url: &str, token: Option<&str>) -> Result<Arc<dyn UserStore>, StorageError> {
    if url == ":memory:" {
        warn!("Using in-memory store, usage data will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let client = TursoClient::open(url, token).await?;
    Ok(Arc::new(client))
}
