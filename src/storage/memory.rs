use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use teloxide::types::UserId;

use super::{StorageError, UserStore};
use crate::service::{RequestKind, UsageRecord, UserProfile, UserTier};

#[derive(Clone, Debug, Default)]
struct StoredUser {
    profile: Option<UserProfile>,
    tier: UserTier,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<UserId, StoredUser>>,
    requests: Arc<DashMap<UserId, Vec<UsageRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, user_id: UserId) -> Vec<UsageRecord> {
        self.requests
            .get(&user_id)
            .map(|records| records.value().clone())
            .unwrap_or_default()
    }

    pub fn profile(&self, user_id: UserId) -> Option<UserProfile> {
        self.users.get(&user_id).and_then(|user| user.profile.clone())
    }

    /// Appends a record with its own timestamp. Used to seed history.
    pub fn push_record(&self, record: UsageRecord) {
        self.users.entry(record.user_id).or_default();
        self.requests.entry(record.user_id).or_default().push(record);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.users.entry(profile.user_id).or_default().profile = Some(profile.clone());
        Ok(())
    }

    async fn get_tier(&self, user_id: UserId) -> Result<UserTier, StorageError> {
        Ok(self.users.get(&user_id).map(|user| user.tier).unwrap_or_default())
    }

    async fn set_tier(&self, user_id: UserId, tier: UserTier) -> Result<(), StorageError> {
        self.users.entry(user_id).or_default().tier = tier;
        Ok(())
    }

    async fn count_requests_today(&self, user_id: UserId) -> Result<u32, StorageError> {
        let today = Utc::now().date_naive();
        let count = self
            .requests
            .get(&user_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.timestamp.date_naive() == today)
                    .count()
            })
            .unwrap_or(0);

        u32::try_from(count).map_err(|_| StorageError::Other(format!("request count {}", count)))
    }

    async fn append_request(&self, user_id: UserId, kind: RequestKind) -> Result<(), StorageError> {
        self.push_record(UsageRecord::new(user_id, kind));
        Ok(())
    }
}
