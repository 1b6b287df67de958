mod model;

pub use model::{QuotaCheck, QuotaStatus, RequestKind, UsageInfo, UsageRecord};

use std::{str::FromStr, sync::Arc};

use teloxide::types::UserId;

use crate::{
    service::{UserProfile, UserTier},
    storage::{StorageError, UserStore},
};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid tier: {0}")]
    InvalidTier(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Per-user tier and daily request accounting on top of the store.
#[derive(Clone)]
pub struct UsageLedger {
    store: Arc<dyn UserStore>,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn register_user(&self, profile: &UserProfile) -> Result<(), LedgerError> {
        self.store.upsert_user(profile).await?;
        Ok(())
    }

    /// Reads tier and today's count once. Cheap; call it before any external work.
    pub async fn check_and_describe_quota(&self, user_id: UserId) -> Result<QuotaCheck, LedgerError> {
        let tier = self.store.get_tier(user_id).await?;
        let used = self.store.count_requests_today(user_id).await?;
        let status = QuotaStatus::evaluate(tier, used);

        debug!("Quota for {}: tier={} used={} -> {:?}", user_id, tier, used, status);
        Ok(QuotaCheck { tier, status })
    }

    pub async fn record_usage(&self, user_id: UserId, kind: RequestKind) -> Result<(), LedgerError> {
        self.store.append_request(user_id, kind).await?;
        info!("Recorded {} request for user {}", kind, user_id);
        Ok(())
    }

    /// Only affects quota checks made after this returns.
    pub async fn set_tier(&self, user_id: UserId, tier: &str) -> Result<UserTier, LedgerError> {
        let tier = UserTier::from_str(tier).map_err(|_| LedgerError::InvalidTier(tier.to_string()))?;
        self.store.set_tier(user_id, tier).await?;
        info!("User {} moved to tier {}", user_id, tier);
        Ok(tier)
    }

    pub async fn describe_usage(&self, user_id: UserId) -> Result<UsageInfo, LedgerError> {
        let tier = self.store.get_tier(user_id).await?;
        let used_today = self.store.count_requests_today(user_id).await?;
        let daily_limit = tier.daily_limit();

        Ok(UsageInfo {
            tier,
            used_today,
            daily_limit,
            remaining: daily_limit.saturating_sub(used_today),
        })
    }
}
