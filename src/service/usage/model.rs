use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teloxide::types::UserId;

use crate::service::UserTier;

/// Kind of a completed request, as stored in the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    Summarize,
    Takeaways,
    Questions,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Summarize => "Summarize",
            RequestKind::Takeaways => "Takeaways",
            RequestKind::Questions => "Questions",
        }
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Summarize" => Ok(RequestKind::Summarize),
            "Takeaways" => Ok(RequestKind::Takeaways),
            "Questions" => Ok(RequestKind::Questions),
            _ => Err(format!("Unknown request kind: {}", s)),
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: UserId,
    pub kind: RequestKind,
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(user_id: UserId, kind: RequestKind) -> Self {
        Self {
            user_id,
            kind,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaStatus {
    Allowed { used: u32, limit: u32 },
    LimitReached { limit: u32 },
}

impl QuotaStatus {
    pub fn evaluate(tier: UserTier, used_today: u32) -> Self {
        let limit = tier.daily_limit();
        if used_today >= limit {
            QuotaStatus::LimitReached { limit }
        } else {
            QuotaStatus::Allowed { used: used_today, limit }
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaStatus::Allowed { .. })
    }
}

/// Tier and quota decision taken from the same store reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    pub tier: UserTier,
    pub status: QuotaStatus,
}

impl QuotaCheck {
    pub fn is_allowed(&self) -> bool {
        self.status.is_allowed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageInfo {
    pub tier: UserTier,
    pub used_today: u32,
    pub daily_limit: u32,
    pub remaining: u32,
}
