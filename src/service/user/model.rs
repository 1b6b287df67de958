use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use teloxide::types::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Subscription level. Controls the daily quota and access to takeaways.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    #[default]
    Free,
    Pro,
    Plus,
}

impl UserTier {
    pub const ALL: [UserTier; 3] = [UserTier::Free, UserTier::Pro, UserTier::Plus];

    /// Completed requests allowed per calendar day.
    pub fn daily_limit(&self) -> u32 {
        match self {
            UserTier::Free => 3,
            UserTier::Pro => 10,
            UserTier::Plus => 100,
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, UserTier::Free)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserTier::Free => "free",
            UserTier::Pro => "pro",
            UserTier::Plus => "plus",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UserTier::Free => "Free",
            UserTier::Pro => "Pro",
            UserTier::Plus => "Plus",
        }
    }
}

impl FromStr for UserTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(UserTier::Free),
            "pro" => Ok(UserTier::Pro),
            "plus" => Ok(UserTier::Plus),
            _ => Err(format!("Unknown tier: {}", s)),
        }
    }
}

impl fmt::Display for UserTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_limits() {
        assert_eq!(UserTier::Free.daily_limit(), 3);
        assert_eq!(UserTier::Pro.daily_limit(), 10);
        assert_eq!(UserTier::Plus.daily_limit(), 100);
    }

    #[test]
    fn test_tier_parsing_is_strict() {
        for tier in UserTier::ALL {
            assert_eq!(UserTier::from_str(tier.as_str()), Ok(tier));
        }
        assert!(UserTier::from_str("Pro").is_err());
        assert!(UserTier::from_str("gold").is_err());
        assert!(UserTier::from_str("").is_err());
    }
}
