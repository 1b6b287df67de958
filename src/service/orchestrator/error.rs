use crate::{
    service::{LedgerError, LinkError, SessionError},
    storage::StorageError,
};

/// Every outcome the conversation can recover from. Each one maps to a single user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid link format")]
    InvalidLinkFormat,
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("No pending link")]
    NoPendingLink,
    #[error("Missing session data")]
    MissingSessionData,
    #[error("Daily quota of {limit} requests exceeded")]
    QuotaExceeded { limit: u32 },
    #[error("Action not available on the free tier")]
    TierRestricted,
    #[error("Invalid tier: {0}")]
    InvalidTier(String),
    #[error("Transcript unavailable")]
    TranscriptUnavailable,
    #[error("Transcript too short to process")]
    ContentTooShort,
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl FlowError {
    pub fn user_message(&self) -> String {
        match self {
            FlowError::InvalidLinkFormat => t!("errors.invalid_link").to_string(),
            FlowError::UnsupportedLanguage(_) => t!("errors.unsupported_language").to_string(),
            FlowError::NoPendingLink => t!("errors.no_pending_link").to_string(),
            FlowError::MissingSessionData => t!("errors.missing_session_data").to_string(),
            FlowError::QuotaExceeded { limit } => t!("errors.quota_exceeded", limit = limit).to_string(),
            FlowError::TierRestricted => t!("errors.tier_restricted").to_string(),
            FlowError::InvalidTier(_) => t!("errors.invalid_tier").to_string(),
            FlowError::TranscriptUnavailable => t!("errors.transcript_unavailable").to_string(),
            FlowError::ContentTooShort => t!("errors.content_too_short").to_string(),
            FlowError::GenerationFailed(_) => t!("errors.generation_failed").to_string(),
            FlowError::Storage(_) => t!("errors.internal").to_string(),
        }
    }
}

impl From<LinkError> for FlowError {
    fn from(error: LinkError) -> Self {
        match error {
            LinkError::InvalidFormat => FlowError::InvalidLinkFormat,
        }
    }
}

impl From<SessionError> for FlowError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NoPendingLink => FlowError::NoPendingLink,
            SessionError::MissingSessionData => FlowError::MissingSessionData,
            SessionError::UnsupportedLanguage(code) => FlowError::UnsupportedLanguage(code),
        }
    }
}

impl From<LedgerError> for FlowError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::InvalidTier(tier) => FlowError::InvalidTier(tier),
            LedgerError::Storage(e) => FlowError::Storage(e),
        }
    }
}
