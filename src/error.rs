use shuttle_runtime::Error as ShuttleError;
use teloxide::{ApiError, RequestError};

use crate::{config::ConfigError, storage::StorageError};

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<BotError> for ShuttleError {
    fn from(error: BotError) -> Self {
        ShuttleError::Custom(anyhow::anyhow!(error))
    }
}

impl From<BotError> for RequestError {
    fn from(error: BotError) -> Self {
        RequestError::Api(ApiError::Unknown(error.to_string()))
    }
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::Other(error)
    }
}

pub type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub type BotResult<T> = Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_reaches_telegram_as_api_error() {
        let error = BotError::from(ConfigError::Missing("DATABASE_URL".to_string()));

        match RequestError::from(error) {
            RequestError::Api(ApiError::Unknown(message)) => {
                assert_eq!(message, "Config error: Missing secret: DATABASE_URL")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_anyhow_error_is_transparent() {
        let error = BotError::from(anyhow::anyhow!("connection refused"));
        assert_eq!(error.to_string(), "connection refused");
    }
}
