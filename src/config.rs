use std::{str::FromStr, time::Duration};

use shuttle_runtime::SecretStore;

use crate::service::{generation, prompt, PipelineSettings};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing secret: {0}")]
    Missing(String),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub database: DatabaseConfig,
    pub generation: GenerationConfig,
    pub transcript: TranscriptConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig(pub String);

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    /// Only needed for remote databases.
    pub token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct TranscriptConfig {
    pub max_chars: usize,
    pub min_chars: usize,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("Building AppConfig...");

        let config = AppConfig {
            telegram: TelegramConfig(required(&lookup, "TELEGRAM_BOT_TOKEN")?),
            database: DatabaseConfig {
                url: required(&lookup, "DATABASE_URL")?,
                token: lookup("DATABASE_TOKEN").filter(|token| !token.is_empty()),
            },
            generation: GenerationConfig {
                api_key: required(&lookup, "CEREBRAS_API_KEY")?,
                base_url: lookup("GENERATION_BASE_URL").unwrap_or_else(|| generation::DEFAULT_BASE_URL.to_string()),
                model: lookup("GENERATION_MODEL").unwrap_or_else(|| generation::DEFAULT_MODEL.to_string()),
                timeout_secs: parsed_or(&lookup, "GENERATION_TIMEOUT_SECS", 60)?,
            },
            transcript: TranscriptConfig {
                max_chars: parsed_or(&lookup, "TRANSCRIPT_MAX_CHARS", prompt::DEFAULT_MAX_TRANSCRIPT_CHARS)?,
                min_chars: parsed_or(&lookup, "TRANSCRIPT_MIN_CHARS", prompt::DEFAULT_MIN_CONTENT_CHARS)?,
                timeout_secs: parsed_or(&lookup, "TRANSCRIPT_TIMEOUT_SECS", 30)?,
            },
        };

        info!("AppConfig built");
        Ok(config)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            model: self.generation.model.clone(),
            max_transcript_chars: self.transcript.max_chars,
            min_content_chars: self.transcript.min_chars,
            transcript_timeout: Duration::from_secs(self.transcript.timeout_secs),
            generation_timeout: Duration::from_secs(self.generation.timeout_secs),
        }
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("CEREBRAS_API_KEY", "csk-test"),
        ("DATABASE_URL", ":memory:"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.telegram.0, "123:abc");
        assert!(config.database.token.is_none());
        assert_eq!(config.generation.base_url, "https://api.cerebras.ai/v1");
        assert_eq!(config.generation.model, "llama-4-scout-17b-16e-instruct");

        let settings = config.pipeline_settings();
        assert_eq!(settings.max_transcript_chars, 5000);
        assert_eq!(settings.min_content_chars, 100);
        assert_eq!(settings.transcript_timeout, Duration::from_secs(30));
        assert_eq!(settings.generation_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DATABASE_TOKEN", "secret"));
        pairs.push(("GENERATION_MODEL", "llama3.1-8b"));
        pairs.push(("TRANSCRIPT_MAX_CHARS", "8000"));

        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.database.token.as_deref(), Some("secret"));
        assert_eq!(config.generation.model, "llama3.1-8b");
        assert_eq!(config.transcript.max_chars, 8000);
    }

    #[test]
    fn test_missing_required_key() {
        let err = AppConfig::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref key) if key == "DATABASE_URL"));
    }

    #[test]
    fn test_unparsable_number() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GENERATION_TIMEOUT_SECS", "soon"));

        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "GENERATION_TIMEOUT_SECS"));
    }
}
