//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `FINBUDDY_BOT__TOKEN`
pub const ENV_PREFIX: &str = "FINBUDDY";

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub redis: RedisConfig,
    pub classifier: ClassifierConfig,
    pub translation: TranslationConfig,
    pub content: ContentConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitSettings,
    pub features: FeaturesConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// BillMart team members: exempt from rate limiting and allowed to list demo requests
    pub admin_ids: Vec<i64>,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
    /// Exchanges kept per conversation
    pub history_limit: usize,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            prefix: "finbuddy:".to_string(),
            ttl_seconds: 86400,
            history_limit: 50,
        }
    }
}

/// Where intents come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    /// Rasa-compatible `/model/parse` endpoint
    Http,
    /// Built-in keyword heuristic, no external service
    #[default]
    Keyword,
}

/// Intent classifier configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    pub provider: ClassifierProvider,
    pub url: String,
    pub timeout_seconds: u64,
    /// Predictions below this confidence are treated as `nlu_fallback`
    pub confidence_threshold: f32,
}

/// Which translation backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// HTTP translation service speaking IndicTrans2 language codes
    Http,
    /// Pass-through, English only
    #[default]
    Noop,
}

/// Translation service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub provider: TranslationProvider,
    pub url: String,
    pub timeout_seconds: u64,
}

/// Static content configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    /// Directory holding `<lang>.json` content files
    pub directory: String,
    pub default_language: String,
    pub supported_languages: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_name: String,
    pub json_format: bool,
}

/// Per-chat rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitSettings {
    pub requests_per_minute: u32,
    pub burst_size: u32,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub rate_limiting: bool,
    pub conversation_history: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name("config").required(false))
    }

    /// Load settings from an explicit file, still honoring environment overrides
    pub fn from_path(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path))
    }

    fn build(file: config::File<config::FileSourceFile, config::FileFormat>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::FinBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_ids: vec![],
            },
            redis: RedisConfig::default(),
            classifier: ClassifierConfig {
                provider: ClassifierProvider::Keyword,
                url: "http://localhost:5005".to_string(),
                timeout_seconds: 5,
                confidence_threshold: 0.4,
            },
            translation: TranslationConfig {
                enabled: false,
                provider: TranslationProvider::Noop,
                url: "http://localhost:8090".to_string(),
                timeout_seconds: 10,
            },
            content: ContentConfig {
                directory: "content".to_string(),
                default_language: "en".to_string(),
                supported_languages: vec!["en".to_string()],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_name: "finbuddy.log".to_string(),
                json_format: false,
            },
            rate_limit: RateLimitSettings {
                requests_per_minute: 20,
                burst_size: 5,
            },
            features: FeaturesConfig {
                rate_limiting: true,
                conversation_history: true,
            },
        }
    }
}
