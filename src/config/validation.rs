//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use url::Url;
use crate::utils::errors::{FinBuddyError, Result};
use super::{ClassifierProvider, Settings, TranslationProvider};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_redis_config(&settings.redis)?;
    validate_classifier_config(&settings.classifier)?;
    validate_translation_config(&settings.translation)?;
    validate_content_config(&settings.content)?;
    validate_logging_config(&settings.logging)?;
    validate_rate_limit_config(&settings.rate_limit)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(FinBuddyError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(FinBuddyError::Config(
            "Redis URL is required".to_string()
        ));
    }

    let url = Url::parse(&config.url)?;
    if !matches!(url.scheme(), "redis" | "rediss") {
        return Err(FinBuddyError::Config(
            format!("Redis URL must use redis:// or rediss://, got {}://", url.scheme())
        ));
    }

    if config.ttl_seconds == 0 {
        return Err(FinBuddyError::Config(
            "Redis TTL must be greater than 0".to_string()
        ));
    }

    if config.history_limit == 0 {
        return Err(FinBuddyError::Config(
            "History limit must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate intent classifier configuration
fn validate_classifier_config(config: &super::ClassifierConfig) -> Result<()> {
    if !(0.0..=1.0).contains(&config.confidence_threshold) {
        return Err(FinBuddyError::Config(
            format!("Confidence threshold must be between 0 and 1, got {}", config.confidence_threshold)
        ));
    }

    if config.provider == ClassifierProvider::Http {
        validate_http_endpoint("Classifier", &config.url)?;

        if config.timeout_seconds == 0 {
            return Err(FinBuddyError::Config(
                "Classifier timeout must be greater than 0".to_string()
            ));
        }
    }

    Ok(())
}

/// Validate translation configuration
fn validate_translation_config(config: &super::TranslationConfig) -> Result<()> {
    if config.enabled && config.provider == TranslationProvider::Http {
        validate_http_endpoint("Translation", &config.url)?;

        if config.timeout_seconds == 0 {
            return Err(FinBuddyError::Config(
                "Translation timeout must be greater than 0".to_string()
            ));
        }
    }

    Ok(())
}

/// Validate static content configuration
fn validate_content_config(config: &super::ContentConfig) -> Result<()> {
    if config.directory.is_empty() {
        return Err(FinBuddyError::Config(
            "Content directory is required".to_string()
        ));
    }

    if config.default_language.is_empty() {
        return Err(FinBuddyError::Config(
            "Default language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(FinBuddyError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(FinBuddyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(FinBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.file_name.is_empty() {
        return Err(FinBuddyError::Config(
            "Log file name is required".to_string()
        ));
    }

    Ok(())
}

/// Validate rate limit configuration
fn validate_rate_limit_config(config: &super::RateLimitSettings) -> Result<()> {
    if config.requests_per_minute == 0 {
        return Err(FinBuddyError::Config(
            "Requests per minute must be greater than 0".to_string()
        ));
    }

    if config.burst_size == 0 {
        return Err(FinBuddyError::Config(
            "Burst size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_http_endpoint(service: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(FinBuddyError::Config(
            format!("{} URL is required", service)
        ));
    }

    let url = Url::parse(value)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FinBuddyError::Config(
            format!("{} URL must use http:// or https://", service)
        ));
    }

    Ok(())
}
