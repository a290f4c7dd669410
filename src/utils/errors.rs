//! Error handling for FinBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for FinBuddy application
#[derive(Error, Debug)]
pub enum FinBuddyError {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Intent classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Intent classifier specific errors
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("NLU request failed: {0}")]
    RequestFailed(String),

    #[error("NLU request timed out")]
    Timeout,

    #[error("Invalid NLU response: {0}")]
    InvalidResponse(String),

    #[error("NLU service unavailable")]
    ServiceUnavailable,
}

/// Translation service specific errors
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    RequestFailed(String),

    #[error("Translation request timed out")]
    Timeout,

    #[error("Invalid translation response: {0}")]
    InvalidResponse(String),

    #[error("Translation service unavailable")]
    ServiceUnavailable,

    #[error("Unsupported language pair: {from} -> {to}")]
    UnsupportedPair { from: String, to: String },

    #[error("Translator initialization failed: {0}")]
    InitializationFailed(String),
}

/// Result type alias for FinBuddy operations
pub type Result<T> = std::result::Result<T, FinBuddyError>;

/// Result type alias for classifier operations
pub type ClassifierResult<T> = std::result::Result<T, ClassifierError>;

/// Result type alias for translation operations
pub type TranslationResult<T> = std::result::Result<T, TranslationError>;

impl FinBuddyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            FinBuddyError::Telegram(_) => true,
            FinBuddyError::Classifier(_) => true,
            FinBuddyError::Translation(_) => true,
            FinBuddyError::Config(_) => false,
            FinBuddyError::Content(_) => false,
            FinBuddyError::Redis(_) => true,
            FinBuddyError::Serialization(_) => false,
            FinBuddyError::Io(_) => true,
            FinBuddyError::UrlParse(_) => false,
            FinBuddyError::RateLimitExceeded => true,
            FinBuddyError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FinBuddyError::Config(_) => ErrorSeverity::Critical,
            FinBuddyError::Content(_) => ErrorSeverity::Critical,
            FinBuddyError::Classifier(_) => ErrorSeverity::Warning,
            FinBuddyError::Translation(_) => ErrorSeverity::Warning,
            FinBuddyError::RateLimitExceeded => ErrorSeverity::Warning,
            FinBuddyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_errors_are_recoverable_warnings() {
        let err: FinBuddyError = ClassifierError::Timeout.into();
        assert!(err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err: FinBuddyError = TranslationError::ServiceUnavailable.into();
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Translation error: Translation service unavailable");
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = FinBuddyError::Config("Bot token is required".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().to_string(), "CRITICAL");
    }
}
