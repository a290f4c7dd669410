//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the FinBuddy application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::state::ConversationState;
use crate::utils::errors::{FinBuddyError, Result};
use crate::utils::helpers::truncate_text;

/// Longest user message excerpt written to turn logs
pub const LOGGED_MESSAGE_CHARS: usize = 100;

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer; keep it alive for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_file_layer = config.json_format.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking.clone())
    });
    let text_file_layer = (!config.json_format).then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(json_file_layer)
        .with(text_file_layer)
        .try_init()
        .map_err(|e| FinBuddyError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// One processed turn, as written to the monitoring log
#[derive(Debug)]
pub struct TurnRecord<'a> {
    pub conversation_id: i64,
    pub intent: &'a str,
    pub confidence: f32,
    pub language: &'a str,
    pub user_message: &'a str,
    pub bot_response_length: usize,
    pub state_before: &'a ConversationState,
    pub state_after: &'a ConversationState,
    pub processing_time_ms: u64,
}

/// Log a processed conversation turn with structured data
pub fn log_conversation_turn(record: &TurnRecord<'_>) {
    info!(
        conversation_id = record.conversation_id,
        intent = record.intent,
        confidence = record.confidence,
        language = record.language,
        user_message = %truncate_text(record.user_message, LOGGED_MESSAGE_CHARS),
        bot_response_length = record.bot_response_length,
        state_before = %record.state_before,
        state_after = %record.state_after,
        processing_time_ms = record.processing_time_ms,
        "Conversation turn processed"
    );
}

/// Log how a turn changed the conversation state
pub fn log_state_transition(intent: &str, before: &ConversationState, after: &ConversationState) {
    if before == after {
        debug!(intent = intent, state = %after, "Conversation state unchanged");
    } else {
        debug!(intent = intent, from = %before, to = %after, "Conversation state updated");
    }
}

/// Log translation results
pub fn log_translation(from: &str, to: &str, chars: usize, success: bool) {
    if success {
        debug!(from = from, to = to, chars = chars, "Translation completed");
    } else {
        warn!(from = from, to = to, chars = chars, "Translation failed, continuing in English");
    }
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
