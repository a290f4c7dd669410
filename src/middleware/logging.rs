//! Logging middleware
//!
//! Records inbound Telegram interactions and times each assistant turn.

use std::time::{Duration, Instant};
use teloxide::types::{CallbackQuery, Message};
use tracing::{debug, error, info, warn};
use crate::services::AssistantReply;
use crate::utils::errors::{ErrorSeverity, FinBuddyError};
use crate::utils::helpers::truncate_text;
use crate::utils::logging::LOGGED_MESSAGE_CHARS;

/// Turns slower than this are reported at `warn`
pub const DEFAULT_SLOW_TURN: Duration = Duration::from_secs(3);

/// Logging middleware for bot interactions
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    log_user_interactions: bool,
    slow_turn: Duration,
}

impl LoggingMiddleware {
    pub fn new(log_user_interactions: bool, slow_turn: Duration) -> Self {
        Self {
            log_user_interactions,
            slow_turn,
        }
    }

    /// Log an inbound message; user text is truncated
    pub fn log_message(&self, message: &Message) {
        if !self.log_user_interactions {
            return;
        }

        let user_id = message.from.as_ref().map(|user| user.id.0);
        let language = message.from.as_ref().and_then(|user| user.language_code.as_deref());
        match message.text() {
            Some(text) => info!(
                chat_id = message.chat.id.0,
                user_id = user_id,
                language = language,
                text = %truncate_text(text, LOGGED_MESSAGE_CHARS),
                "Text message received"
            ),
            None => debug!(chat_id = message.chat.id.0, user_id = user_id, "Non-text message received"),
        }
    }

    /// Log a quick-reply button press
    pub fn log_callback(&self, query: &CallbackQuery) {
        if !self.log_user_interactions {
            return;
        }

        info!(
            user_id = query.from.id.0,
            callback_data = query.data.as_deref().unwrap_or("none"),
            "Quick reply pressed"
        );
    }

    pub fn log_command(&self, chat_id: i64, command: &str) {
        if !self.log_user_interactions {
            return;
        }

        info!(chat_id = chat_id, command = command, "Command received");
    }

    /// Log a failed turn at the level matching the error's severity
    pub fn log_error(&self, err: &FinBuddyError, context: &str, chat_id: i64) {
        let severity = err.severity();
        match severity {
            ErrorSeverity::Info => info!(chat_id, context, error = %err, "Turn rejected"),
            ErrorSeverity::Warning => warn!(chat_id, context, error = %err, "Turn degraded"),
            ErrorSeverity::Error | ErrorSeverity::Critical => error!(
                chat_id,
                context,
                severity = %severity,
                recoverable = err.is_recoverable(),
                error = %err,
                "Turn failed"
            ),
        }
    }

    /// Start timing one assistant turn
    pub fn track_turn(&self, chat_id: i64, source: &'static str) -> TurnTimer {
        TurnTimer {
            chat_id,
            source,
            slow_turn: self.slow_turn,
            started: Instant::now(),
        }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new(true, DEFAULT_SLOW_TURN)
    }
}

/// Timer for a single turn, reported once with its outcome
#[derive(Debug)]
pub struct TurnTimer {
    chat_id: i64,
    source: &'static str,
    slow_turn: Duration,
    started: Instant,
}

impl TurnTimer {
    /// Log the duration together with what the turn produced
    pub fn finish(self, reply: Option<&AssistantReply>) -> Duration {
        let elapsed = self.started.elapsed();
        let duration_ms = elapsed.as_millis() as u64;

        match reply {
            Some(reply) => debug!(
                chat_id = self.chat_id,
                source = self.source,
                intent = %reply.intent.name,
                messages = reply.messages.len(),
                duration_ms,
                "Turn completed"
            ),
            None => debug!(chat_id = self.chat_id, source = self.source, duration_ms, "Turn failed"),
        }

        if elapsed > self.slow_turn {
            warn!(
                chat_id = self.chat_id,
                source = self.source,
                duration_ms,
                threshold_ms = self.slow_turn.as_millis() as u64,
                "Slow turn detected"
            );
        }

        elapsed
    }
}
