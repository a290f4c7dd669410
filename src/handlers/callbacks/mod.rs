//! Callback query handlers module
//!
//! Quick-reply buttons carry `intent:<name>` data and are processed as if the
//! user had sent that intent.

use teloxide::{Bot, types::{CallbackQuery, ChatId}, prelude::*};
use tracing::{debug, warn};
use crate::handlers::{reply_language, send_assistant_reply, user_language, INTENT_CALLBACK_PREFIX};
use crate::handlers::messages::reply_to_error;
use crate::middleware::{LoggingMiddleware, RateLimitMiddleware};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: &ServiceFactory,
    rate_limiter: &RateLimitMiddleware,
    logging: &LoggingMiddleware,
) -> Result<()> {
    logging.log_callback(&query);

    // Answer the callback query first to remove loading state
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, callback_id = %query.id, "Failed to answer callback query");
    }

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Some(intent) = parse_intent_callback(data) else {
        warn!(data = %data, "Invalid callback data format");
        return Ok(());
    };

    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(query.from.id.0 as i64));
    debug!(chat_id = chat_id.0, intent = intent, "Routing quick reply");
    let lang = user_language(services.assistant.engine().content(), Some(&query.from));

    if let Err(e) = rate_limiter.check(chat_id.0) {
        return reply_to_error(&bot, chat_id, services, lang, &e).await;
    }

    let timer = logging.track_turn(chat_id.0, "quick_reply");
    let result = services
        .assistant
        .handle_intent(chat_id.0, intent, reply_language(Some(&query.from)))
        .await;
    timer.finish(result.as_ref().ok());

    match result {
        Ok(reply) => send_assistant_reply(&bot, chat_id, &reply).await,
        Err(e) => {
            logging.log_error(&e, "quick reply", chat_id.0);
            reply_to_error(&bot, chat_id, services, lang, &e).await
        }
    }
}

/// Intent name from `intent:<name>` callback data
pub fn parse_intent_callback(data: &str) -> Option<&str> {
    let mut parts = data.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(INTENT_CALLBACK_PREFIX), Some(intent), None) if !intent.is_empty() => Some(intent),
        _ => None,
    }
}
