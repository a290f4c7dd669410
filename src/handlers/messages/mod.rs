//! Message handlers module
//!
//! Free-text questions go through rate limiting and then the assistant
//! pipeline. Failures are answered with a fixed apology.

use teloxide::{Bot, types::{ChatId, Message}, prelude::*};
use tracing::debug;
use crate::handlers::{send_assistant_reply, user_language};
use crate::middleware::{LoggingMiddleware, RateLimitMiddleware};
use crate::services::ServiceFactory;
use crate::utils::errors::{FinBuddyError, Result};

/// Handle incoming text messages
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    services: &ServiceFactory,
    rate_limiter: &RateLimitMiddleware,
    logging: &LoggingMiddleware,
) -> Result<()> {
    logging.log_message(&msg);

    let Some(text) = msg.text() else {
        debug!(chat_id = msg.chat.id.0, "Ignoring non-text message");
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let lang = user_language(services.assistant.engine().content(), msg.from.as_ref());

    if let Err(e) = rate_limiter.check(chat_id.0) {
        return reply_to_error(&bot, chat_id, services, lang, &e).await;
    }

    let timer = logging.track_turn(chat_id.0, "message");
    let result = services.assistant.handle_text(chat_id.0, text).await;
    timer.finish(result.as_ref().ok());

    match result {
        Ok(reply) => send_assistant_reply(&bot, chat_id, &reply).await,
        Err(e) => {
            logging.log_error(&e, "assistant turn", chat_id.0);
            reply_to_error(&bot, chat_id, services, lang, &e).await
        }
    }
}

/// Tell the user something went wrong without leaking details
pub async fn reply_to_error(
    bot: &Bot,
    chat_id: ChatId,
    services: &ServiceFactory,
    lang: &str,
    error: &FinBuddyError,
) -> Result<()> {
    let content = services.assistant.engine().content();
    bot.send_message(chat_id, content.t(error_message_key(error), lang, None)).await?;
    Ok(())
}

/// Content key of the text shown for `error`
pub fn error_message_key(error: &FinBuddyError) -> &'static str {
    match error {
        FinBuddyError::RateLimitExceeded => "commands.rate_limited",
        FinBuddyError::Redis(_) => "prompts.technical_difficulty",
        _ => "prompts.error",
    }
}
