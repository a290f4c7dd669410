//! Start and reset command handlers
//!
//! Both forget the stored conversation context and history. /start then greets the user
//! and offers the customer segments.

use teloxide::{Bot, types::Message, prelude::*};
use tracing::info;
use crate::handlers::{reply_language, send_assistant_reply, user_language};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Handle /start command
pub async fn handle_start(bot: Bot, msg: Message, services: &ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;
    let assistant = &services.assistant;

    assistant.reset(chat_id.0).await?;
    let reply = assistant
        .handle_intent(chat_id.0, "greet", reply_language(msg.from.as_ref()))
        .await?;
    send_assistant_reply(&bot, chat_id, &reply).await?;

    info!(chat_id = chat_id.0, "Conversation started");
    Ok(())
}

/// Handle /reset command
pub async fn handle_reset(bot: Bot, msg: Message, services: &ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;
    services.assistant.reset(chat_id.0).await?;

    let content = services.assistant.engine().content();
    let lang = user_language(content, msg.from.as_ref());
    bot.send_message(chat_id, content.t("commands.reset_done", lang, None)).await?;

    info!(chat_id = chat_id.0, "Conversation reset");
    Ok(())
}
