//! Help command handler

use teloxide::{Bot, types::Message, prelude::*};
use crate::handlers::user_language;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Handle /help command
pub async fn handle_help(bot: Bot, msg: Message, services: &ServiceFactory) -> Result<()> {
    let content = services.assistant.engine().content();
    let lang = user_language(content, msg.from.as_ref());

    bot.send_message(msg.chat.id, content.t("commands.help", lang, None)).await?;
    Ok(())
}
