//! History command handler

use teloxide::{Bot, types::Message, prelude::*};
use crate::content::ContentStore;
use crate::handlers::user_language;
use crate::services::ServiceFactory;
use crate::state::HistoryEntry;
use crate::utils::errors::Result;
use crate::utils::helpers::{format_relative_time, truncate_text};

const SHOWN_ENTRIES: usize = 5;
const SHOWN_MESSAGE_CHARS: usize = 60;

/// Handle /history command
pub async fn handle_history(bot: Bot, msg: Message, services: &ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;
    let content = services.assistant.engine().content();
    let lang = user_language(content, msg.from.as_ref());

    let entries = services.assistant.history(chat_id.0, SHOWN_ENTRIES).await?;
    bot.send_message(chat_id, format_history(content, lang, &entries)).await?;
    Ok(())
}

/// Oldest first, one line per question
pub fn format_history(content: &ContentStore, lang: &str, entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return content.t("commands.history_empty", lang, None);
    }

    let mut lines = vec![content.t("commands.history_header", lang, None)];
    lines.extend(entries.iter().rev().map(|entry| {
        format!(
            "• {} ({})",
            truncate_text(&entry.user_message, SHOWN_MESSAGE_CHARS),
            format_relative_time(entry.timestamp)
        )
    }));
    lines.join("\n")
}
