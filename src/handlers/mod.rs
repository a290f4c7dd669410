//! Bot handlers module
//!
//! This module contains all Telegram bot handlers organized by type:
//! - Command handlers for bot commands
//! - Callback handlers for quick-reply buttons
//! - Message handlers for free-text questions

pub mod commands;
pub mod callbacks;
pub mod messages;

use teloxide::{Bot, prelude::*, types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, User}};
use crate::content::ContentStore;
use crate::dialogue::QuickReply;
use crate::services::{AssistantReply, Language};
use crate::utils::errors::Result;

// Re-export commonly used handler functions
pub use commands::{handle_command, Command};
pub use callbacks::handle_callback_query;
pub use messages::handle_message;

/// Callback data prefix for buttons that trigger an intent
pub const INTENT_CALLBACK_PREFIX: &str = "intent";

/// Callback data for a quick reply, e.g. `intent:declare_business`
pub fn intent_callback_data(intent: &str) -> String {
    format!("{}:{}", INTENT_CALLBACK_PREFIX, intent)
}

/// One button per row, in the order given
pub fn quick_reply_keyboard(quick_replies: &[QuickReply]) -> InlineKeyboardMarkup {
    let rows = quick_replies
        .iter()
        .map(|reply| vec![InlineKeyboardButton::callback(reply.label.clone(), intent_callback_data(&reply.intent))])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Send every reply message; buttons go under the last one
pub async fn send_assistant_reply(bot: &Bot, chat_id: ChatId, reply: &AssistantReply) -> Result<()> {
    let last = reply.messages.len().saturating_sub(1);
    for (index, message) in reply.messages.iter().enumerate() {
        let request = bot.send_message(chat_id, message.clone());
        if index == last && !reply.quick_replies.is_empty() {
            request.reply_markup(quick_reply_keyboard(&reply.quick_replies)).await?;
        } else {
            request.await?;
        }
    }
    Ok(())
}

/// Content language for fixed texts, from the user's Telegram settings
pub fn user_language<'a>(content: &'a ContentStore, user: Option<&User>) -> &'a str {
    user.and_then(|user| user.language_code.as_deref())
        .and_then(|code| {
            content
                .supported_languages()
                .iter()
                .find(|supported| supported.as_str() == code && content.has_language(code))
        })
        .map(String::as_str)
        .unwrap_or_else(|| content.default_language())
}

/// Language for button-triggered turns, from the user's Telegram settings
pub fn reply_language(user: Option<&User>) -> Language {
    user.and_then(|user| user.language_code.as_deref())
        .and_then(|code| code.split('-').next())
        .and_then(Language::from_code)
        .unwrap_or(Language::English)
}
