//! Admin command handlers

use teloxide::{Bot, types::Message, prelude::*};
use tracing::{debug, info};
use crate::content::ContentStore;
use crate::handlers::user_language;
use crate::services::ServiceFactory;
use crate::state::DemoRequest;
use crate::state::conversation::{PRODUCT_FOCUS_KEY, USER_TYPE_KEY};
use crate::utils::errors::{FinBuddyError, Result};
use crate::utils::helpers::{format_relative_time, truncate_text};

const SHOWN_REQUESTS: usize = 10;
const SHOWN_MESSAGE_CHARS: usize = 60;

/// Handle /demos command - recent demo requests for the BillMart team
pub async fn handle_demos(bot: Bot, msg: Message, services: &ServiceFactory) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| FinBuddyError::InvalidInput("No user in message".to_string()))?;

    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;
    let content = services.assistant.engine().content();
    let lang = user_language(content, Some(user));

    debug!(user_id = user_id, chat_id = chat_id.0, "Processing /demos command");

    if !services.is_admin(user_id) {
        bot.send_message(chat_id, content.t("commands.admin_only", lang, None)).await?;
        return Ok(());
    }

    let requests = services.assistant.demo_requests(SHOWN_REQUESTS).await?;
    bot.send_message(chat_id, format_demo_requests(content, lang, &requests)).await?;

    info!(user_id = user_id, shown = requests.len(), "Admin listed demo requests");
    Ok(())
}

/// Newest first, one line per request
pub fn format_demo_requests(content: &ContentStore, lang: &str, requests: &[DemoRequest]) -> String {
    if requests.is_empty() {
        return content.t("commands.demos_empty", lang, None);
    }

    let mut lines = vec![content.t("commands.demos_header", lang, None)];
    lines.extend(requests.iter().map(|request| {
        let field = |key: &str| request.state.get(key).map(String::as_str).unwrap_or("unknown");
        format!(
            "• chat {} [{}/{}, {}] \"{}\" ({})",
            request.conversation_id,
            field(USER_TYPE_KEY),
            field(PRODUCT_FOCUS_KEY),
            request.language,
            truncate_text(&request.user_message, SHOWN_MESSAGE_CHARS),
            format_relative_time(request.timestamp)
        )
    }));
    lines.join("\n")
}
