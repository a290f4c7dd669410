//! Command handlers module
//!
//! This module contains handlers for all bot commands like /start, /help, etc.

pub mod admin;
pub mod start;
pub mod help;
pub mod history;

use teloxide::{Bot, types::Message, utils::command::BotCommands};
use crate::middleware::LoggingMiddleware;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "FinBuddy commands:")]
pub enum Command {
    #[command(description = "Start over and see our products")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Forget this conversation's context")]
    Reset,
    #[command(description = "Show your recent questions")]
    History,
    #[command(hide)]
    Demos,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Reset => "reset",
            Command::History => "history",
            Command::Demos => "demos",
        }
    }
}

/// Main command dispatcher
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: &ServiceFactory,
    logging: &LoggingMiddleware,
) -> Result<()> {
    logging.log_command(msg.chat.id.0, cmd.name());

    match cmd {
        Command::Start => start::handle_start(bot, msg, services).await,
        Command::Help => help::handle_help(bot, msg, services).await,
        Command::Reset => start::handle_reset(bot, msg, services).await,
        Command::History => history::handle_history(bot, msg, services).await,
        Command::Demos => admin::handle_demos(bot, msg, services).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "finbuddy_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/history", "finbuddy_bot").unwrap(), Command::History);
        assert_eq!(Command::parse("/demos", "finbuddy_bot").unwrap(), Command::Demos);
        assert!(!Command::descriptions().to_string().contains("demos"));
        assert!(Command::parse("/events", "finbuddy_bot").is_err());
    }
}
