//! FinBuddy Telegram Bot
//!
//! A customer-support assistant for a lending marketplace. This library
//! tracks per-conversation context (customer segment, product focus, funnel
//! phase), picks replies from static content and talks to external intent
//! classification and translation services.

#![allow(non_snake_case)]

pub mod config;
pub mod content;
pub mod dialogue;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{FinBuddyError, Result};

// Re-export main components for easy access
pub use content::ContentStore;
pub use dialogue::DialogueEngine;
pub use services::ServiceFactory;
pub use state::{ConversationState, ConversationStateManager, StateStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
