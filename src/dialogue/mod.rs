//! Dialogue module
//!
//! Turns classified messages into replies and state updates.

pub mod engine;
pub mod responder;

pub use engine::{DialogueEngine, TurnOutcome, CONVERSATION_STATE_SLOT, DEMO_INTENT, END_CHAT_INTENTS, RESET_INTENT};
pub use responder::{QuickReply, Reply};
