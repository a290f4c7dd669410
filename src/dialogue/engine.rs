//! Turn-level dialogue engine
//!
//! Restores the conversation state handed over by the host, applies one turn,
//! picks the reply and returns the slot events the host must persist.

use std::sync::Arc;
use tracing::debug;
use crate::content::ContentStore;
use crate::models::{SlotEvent, TurnRequest};
use crate::state::conversation::PRODUCT_FOCUS_KEY;
use crate::state::inference::tokenize;
use crate::state::{Clarification, ConversationState, ConversationStateManager};
use super::responder::{self, QuickReply, ResponseContext};

/// Slot carrying the serialized conversation state
pub const CONVERSATION_STATE_SLOT: &str = "conversation_state";

/// Intent that starts the qualification funnel from scratch
pub const RESET_INTENT: &str = "ask_loan_need";

/// Intent asking for a callback from the sales team
pub const DEMO_INTENT: &str = "request_demo";

/// Intents that close the chat and forget its history
pub const END_CHAT_INTENTS: &[&str] = &["end_chat", "goodbye"];

/// Result of processing one turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub state: ConversationState,
    pub events: Vec<SlotEvent>,
    pub messages: Vec<String>,
    pub quick_replies: Vec<QuickReply>,
    pub clarification: Option<Clarification>,
}

/// Stateless turn processor; all conversation context travels in and out
#[derive(Debug, Clone)]
pub struct DialogueEngine {
    content: Arc<ContentStore>,
}

impl DialogueEngine {
    pub fn new(content: Arc<ContentStore>) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// Process one turn against the previously persisted state
    pub fn process_turn(
        &self,
        previous: Option<&ConversationState>,
        request: &TurnRequest,
        lang: &str,
    ) -> TurnOutcome {
        let mut manager = previous
            .cloned()
            .map(ConversationStateManager::with_state)
            .unwrap_or_default();

        let intent = request.intent.trim();
        if intent == RESET_INTENT {
            debug!("Resetting conversation state on {}", RESET_INTENT);
            manager.reset();
        }

        let state = manager.update_from_intent(intent, &request.entities, &request.text);
        let clarification = manager.clarification_needed();
        let tokens = tokenize(&request.text);
        let ctx = ResponseContext {
            content: &self.content,
            lang,
            intent,
            tokens: &tokens,
            state: &state,
        };
        let reply = responder::apply_segment_gate(&ctx, responder::respond(&ctx), clarification);

        TurnOutcome {
            events: slot_events(&state),
            clarification,
            messages: reply.messages,
            quick_replies: reply.quick_replies,
            state,
        }
    }
}

/// The full state first, then `product_focus` on its own when set
pub fn slot_events(state: &ConversationState) -> Vec<SlotEvent> {
    let mut events = vec![SlotEvent::slot_set(CONVERSATION_STATE_SLOT, state.to_json())];
    if let Some(product) = state.product_focus {
        events.push(SlotEvent::slot_set(PRODUCT_FOCUS_KEY, product.id()));
    }
    events
}
