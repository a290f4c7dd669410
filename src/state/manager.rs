//! Conversation state manager
//!
//! Applies one inbound turn to the current state. Signals are resolved with
//! a single precedence rule for every field: an explicit intent beats an
//! extracted entity, which beats a keyword found in the message text. A field
//! with no signal keeps its previous value.

use crate::models::{Entity, Product};
use crate::utils::logging::log_state_transition;
use super::conversation::{ConversationState, FlatState, UserType};
use super::inference;

const USER_TYPE_ENTITY: &str = "user_type";
const PRODUCT_ENTITIES: [&str; 2] = ["product", "product_name"];

/// Which question to ask before answering product specific questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clarification {
    /// Who is the user: individual, business or lender
    Segment,
    /// Which product the user is interested in
    Product,
}

/// Tracks the context of one conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationStateManager {
    current_state: ConversationState,
}

impl ConversationStateManager {
    /// Manager holding a fresh state
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager resuming from a previously persisted state
    pub fn with_state(state: ConversationState) -> Self {
        Self { current_state: state }
    }

    /// Manager resuming from the host's flat session data
    pub fn from_flat(flat: &FlatState) -> Self {
        Self::with_state(ConversationState::from_flat(flat))
    }

    pub fn current_state(&self) -> &ConversationState {
        &self.current_state
    }

    pub fn into_state(self) -> ConversationState {
        self.current_state
    }

    /// Explicit full reset; the only way the segment returns to unknown
    pub fn reset(&mut self) {
        self.current_state = ConversationState::new();
    }

    /// Apply one turn and return the resulting state
    pub fn update_from_intent(
        &mut self,
        intent: &str,
        entities: &[Entity],
        message: &str,
    ) -> ConversationState {
        let intent = intent.trim();
        let tokens = inference::tokenize(message);
        let previous = self.current_state.clone();

        let user_type = inference::user_type_for_intent(intent)
            .or_else(|| user_type_from_entities(entities))
            .or_else(|| inference::infer_user_type(&tokens));
        if let Some(user_type) = user_type {
            self.current_state.user_type = user_type;
        }

        let product = inference::product_for_intent(intent)
            .or_else(|| product_from_entities(entities))
            .or_else(|| inference::infer_product(&tokens));
        if let Some(product) = product {
            self.current_state.product_focus = Some(product);
        }

        if let Some(phase) = inference::phase_for_intent(intent) {
            self.current_state.conversation_phase = phase;
        }

        self.current_state.last_intent = intent.to_string();

        log_state_transition(intent, &previous, &self.current_state);
        self.current_state.clone()
    }

    /// True until both the segment and the product are known
    pub fn should_ask_for_clarification(&self) -> bool {
        self.clarification_needed().is_some()
    }

    /// The clarifying question to ask next, if any
    pub fn clarification_needed(&self) -> Option<Clarification> {
        if !self.current_state.user_type.is_known() {
            Some(Clarification::Segment)
        } else if self.current_state.product_focus.is_none() {
            Some(Clarification::Product)
        } else {
            None
        }
    }
}

fn user_type_from_entities(entities: &[Entity]) -> Option<UserType> {
    entities
        .iter()
        .filter(|entity| entity.entity == USER_TYPE_ENTITY)
        .filter_map(Entity::value_str)
        .filter_map(UserType::parse)
        .find(UserType::is_known)
}

fn product_from_entities(entities: &[Entity]) -> Option<Product> {
    entities
        .iter()
        .filter(|entity| PRODUCT_ENTITIES.contains(&entity.entity.as_str()))
        .filter_map(Entity::value_str)
        .find_map(Product::from_alias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::conversation::ConversationPhase;

    #[test]
    fn test_declaration_sets_segment_and_product() {
        let mut manager = ConversationStateManager::new();
        let state = manager.update_from_intent("declare_gig_worker", &[], "I'm a freelancer");

        assert_eq!(state.user_type, UserType::Individual);
        assert_eq!(state.product_focus, Some(Product::GigCash));
        assert_eq!(state.conversation_phase, ConversationPhase::Exploring);
        assert_eq!(state.last_intent, "declare_gig_worker");
    }

    #[test]
    fn test_explicit_intent_beats_entity_and_keywords() {
        let mut manager = ConversationStateManager::new();
        let entities = vec![Entity::new("product", "term loan")];
        let state = manager.update_from_intent("ask_gigcash_info", &entities, "need a salary advance");
        assert_eq!(state.product_focus, Some(Product::GigCash));
    }

    #[test]
    fn test_entity_beats_keywords() {
        let mut manager = ConversationStateManager::new();
        let entities = vec![
            Entity::new("product_name", "Supply Chain Finance"),
            Entity::new("user_type", "lender"),
        ];
        let state = manager.update_from_intent("inform", &entities, "I am a freelancer on uber");
        assert_eq!(state.product_focus, Some(Product::Scf));
        assert_eq!(state.user_type, UserType::Lender);
    }

    #[test]
    fn test_unknown_entities_fall_back_to_keywords() {
        let mut manager = ConversationStateManager::new();
        let entities = vec![
            Entity::new("product", "mystery product"),
            Entity::new("user_type", "unknown"),
            Entity::new("amount", 5000),
        ];
        let state = manager.update_from_intent("inform", &entities, "our company needs invoice discounting");
        assert_eq!(state.product_focus, Some(Product::Scf));
        assert_eq!(state.user_type, UserType::Business);
    }

    #[test]
    fn test_unrecognized_turn_keeps_fields() {
        let mut manager = ConversationStateManager::new();
        manager.update_from_intent("declare_business", &[], "");
        manager.update_from_intent("ask_term_loan", &[], "");
        let state = manager.update_from_intent("chitchat", &[], "what a lovely day");

        assert_eq!(state.user_type, UserType::Business);
        assert_eq!(state.product_focus, Some(Product::TermLoan));
        assert_eq!(state.conversation_phase, ConversationPhase::Exploring);
        assert_eq!(state.last_intent, "chitchat");
    }

    #[test]
    fn test_new_product_signal_replaces_focus() {
        let mut manager = ConversationStateManager::new();
        manager.update_from_intent("ask_gigcash_info", &[], "");
        let state = manager.update_from_intent("inform", &[], "actually we need a lease rental loan");
        assert_eq!(state.product_focus, Some(Product::Lrd));
    }

    #[test]
    fn test_phase_updates() {
        let mut manager = ConversationStateManager::new();
        assert_eq!(
            manager.update_from_intent("ask_process", &[], "").conversation_phase,
            ConversationPhase::Process
        );
        assert_eq!(
            manager.update_from_intent("greet", &[], "hi").conversation_phase,
            ConversationPhase::Process
        );
        assert_eq!(
            manager.update_from_intent("ask_fees", &[], "").conversation_phase,
            ConversationPhase::Fees
        );
    }

    #[test]
    fn test_empty_input_is_total() {
        let mut manager = ConversationStateManager::new();
        let state = manager.update_from_intent("", &[], "");
        assert_eq!(state, ConversationState::new());

        let state = manager.update_from_intent("   ", &[], "   ");
        assert_eq!(state.last_intent, "");
    }

    #[test]
    fn test_clarification_gate() {
        let mut manager = ConversationStateManager::new();
        assert!(manager.should_ask_for_clarification());
        assert_eq!(manager.clarification_needed(), Some(Clarification::Segment));

        manager.update_from_intent("declare_business", &[], "");
        assert!(manager.should_ask_for_clarification());
        assert_eq!(manager.clarification_needed(), Some(Clarification::Product));

        manager.update_from_intent("ask_imark_info", &[], "");
        assert!(!manager.should_ask_for_clarification());
        assert_eq!(manager.clarification_needed(), None);
    }

    #[test]
    fn test_clarification_gate_product_first() {
        let mut manager = ConversationStateManager::new();
        manager.update_from_intent("ask_empcash_info", &[], "");
        assert_eq!(manager.clarification_needed(), Some(Clarification::Segment));

        manager.update_from_intent("inform", &[], "I'm a salaried employee");
        assert!(!manager.should_ask_for_clarification());
    }

    #[test]
    fn test_reset() {
        let mut manager = ConversationStateManager::new();
        manager.update_from_intent("declare_lender", &[], "");
        manager.reset();
        assert_eq!(manager.current_state(), &ConversationState::new());
    }

    #[test]
    fn test_resume_from_flat() {
        let mut original = ConversationStateManager::new();
        original.update_from_intent("declare_hospital", &[], "");
        let flat = original.current_state().to_flat();

        let resumed = ConversationStateManager::from_flat(&flat);
        assert_eq!(resumed.into_state(), original.into_state());
    }
}
