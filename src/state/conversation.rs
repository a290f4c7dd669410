//! Conversation state value
//!
//! `ConversationState` is a plain value: who the user is, which product the
//! conversation centers on, the funnel phase and the last intent. It is
//! persisted by the host between turns in a flat string map, and is rebuilt
//! field by field so one bad field never discards the others.

use std::collections::BTreeMap;
use std::fmt;
use serde::Serialize;
use serde_json::{json, Value};
use crate::models::Product;

/// Flat key-value form of a conversation state
pub type FlatState = BTreeMap<String, String>;

pub const USER_TYPE_KEY: &str = "user_type";
pub const PRODUCT_FOCUS_KEY: &str = "product_focus";
pub const CONVERSATION_PHASE_KEY: &str = "conversation_phase";
pub const LAST_INTENT_KEY: &str = "last_intent";

/// Customer segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Unknown,
    Individual,
    Business,
    Lender,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Unknown => "unknown",
            UserType::Individual => "individual",
            UserType::Business => "business",
            UserType::Lender => "lender",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "unknown" => Some(UserType::Unknown),
            "individual" => Some(UserType::Individual),
            "business" => Some(UserType::Business),
            "lender" => Some(UserType::Lender),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != UserType::Unknown
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Funnel stage, used to pick response variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    #[default]
    Initial,
    Exploring,
    Process,
    Eligibility,
    Fees,
    Documents,
    Collateral,
    Disbursement,
}

impl ConversationPhase {
    pub const ALL: [ConversationPhase; 8] = [
        ConversationPhase::Initial,
        ConversationPhase::Exploring,
        ConversationPhase::Process,
        ConversationPhase::Eligibility,
        ConversationPhase::Fees,
        ConversationPhase::Documents,
        ConversationPhase::Collateral,
        ConversationPhase::Disbursement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationPhase::Initial => "initial",
            ConversationPhase::Exploring => "exploring",
            ConversationPhase::Process => "process",
            ConversationPhase::Eligibility => "eligibility",
            ConversationPhase::Fees => "fees",
            ConversationPhase::Documents => "documents",
            ConversationPhase::Collateral => "collateral",
            ConversationPhase::Disbursement => "disbursement",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-conversation context
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConversationState {
    pub user_type: UserType,
    pub product_focus: Option<Product>,
    pub conversation_phase: ConversationPhase,
    pub last_intent: String,
}

impl ConversationState {
    /// Fresh state for a new conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat representation; `product_focus` is omitted when absent
    pub fn to_flat(&self) -> FlatState {
        let mut flat = FlatState::new();
        flat.insert(USER_TYPE_KEY.to_string(), self.user_type.as_str().to_string());
        if let Some(product) = self.product_focus {
            flat.insert(PRODUCT_FOCUS_KEY.to_string(), product.id().to_string());
        }
        flat.insert(
            CONVERSATION_PHASE_KEY.to_string(),
            self.conversation_phase.as_str().to_string(),
        );
        flat.insert(LAST_INTENT_KEY.to_string(), self.last_intent.clone());
        flat
    }

    /// Rebuild from a flat map, defaulting each missing or invalid field
    pub fn from_flat(flat: &FlatState) -> Self {
        Self::from_fields(|key| flat.get(key).map(String::as_str))
    }

    /// JSON object form used for the host's `conversation_state` slot
    pub fn to_json(&self) -> Value {
        json!({
            USER_TYPE_KEY: self.user_type.as_str(),
            PRODUCT_FOCUS_KEY: self.product_focus.map(|product| product.id()),
            CONVERSATION_PHASE_KEY: self.conversation_phase.as_str(),
            LAST_INTENT_KEY: self.last_intent,
        })
    }

    /// Rebuild from the host slot value; anything that is not an object
    /// yields a fresh state
    pub fn from_json(value: &Value) -> Self {
        match value.as_object() {
            Some(object) => Self::from_fields(|key| object.get(key).and_then(Value::as_str)),
            None => Self::default(),
        }
    }

    fn from_fields<'a>(field: impl Fn(&str) -> Option<&'a str>) -> Self {
        Self {
            user_type: field(USER_TYPE_KEY)
                .and_then(UserType::parse)
                .unwrap_or_default(),
            product_focus: field(PRODUCT_FOCUS_KEY).and_then(Product::from_id),
            conversation_phase: field(CONVERSATION_PHASE_KEY)
                .and_then(ConversationPhase::parse)
                .unwrap_or_default(),
            last_intent: field(LAST_INTENT_KEY).unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user_type={} product_focus={} phase={} last_intent={}",
            self.user_type,
            self.product_focus.map(|product| product.id()).unwrap_or("none"),
            self.conversation_phase,
            self.last_intent
        )
    }
}
