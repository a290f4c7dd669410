//! Turn contract model
//!
//! Data exchanged with the dialogue host on every inbound message: the
//! classified intent, extracted entities and the slot events returned
//! after the turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity extracted from a user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(alias = "type")]
    pub entity: String,
    #[serde(default)]
    pub value: Value,
}

impl Entity {
    pub fn new(entity: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            entity: entity.into(),
            value: value.into(),
        }
    }

    /// Entity value when it is a non-empty string
    pub fn value_str(&self) -> Option<&str> {
        self.value
            .as_str()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Intent label with classifier confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPrediction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
}

impl IntentPrediction {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// One inbound turn as delivered by the host
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TurnRequest {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub text: String,
}

impl TurnRequest {
    pub fn new(intent: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            entities: Vec::new(),
            text: text.into(),
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }
}

/// State mutation command returned to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SlotEvent {
    #[serde(rename = "slot")]
    SlotSet { name: String, value: Value },
}

impl SlotEvent {
    pub fn slot_set(name: impl Into<String>, value: impl Into<Value>) -> Self {
        SlotEvent::SlotSet {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SlotEvent::SlotSet { name, .. } => name,
        }
    }
}
