//! Data models module
//!
//! This module contains the product catalog and the per-turn data exchanged
//! with the dialogue host

pub mod product;
pub mod turn;

// Re-export commonly used models
pub use product::{Product, Topic};
pub use turn::{Entity, IntentPrediction, SlotEvent, TurnRequest};
