//! State management module
//!
//! This module tracks per-conversation context (segment, product focus,
//! funnel phase) and persists it between turns

pub mod conversation;
pub mod inference;
pub mod manager;
pub mod storage;

// Re-export commonly used state components
pub use conversation::{ConversationPhase, ConversationState, FlatState, UserType};
pub use manager::{Clarification, ConversationStateManager};
pub use storage::{DemoRequest, HistoryEntry, MemoryStateStore, StateStorage, StateStore};
