//! Static content module
//!
//! Product texts, prompts and button labels, kept as JSON data files rather
//! than code.

pub mod store;

pub use store::{ContentStore, ContentParams, ContentStats, LanguageStats};
