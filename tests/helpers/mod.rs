//! Test helpers module
//!
//! Mock NLU and translation servers plus fixtures for building an assistant
//! against in-memory storage.

#![allow(dead_code)]

pub mod nlu_mock;
pub mod translation_mock;
pub mod test_data;

#[allow(unused_imports)]
pub use nlu_mock::*;
#[allow(unused_imports)]
pub use translation_mock::*;
#[allow(unused_imports)]
pub use test_data::*;
