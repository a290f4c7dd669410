//! Middleware module
//!
//! This module contains middleware for request processing

pub mod logging;
pub mod rate_limit;

// Re-export commonly used middleware
pub use logging::{LoggingMiddleware, TurnTimer};
pub use rate_limit::RateLimitMiddleware;
