//! Rate limiting middleware
//!
//! Per-chat rate limiting in front of the assistant pipeline, so a single
//! chat cannot flood the intent classifier or translation service.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use crate::config::RateLimitSettings;
use crate::utils::errors::{FinBuddyError, Result};

/// How often idle chats are dropped from the limiter
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Rate limiting middleware
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<DefaultKeyedRateLimiter<i64>>,
    enabled: bool,
    exempt_ids: Vec<i64>,
}

impl RateLimitMiddleware {
    /// Create a limiter allowing `requests_per_minute` with bursts of `burst_size`
    pub fn new(settings: &RateLimitSettings, enabled: bool, exempt_ids: Vec<i64>) -> Self {
        let per_minute = NonZeroU32::new(settings.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(settings.burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(per_minute).allow_burst(burst);

        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            enabled,
            exempt_ids,
        }
    }

    /// Check whether `chat_id` may send another message now
    pub fn check(&self, chat_id: i64) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.exempt_ids.contains(&chat_id) {
            debug!(chat_id = chat_id, "Chat exempt from rate limiting");
            return Ok(());
        }

        match self.limiter.check_key(&chat_id) {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(chat_id = chat_id, "Rate limit exceeded");
                Err(FinBuddyError::RateLimitExceeded)
            }
        }
    }

    /// Number of chats currently tracked
    pub fn tracked_chats(&self) -> usize {
        self.limiter.len()
    }

    /// Drop state for chats that are back at full quota
    pub fn cleanup_old_entries(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(remaining_entries = self.limiter.len(), "Cleaned up old rate limit entries");
    }

    /// Run [`Self::cleanup_old_entries`] every `period` in the background
    pub fn spawn_cleanup(&self, period: Duration) -> JoinHandle<()> {
        let middleware = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                middleware.cleanup_old_entries();
            }
        })
    }
}
