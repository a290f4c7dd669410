//! State storage implementation
//!
//! Persists conversation state and recent exchanges between turns. Redis
//! keeps each state as a hash of its flat fields and the history as a capped
//! list, both expiring after the configured TTL; an in-memory store with the
//! same contract backs tests and runs without Redis. Demo requests are kept
//! in a capped list that does not expire.

use std::collections::{HashMap, VecDeque};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn, error};
use crate::utils::errors::Result;
use crate::config::RedisConfig;
use super::conversation::{ConversationState, FlatState};

/// One user message and the assistant's reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub bot_response: String,
    pub language: String,
    pub intent: String,
    pub confidence: f32,
}

/// Demo requests kept for team follow-up
pub const DEMO_REQUEST_LIMIT: usize = 500;

/// A user asked for a demo; the team calls back using this record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoRequest {
    pub conversation_id: i64,
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub language: String,
    /// Flat conversation state at the time of the request
    pub state: FlatState,
    /// Exchanges before the request, newest first
    pub conversation_history: Vec<HistoryEntry>,
}

/// Persistence contract for per-conversation data
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state, `None` on the first turn
    async fn load_state(&self, conversation_id: i64) -> Result<Option<ConversationState>>;

    /// Replace the persisted state
    async fn save_state(&self, conversation_id: i64, state: &ConversationState) -> Result<()>;

    async fn delete_state(&self, conversation_id: i64) -> Result<()>;

    /// Record an exchange, dropping the oldest beyond the history limit
    async fn append_history(&self, conversation_id: i64, entry: &HistoryEntry) -> Result<()>;

    /// Most recent exchanges, newest first
    async fn history(&self, conversation_id: i64, limit: usize) -> Result<Vec<HistoryEntry>>;

    async fn clear_history(&self, conversation_id: i64) -> Result<()>;

    /// Record a demo request, dropping the oldest beyond [`DEMO_REQUEST_LIMIT`]
    async fn save_demo_request(&self, request: &DemoRequest) -> Result<()>;

    /// Most recent demo requests, newest first
    async fn demo_requests(&self, limit: usize) -> Result<Vec<DemoRequest>>;
}

/// Redis-based state storage
#[derive(Clone)]
pub struct StateStorage {
    /// Redis connection manager
    connection_manager: redis::aio::ConnectionManager,
    /// Redis configuration
    config: RedisConfig,
}

impl StateStorage {
    /// Create a new state storage instance
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn state_key(&self, conversation_id: i64) -> String {
        format!("{}state:{}", self.config.prefix, conversation_id)
    }

    fn history_key(&self, conversation_id: i64) -> String {
        format!("{}history:{}", self.config.prefix, conversation_id)
    }

    fn demo_requests_key(&self) -> String {
        format!("{}demo_requests", self.config.prefix)
    }
}

#[async_trait]
impl StateStore for StateStorage {
    async fn load_state(&self, conversation_id: i64) -> Result<Option<ConversationState>> {
        let key = self.state_key(conversation_id);
        let mut conn = self.connection_manager.clone();

        let fields: HashMap<String, String> = match conn.hgetall(&key).await {
            Ok(fields) => fields,
            Err(e) => {
                error!(conversation_id, error = %e, "Failed to load state from Redis");
                return Err(e.into());
            }
        };

        if fields.is_empty() {
            debug!(conversation_id, "No state found in Redis");
            return Ok(None);
        }

        let flat: FlatState = fields.into_iter().collect();
        let state = ConversationState::from_flat(&flat);
        debug!(conversation_id, state = %state, "State loaded from Redis");
        Ok(Some(state))
    }

    async fn save_state(&self, conversation_id: i64, state: &ConversationState) -> Result<()> {
        let key = self.state_key(conversation_id);
        let fields: Vec<(String, String)> = state.to_flat().into_iter().collect();
        let mut conn = self.connection_manager.clone();

        let result: redis::RedisResult<()> = redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, fields.as_slice())
            .ignore()
            .expire(&key, self.config.ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                debug!(conversation_id, ttl_seconds = self.config.ttl_seconds, "State saved to Redis");
                Ok(())
            }
            Err(e) => {
                error!(conversation_id, error = %e, "Failed to save state to Redis");
                Err(e.into())
            }
        }
    }

    async fn delete_state(&self, conversation_id: i64) -> Result<()> {
        let key = self.state_key(conversation_id);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&key).await?;
        debug!(conversation_id, deleted, "Deleted conversation state");
        Ok(())
    }

    async fn append_history(&self, conversation_id: i64, entry: &HistoryEntry) -> Result<()> {
        let key = self.history_key(conversation_id);
        let serialized = serde_json::to_string(entry)?;
        let limit = self.config.history_limit.max(1) as isize;
        let mut conn = self.connection_manager.clone();

        let _: () = redis::pipe()
            .atomic()
            .lpush(&key, serialized)
            .ignore()
            .ltrim(&key, 0, limit - 1)
            .ignore()
            .expire(&key, self.config.ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn history(&self, conversation_id: i64, limit: usize) -> Result<Vec<HistoryEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let key = self.history_key(conversation_id);
        let mut conn = self.connection_manager.clone();
        let raw: Vec<String> = conn.lrange(&key, 0, limit as isize - 1).await?;

        let entries = raw
            .iter()
            .filter_map(|data| match serde_json::from_str::<HistoryEntry>(data) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(conversation_id, error = %e, "Skipping malformed history entry");
                    None
                }
            })
            .collect();

        Ok(entries)
    }

    async fn clear_history(&self, conversation_id: i64) -> Result<()> {
        let key = self.history_key(conversation_id);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&key).await?;
        debug!(conversation_id, deleted, "Cleared conversation history");
        Ok(())
    }

    async fn save_demo_request(&self, request: &DemoRequest) -> Result<()> {
        let key = self.demo_requests_key();
        let serialized = serde_json::to_string(request)?;
        let mut conn = self.connection_manager.clone();

        let _: () = redis::pipe()
            .atomic()
            .lpush(&key, serialized)
            .ignore()
            .ltrim(&key, 0, DEMO_REQUEST_LIMIT as isize - 1)
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(conversation_id = request.conversation_id, "Demo request saved to Redis");
        Ok(())
    }

    async fn demo_requests(&self, limit: usize) -> Result<Vec<DemoRequest>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let key = self.demo_requests_key();
        let mut conn = self.connection_manager.clone();
        let raw: Vec<String> = conn.lrange(&key, 0, limit as isize - 1).await?;

        Ok(raw
            .iter()
            .filter_map(|data| match serde_json::from_str::<DemoRequest>(data) {
                Ok(request) => Some(request),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed demo request");
                    None
                }
            })
            .collect())
    }
}

impl std::fmt::Debug for StateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Longest TTL honoured in memory, ten years
const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 3600;

/// Value with the moment it stops being visible
#[derive(Debug)]
struct Expiring<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> Expiring<T> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// In-process store with the same semantics as [`StateStorage`]
///
/// States and histories expire after the configured TTL; expired entries
/// read as absent and are pruned on the next write.
#[derive(Debug)]
pub struct MemoryStateStore {
    states: RwLock<HashMap<i64, Expiring<FlatState>>>,
    history: RwLock<HashMap<i64, Expiring<VecDeque<HistoryEntry>>>>,
    demo_requests: RwLock<VecDeque<DemoRequest>>,
    history_limit: usize,
    ttl: Duration,
}

impl MemoryStateStore {
    pub fn new(config: &RedisConfig) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            history: RwLock::new(HashMap::new()),
            demo_requests: RwLock::new(VecDeque::new()),
            history_limit: config.history_limit.max(1),
            ttl: Duration::seconds(config.ttl_seconds.min(MAX_TTL_SECONDS) as i64),
        }
    }

    fn expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.ttl
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new(&RedisConfig::default())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_state(&self, conversation_id: i64) -> Result<Option<ConversationState>> {
        let states = self.states.read().await;
        Ok(states
            .get(&conversation_id)
            .filter(|entry| entry.is_live(Utc::now()))
            .map(|entry| ConversationState::from_flat(&entry.value)))
    }

    async fn save_state(&self, conversation_id: i64, state: &ConversationState) -> Result<()> {
        let now = Utc::now();
        let mut states = self.states.write().await;
        states.retain(|_, entry| entry.is_live(now));
        states.insert(
            conversation_id,
            Expiring {
                value: state.to_flat(),
                expires_at: self.expiry(now),
            },
        );
        Ok(())
    }

    async fn delete_state(&self, conversation_id: i64) -> Result<()> {
        self.states.write().await.remove(&conversation_id);
        Ok(())
    }

    async fn append_history(&self, conversation_id: i64, entry: &HistoryEntry) -> Result<()> {
        let now = Utc::now();
        let mut history = self.history.write().await;
        history.retain(|_, entries| entries.is_live(now));

        let entries = history.entry(conversation_id).or_insert_with(|| Expiring {
            value: VecDeque::new(),
            expires_at: now,
        });
        entries.value.push_front(entry.clone());
        entries.value.truncate(self.history_limit);
        entries.expires_at = self.expiry(now);
        Ok(())
    }

    async fn history(&self, conversation_id: i64, limit: usize) -> Result<Vec<HistoryEntry>> {
        let history = self.history.read().await;
        Ok(history
            .get(&conversation_id)
            .filter(|entries| entries.is_live(Utc::now()))
            .map(|entries| entries.value.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn clear_history(&self, conversation_id: i64) -> Result<()> {
        self.history.write().await.remove(&conversation_id);
        Ok(())
    }

    async fn save_demo_request(&self, request: &DemoRequest) -> Result<()> {
        let mut requests = self.demo_requests.write().await;
        requests.push_front(request.clone());
        requests.truncate(DEMO_REQUEST_LIMIT);
        Ok(())
    }

    async fn demo_requests(&self, limit: usize) -> Result<Vec<DemoRequest>> {
        let requests = self.demo_requests.read().await;
        Ok(requests.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::state::conversation::{ConversationPhase, UserType};

    fn entry(message: &str) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc::now(),
            user_message: message.to_string(),
            bot_response: format!("reply to {}", message),
            language: "en".to_string(),
            intent: "greet".to_string(),
            confidence: 0.9,
        }
    }

    fn config(history_limit: usize, ttl_seconds: u64) -> RedisConfig {
        RedisConfig {
            history_limit,
            ttl_seconds,
            ..RedisConfig::default()
        }
    }

    #[tokio::test]
    async fn test_memory_state_save_load() {
        let store = MemoryStateStore::default();
        assert!(store.load_state(1).await.unwrap().is_none());

        let state = ConversationState {
            user_type: UserType::Individual,
            product_focus: Some(Product::EmpCash),
            conversation_phase: ConversationPhase::Fees,
            last_intent: "ask_fees".to_string(),
        };
        store.save_state(1, &state).await.unwrap();

        assert_eq!(store.load_state(1).await.unwrap(), Some(state));
        assert!(store.load_state(2).await.unwrap().is_none());

        store.delete_state(1).await.unwrap();
        assert!(store.load_state(1).await.unwrap().is_none());
    }

    #[test]
    fn test_memory_history_is_capped_newest_first() {
        tokio_test::block_on(async {
            let store = MemoryStateStore::new(&config(3, 60));
            for i in 0..5 {
                store.append_history(7, &entry(&format!("message {}", i))).await.unwrap();
            }

            let history = store.history(7, 10).await.unwrap();
            let messages: Vec<_> = history.iter().map(|e| e.user_message.as_str()).collect();
            assert_eq!(messages, vec!["message 4", "message 3", "message 2"]);

            assert_eq!(store.history(7, 1).await.unwrap().len(), 1);
            assert!(store.history(8, 10).await.unwrap().is_empty());
        });
    }

    #[tokio::test]
    async fn test_memory_entries_expire_and_are_pruned() {
        let store = MemoryStateStore::new(&config(5, 0));
        for id in 0..1000 {
            store.save_state(id, &ConversationState::new()).await.unwrap();
            store.append_history(id, &entry("hello")).await.unwrap();
        }

        assert!(store.load_state(999).await.unwrap().is_none());
        assert!(store.history(999, 10).await.unwrap().is_empty());
        assert!(store.states.read().await.len() <= 1);
        assert!(store.history.read().await.len() <= 1);
    }

    #[tokio::test]
    async fn test_memory_entries_live_within_ttl() {
        let store = MemoryStateStore::new(&config(5, 3600));
        store.save_state(1, &ConversationState::new()).await.unwrap();
        store.save_state(2, &ConversationState::new()).await.unwrap();

        assert!(store.load_state(1).await.unwrap().is_some());
        assert_eq!(store.states.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_history_keeps_state() {
        let store = MemoryStateStore::default();
        store.save_state(4, &ConversationState::new()).await.unwrap();
        store.append_history(4, &entry("hi")).await.unwrap();

        store.clear_history(4).await.unwrap();
        assert!(store.history(4, 10).await.unwrap().is_empty());
        assert!(store.load_state(4).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_demo_requests_newest_first() {
        let store = MemoryStateStore::default();
        for id in 0..3 {
            let request = DemoRequest {
                conversation_id: id,
                timestamp: Utc::now(),
                user_message: "book a demo".to_string(),
                language: "en".to_string(),
                state: ConversationState::new().to_flat(),
                conversation_history: vec![entry("hello")],
            };
            store.save_demo_request(&request).await.unwrap();
        }

        let requests = store.demo_requests(2).await.unwrap();
        let ids: Vec<_> = requests.iter().map(|r| r.conversation_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_history_entry_serialization() {
        let original = entry("hello");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }
}
