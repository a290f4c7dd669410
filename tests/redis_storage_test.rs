//! Redis state storage tests
//!
//! These need a running Redis (`REDIS_URL`, default `redis://localhost:6379`):
//! `cargo test --test redis_storage_test -- --ignored`

use chrono::Utc;
use serial_test::serial;
use FinBuddy::config::RedisConfig;
use FinBuddy::models::Product;
use FinBuddy::state::{ConversationPhase, ConversationState, HistoryEntry, StateStorage, StateStore, UserType};

async fn storage(history_limit: usize) -> StateStorage {
    let config = RedisConfig {
        url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        prefix: "finbuddy_test:".to_string(),
        ttl_seconds: 60,
        history_limit,
    };
    let storage = StateStorage::new(config).await.expect("redis is reachable");
    storage.test_connection().await.expect("redis answers PING");
    storage
}

fn entry(message: &str) -> HistoryEntry {
    HistoryEntry {
        timestamp: Utc::now(),
        user_message: message.to_string(),
        bot_response: format!("reply to {}", message),
        language: "en".to_string(),
        intent: "nlu_fallback".to_string(),
        confidence: 0.0,
    }
}

#[tokio::test]
#[ignore = "requires a running Redis"]
#[serial]
async fn test_state_round_trip() {
    let storage = storage(10).await;
    let state = ConversationState {
        user_type: UserType::Business,
        product_focus: Some(Product::Lrd),
        conversation_phase: ConversationPhase::Eligibility,
        last_intent: "ask_eligibility".to_string(),
    };

    storage.save_state(9001, &state).await.unwrap();
    assert_eq!(storage.load_state(9001).await.unwrap(), Some(state));

    storage.delete_state(9001).await.unwrap();
    assert_eq!(storage.load_state(9001).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
#[serial]
async fn test_state_without_product() {
    let storage = storage(10).await;
    let state = ConversationState {
        user_type: UserType::Individual,
        ..ConversationState::new()
    };

    storage.save_state(9002, &state).await.unwrap();
    assert_eq!(storage.load_state(9002).await.unwrap().unwrap().product_focus, None);
    storage.delete_state(9002).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis"]
#[serial]
async fn test_history_is_capped_newest_first() {
    let storage = storage(2).await;

    for message in ["first", "second", "third"] {
        storage.append_history(9003, &entry(message)).await.unwrap();
    }

    let history = storage.history(9003, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].user_message, "third");
    assert_eq!(history[1].user_message, "second");
}
