//! Translation integration tests
//!
//! Non-English messages are translated to English for classification and
//! the replies are translated back, against a mock IndicTrans2 server.

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use FinBuddy::services::translation::{build_translator, HttpTranslator, Language, Translator};
use FinBuddy::state::{StateStore, UserType};
use FinBuddy::utils::errors::TranslationError;

const HINDI_LOAN_REQUEST: &str = "मुझे लोन चाहिए";
const HINDI_MARKER: &str = "अनुवादित उत्तर";

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

#[tokio::test]
async fn test_http_translator_round_trip() {
    let server = TranslationMockServer::new().await;
    server
        .mock_translation(HINDI_LOAN_REQUEST, "hin_Deva", "eng_Latn", "I need a loan")
        .await;

    let settings = with_translation(test_settings(), &server.url());
    let translator = HttpTranslator::new(&settings.translation).unwrap();

    let english = translator
        .translate(HINDI_LOAN_REQUEST, Language::Hindi, Language::English)
        .await
        .unwrap();
    assert_eq!(english, "I need a loan");
    assert_eq!(translator.detect_language(HINDI_LOAN_REQUEST).await.unwrap(), Language::Hindi);
}

#[tokio::test]
async fn test_indic_to_indic_is_unsupported() {
    let server = TranslationMockServer::new().await;
    let settings = with_translation(test_settings(), &server.url());
    let translator = HttpTranslator::new(&settings.translation).unwrap();

    let result = translator.translate("नमस्ते", Language::Hindi, Language::Tamil).await;
    assert_matches!(result, Err(TranslationError::UnsupportedPair { .. }));
    assert!(server.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_failure_is_reported() {
    let server = TranslationMockServer::new().await;
    server.mock_failure(502).await;

    let settings = with_translation(test_settings(), &server.url());
    let translator = build_translator(&settings.translation);

    let result = translator.translate("hello", Language::English, Language::Hindi).await;
    assert_matches!(result, Err(TranslationError::RequestFailed(message)) if message.contains("502"));
}

#[tokio::test]
async fn test_hindi_conversation_is_translated_both_ways() {
    let server = TranslationMockServer::new().await;
    server
        .mock_translation(HINDI_LOAN_REQUEST, "hin_Deva", "eng_Latn", "I need a loan")
        .await;
    server.mock_any_to("hin_Deva", HINDI_MARKER).await;

    let settings = with_translation(test_settings(), &server.url());
    let (services, store) = build_services(&settings);

    let reply = services.assistant.handle_text(21, HINDI_LOAN_REQUEST).await.unwrap();

    assert_eq!(reply.intent.name, "ask_loan_need");
    assert_eq!(reply.language, Language::Hindi);
    assert!(!reply.messages.is_empty());
    assert!(reply.messages.iter().all(|message| message == HINDI_MARKER));

    let history = services.assistant.history(21, 5).await.unwrap();
    assert_eq!(history[0].language, "hi");
    assert_eq!(history[0].user_message, HINDI_LOAN_REQUEST);
    assert!(store.load_state(21).await.unwrap().is_some());
}

#[tokio::test]
async fn test_translation_outage_replies_in_english() {
    let server = TranslationMockServer::new().await;
    server.mock_failure(500).await;

    let settings = with_translation(test_settings(), &server.url());
    let (services, _store) = build_services(&settings);

    let reply = services.assistant.handle_text(22, HINDI_LOAN_REQUEST).await.unwrap();

    assert_eq!(reply.language, Language::English);
    assert_eq!(reply.intent.name, "nlu_fallback");
    assert!(!reply.messages.is_empty());
    assert!(reply.messages.iter().all(|message| !message.chars().any(is_devanagari)));
}

#[tokio::test]
async fn test_english_messages_skip_translation() {
    let server = TranslationMockServer::new().await;
    server.mock_failure(500).await;

    let settings = with_translation(test_settings(), &server.url());
    let (services, _store) = build_services(&settings);

    let reply = services.assistant.handle_text(23, "We are an NBFC looking for deal flow").await.unwrap();

    assert_eq!(reply.language, Language::English);
    assert_eq!(reply.state.user_type, UserType::Lender);
    assert!(server.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_button_turn_replies_in_user_language() {
    let server = TranslationMockServer::new().await;
    server.mock_any_to("hin_Deva", HINDI_MARKER).await;

    let settings = with_translation(test_settings(), &server.url());
    let (services, _store) = build_services(&settings);

    let reply = services
        .assistant
        .handle_intent(24, "greet", Language::Hindi)
        .await
        .unwrap();

    assert_eq!(reply.language, Language::Hindi);
    assert!(reply.messages.iter().all(|message| message == HINDI_MARKER));
}
