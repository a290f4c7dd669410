//! Intent classifier clients
//!
//! `HttpIntentClassifier` talks to a Rasa-compatible NLU server
//! (`POST {url}/model/parse`). `KeywordIntentClassifier` is an offline
//! heuristic used when no NLU server is configured.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::config::{ClassifierConfig, ClassifierProvider};
use crate::models::{Entity, IntentPrediction};
use crate::state::inference::{self, contains_any, contains_phrase, tokenize, PRODUCT_INTENTS};
use crate::utils::errors::{ClassifierError, ClassifierResult};

/// Intent used when the classifier is not confident enough
pub const FALLBACK_INTENT: &str = "nlu_fallback";

const KEYWORD_CONFIDENCE: f32 = 0.75;

/// Classifier output for one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default = "fallback_prediction")]
    pub intent: IntentPrediction,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl ParsedMessage {
    /// Prediction routed to the fallback intent
    pub fn fallback(text: &str) -> Self {
        Self {
            text: text.to_string(),
            intent: fallback_prediction(),
            entities: Vec::new(),
        }
    }

    /// Replace low-confidence predictions with the fallback intent
    pub fn apply_threshold(mut self, threshold: f32) -> Self {
        if self.intent.name.is_empty() || self.intent.confidence < threshold {
            debug!(
                intent = %self.intent.name,
                confidence = self.intent.confidence,
                threshold = threshold,
                "Prediction below threshold, using fallback"
            );
            self.intent = IntentPrediction::new(FALLBACK_INTENT, self.intent.confidence);
        }
        self
    }
}

fn fallback_prediction() -> IntentPrediction {
    IntentPrediction::new(FALLBACK_INTENT, 0.0)
}

/// Turns free text into an intent with entities
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn parse(&self, text: &str) -> ClassifierResult<ParsedMessage>;

    fn name(&self) -> &'static str;
}

/// Build the classifier selected in configuration
pub fn build_classifier(config: &ClassifierConfig) -> ClassifierResult<Box<dyn IntentClassifier>> {
    match config.provider {
        ClassifierProvider::Http => Ok(Box::new(HttpIntentClassifier::new(config)?)),
        ClassifierProvider::Keyword => Ok(Box::new(KeywordIntentClassifier::new())),
    }
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}

/// Client for a Rasa-compatible NLU parse endpoint
#[derive(Debug, Clone)]
pub struct HttpIntentClassifier {
    client: Client,
    endpoint: String,
}

impl HttpIntentClassifier {
    pub fn new(config: &ClassifierConfig) -> ClassifierResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("FinBuddy-Bot/1.0")
            .build()
            .map_err(|e| ClassifierError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/model/parse", config.url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl IntentClassifier for HttpIntentClassifier {
    async fn parse(&self, text: &str) -> ClassifierResult<ParsedMessage> {
        debug!(url = %self.endpoint, "Making NLU parse request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ParseRequest { text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout
                } else if e.is_connect() {
                    ClassifierError::ServiceUnavailable
                } else {
                    ClassifierError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::RequestFailed(format!("HTTP {}: {}", status, error_text)));
        }

        let mut parsed: ParsedMessage = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;
        if parsed.text.is_empty() {
            parsed.text = text.to_string();
        }

        Ok(parsed)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Offline classifier driven by keyword lists
#[derive(Debug, Clone, Default)]
pub struct KeywordIntentClassifier;

const GREET_WORDS: &[&str] = &["hi", "hello", "hey", "namaste", "good morning", "good evening"];
const GOODBYE_WORDS: &[&str] = &["bye", "goodbye", "see you"];
const THANKS_WORDS: &[&str] = &["thanks", "thank you", "thx"];
const AFFIRM_WORDS: &[&str] = &["yes", "yeah", "yep", "sure", "ok", "okay", "proceed"];
const DENY_WORDS: &[&str] = &["no", "nope", "not now", "not interested"];
const LOAN_NEED_PHRASES: &[&str] = &[
    "need a loan", "need loan", "need money", "need funding", "need finance", "want a loan",
    "looking for a loan", "looking for funding",
];

const DEMO_PHRASES: &[&str] = &[
    "demo", "book a demo", "schedule a demo", "call back", "callback", "call me", "talk to someone",
    "speak to someone",
];
const END_CHAT_PHRASES: &[&str] = &["end chat", "end the chat", "end conversation", "that s all", "that is all"];

/// Topic intents, checked in this order
const TOPIC_INTENT_WORDS: &[(&str, &[&str])] = &[
    ("ask_fees", &["fee", "fees", "charges", "cost", "interest rate"]),
    ("ask_eligibility", &["eligibility", "eligible", "qualify"]),
    ("ask_documents", &["documents", "document", "papers", "kyc"]),
    ("ask_collateral", &["collateral", "security", "guarantee"]),
    ("ask_disbursement_speed", &["disbursement", "how fast", "how soon", "how quickly"]),
    ("ask_process", &["process", "apply", "steps", "procedure"]),
];

/// Segment declarations, checked in this order
const DECLARATION_PHRASES: &[(&str, &[&str])] = &[
    ("declare_gig_worker", &["i am a gig worker", "i m a gig worker", "i am a freelancer", "i m a freelancer", "i drive for"]),
    ("declare_salaried", &["i am salaried", "i m salaried", "i am an employee", "salaried employee"]),
    ("declare_hospital", &["we are a hospital", "we run a hospital", "our hospital"]),
    ("declare_business", &["i run a business", "we are a business", "our business", "our company", "my company"]),
    ("declare_lender", &["we are a lender", "we are an nbfc", "i am a lender", "we are a bank"]),
];

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Best intent for `text`, if any keyword fires
    pub fn classify(&self, text: &str) -> Option<&'static str> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return None;
        }

        if contains_any(&tokens, LOAN_NEED_PHRASES) {
            return Some("ask_loan_need");
        }
        if contains_any(&tokens, DEMO_PHRASES) {
            return Some("request_demo");
        }
        if contains_any(&tokens, END_CHAT_PHRASES) {
            return Some("end_chat");
        }
        if let Some(intent) = first_phrase_match(&tokens, DECLARATION_PHRASES) {
            return Some(intent);
        }
        if let Some(intent) = first_phrase_match(&tokens, TOPIC_INTENT_WORDS) {
            return Some(intent);
        }
        if let Some(product) = inference::infer_product(&tokens) {
            return PRODUCT_INTENTS
                .iter()
                .find(|(_, candidate)| *candidate == product)
                .map(|(intent, _)| *intent);
        }
        if contains_any(&tokens, THANKS_WORDS) {
            return Some("thank_you");
        }
        if contains_any(&tokens, GOODBYE_WORDS) {
            return Some("goodbye");
        }
        if contains_any(&tokens, GREET_WORDS) {
            return Some("greet");
        }
        if contains_any(&tokens, DENY_WORDS) {
            return Some("deny");
        }
        if contains_any(&tokens, AFFIRM_WORDS) {
            return Some("affirm");
        }
        None
    }
}

fn first_phrase_match(tokens: &[String], table: &[(&'static str, &[&str])]) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|phrase| contains_phrase(tokens, phrase)))
        .map(|(intent, _)| *intent)
}

#[async_trait]
impl IntentClassifier for KeywordIntentClassifier {
    async fn parse(&self, text: &str) -> ClassifierResult<ParsedMessage> {
        match self.classify(text) {
            Some(intent) => Ok(ParsedMessage {
                text: text.to_string(),
                intent: IntentPrediction::new(intent, KEYWORD_CONFIDENCE),
                entities: Vec::new(),
            }),
            None => {
                warn!("No keyword intent for message, using fallback");
                Ok(ParsedMessage::fallback(text))
            }
        }
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rasa_response() {
        let parsed: ParsedMessage = serde_json::from_value(json!({
            "text": "gigcash fees",
            "intent": {"name": "ask_fees", "confidence": 0.93},
            "entities": [{"entity": "product_name", "value": "gigcash", "start": 0, "end": 7}],
            "intent_ranking": []
        }))
        .unwrap();

        assert_eq!(parsed.intent.name, "ask_fees");
        assert_eq!(parsed.entities[0].value_str(), Some("gigcash"));
    }

    #[test]
    fn test_missing_intent_is_fallback() {
        let parsed: ParsedMessage = serde_json::from_value(json!({"text": "???"})).unwrap();
        assert_eq!(parsed.intent.name, FALLBACK_INTENT);
    }

    #[test]
    fn test_threshold() {
        let parsed = ParsedMessage {
            text: "hm".to_string(),
            intent: IntentPrediction::new("greet", 0.2),
            entities: Vec::new(),
        };
        let routed = parsed.clone().apply_threshold(0.4);
        assert_eq!(routed.intent.name, FALLBACK_INTENT);
        assert_eq!(routed.intent.confidence, 0.2);

        assert_eq!(parsed.apply_threshold(0.1).intent.name, "greet");
    }

    #[test]
    fn test_keyword_classification() {
        let classifier = KeywordIntentClassifier::new();
        assert_eq!(classifier.classify("Hello there"), Some("greet"));
        assert_eq!(classifier.classify("I need a loan urgently"), Some("ask_loan_need"));
        assert_eq!(classifier.classify("I am a freelancer on Swiggy"), Some("declare_gig_worker"));
        assert_eq!(classifier.classify("what are the fees"), Some("ask_fees"));
        assert_eq!(classifier.classify("tell me about lease rental discounting"), Some("ask_lease_rental_discounting"));
        assert_eq!(classifier.classify("thank you so much"), Some("thank_you"));
        assert_eq!(classifier.classify("yes please"), Some("affirm"));
        assert_eq!(classifier.classify("can I book a demo of GigCash"), Some("request_demo"));
        assert_eq!(classifier.classify("please call me back"), Some("request_demo"));
        assert_eq!(classifier.classify("that's all, end chat"), Some("end_chat"));
        assert_eq!(classifier.classify("purple elephant"), None);
        assert_eq!(classifier.classify(""), None);
    }

    #[tokio::test]
    async fn test_keyword_parse_falls_back() {
        let classifier = KeywordIntentClassifier::new();
        let parsed = classifier.parse("purple elephant").await.unwrap();
        assert_eq!(parsed.intent.name, FALLBACK_INTENT);
        assert_eq!(classifier.name(), "keyword");
    }
}
