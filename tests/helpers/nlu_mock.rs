//! Mock NLU server
//!
//! Simulates a Rasa-compatible `/model/parse` endpoint with wiremock.

use std::time::Duration;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock NLU server for testing
pub struct NluMockServer {
    pub server: MockServer,
}

impl NluMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Answer `text` with `intent` at `confidence`
    pub async fn mock_parse(&self, text: &str, intent: &str, confidence: f32, entities: Value) {
        Mock::given(method("POST"))
            .and(path("/model/parse"))
            .and(body_partial_json(json!({ "text": text })))
            .respond_with(ResponseTemplate::new(200).set_body_json(parse_response(text, intent, confidence, entities)))
            .mount(&self.server)
            .await;
    }

    /// Fail every parse request with `status`
    pub async fn mock_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/model/parse"))
            .respond_with(ResponseTemplate::new(status).set_body_string("model not loaded"))
            .mount(&self.server)
            .await;
    }

    /// Respond only after `delay`
    pub async fn mock_slow(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/model/parse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(parse_response("", "greet", 0.9, json!([])))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Reply with a body that is not a parse result
    pub async fn mock_malformed(&self) {
        Mock::given(method("POST"))
            .and(path("/model/parse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&self.server)
            .await;
    }
}

/// Rasa-style parse response body
pub fn parse_response(text: &str, intent: &str, confidence: f32, entities: Value) -> Value {
    json!({
        "text": text,
        "intent": { "name": intent, "confidence": confidence },
        "entities": entities,
        "intent_ranking": [{ "name": intent, "confidence": confidence }]
    })
}
