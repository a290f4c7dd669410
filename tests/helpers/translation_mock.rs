//! Mock translation server
//!
//! Simulates an IndicTrans2 `/translate` endpoint with wiremock.

use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock translation server for testing
pub struct TranslationMockServer {
    pub server: MockServer,
}

impl TranslationMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Translate `text` from `source` to `target` (IndicTrans2 codes)
    pub async fn mock_translation(&self, text: &str, source: &str, target: &str, translation: &str) {
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(json!({ "text": text, "source": source, "target": target })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "translation": translation })))
            .mount(&self.server)
            .await;
    }

    /// Translate anything into `target` with a fixed marker prefix
    pub async fn mock_any_to(&self, target: &str, marker: &str) {
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(json!({ "target": target })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "translation": marker })))
            .mount(&self.server)
            .await;
    }

    /// Fail every translation request
    pub async fn mock_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
