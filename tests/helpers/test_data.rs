//! Test fixtures
//!
//! Settings and service builders shared by the integration tests.

use std::sync::Arc;
use FinBuddy::config::{ClassifierProvider, Settings, TranslationProvider};
use FinBuddy::content::ContentStore;
use FinBuddy::services::ServiceFactory;
use FinBuddy::state::MemoryStateStore;

/// Settings valid for tests, using only local providers
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.bot.token = "123456:TEST_TOKEN".to_string();
    settings
}

/// Settings pointing the classifier at a mock NLU server
pub fn settings_with_nlu(url: &str) -> Settings {
    let mut settings = test_settings();
    settings.classifier.provider = ClassifierProvider::Http;
    settings.classifier.url = url.to_string();
    settings.classifier.timeout_seconds = 2;
    settings
}

/// Settings enabling translation through a mock server
pub fn with_translation(mut settings: Settings, url: &str) -> Settings {
    settings.translation.enabled = true;
    settings.translation.provider = TranslationProvider::Http;
    settings.translation.url = url.to_string();
    settings.translation.timeout_seconds = 2;
    settings
}

pub fn bundled_content() -> Arc<ContentStore> {
    Arc::new(ContentStore::bundled().expect("bundled content is valid"))
}

/// Service factory over in-memory storage
pub fn build_services(settings: &Settings) -> (ServiceFactory, Arc<MemoryStateStore>) {
    let store = Arc::new(MemoryStateStore::new(&settings.redis));
    let services = ServiceFactory::new(settings, bundled_content(), store.clone())
        .expect("services build from test settings");
    (services, store)
}
