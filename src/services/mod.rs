//! Services module
//!
//! This module contains the external collaborators (intent classifier,
//! translation) and the assistant pipeline built on top of them

pub mod assistant;
pub mod classifier;
pub mod translation;

// Re-export commonly used services
pub use assistant::{AssistantOptions, AssistantReply, AssistantService};
pub use classifier::{HttpIntentClassifier, IntentClassifier, KeywordIntentClassifier, ParsedMessage, FALLBACK_INTENT};
pub use translation::{HttpTranslator, Language, LazyTranslator, NoopTranslator, ScriptDetector, Translator};

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::content::ContentStore;
use crate::dialogue::DialogueEngine;
use crate::state::StateStore;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub assistant: Arc<AssistantService>,
    classifier: Arc<dyn IntentClassifier>,
    translator: Arc<dyn Translator>,
    content: Arc<ContentStore>,
    admin_ids: Vec<i64>,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, content: Arc<ContentStore>, store: Arc<dyn StateStore>) -> Result<Self> {
        let classifier: Arc<dyn IntentClassifier> = classifier::build_classifier(&settings.classifier)?.into();
        let translator = translation::build_translator(&settings.translation);
        let options = AssistantOptions {
            confidence_threshold: settings.classifier.confidence_threshold,
            record_history: settings.features.conversation_history,
        };

        let assistant = AssistantService::new(
            DialogueEngine::new(content.clone()),
            classifier.clone(),
            translator.clone(),
            store,
            options,
        );

        Ok(Self {
            assistant: Arc::new(assistant),
            classifier,
            translator,
            content,
            admin_ids: settings.bot.admin_ids.clone(),
        })
    }

    /// Whether `user_id` belongs to the BillMart team
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let classifier_healthy = self.classifier.parse("hello").await.is_ok();

        ServiceHealthStatus {
            classifier: self.classifier.name().to_string(),
            classifier_healthy,
            translator: self.translator.name().to_string(),
            content_loaded: self.content.has_language(self.content.default_language()),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub classifier: String,
    pub classifier_healthy: bool,
    pub translator: String,
    pub content_loaded: bool,
}

impl ServiceHealthStatus {
    /// Content is required; a failing classifier only degrades answers
    pub fn is_healthy(&self) -> bool {
        self.content_loaded
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.classifier_healthy {
            issues.push(format!("Intent classifier '{}' is not responding", self.classifier));
        }
        if !self.content_loaded {
            issues.push("Default language content is not loaded".to_string());
        }

        issues
    }
}
