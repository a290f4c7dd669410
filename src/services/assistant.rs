//! Assistant pipeline
//!
//! One inbound message end to end: detect the language, translate to English
//! when needed, classify, apply the turn to the stored state, translate the
//! replies back and record the exchange. Translation and classification
//! failures degrade the turn instead of failing it. Demo requests are saved
//! with the conversation so far; ending the chat clears the history.

use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use tracing::{debug, info, warn};
use crate::dialogue::{DialogueEngine, QuickReply, DEMO_INTENT, END_CHAT_INTENTS};
use crate::models::{IntentPrediction, TurnRequest};
use crate::state::{Clarification, ConversationState, DemoRequest, HistoryEntry, StateStore};
use crate::utils::errors::Result;
use crate::utils::helpers::parse_intent_payload;
use crate::utils::logging::{log_api_error, log_conversation_turn, TurnRecord};
use super::classifier::{IntentClassifier, ParsedMessage};
use super::translation::{Language, Translator};

/// History entries attached to a demo request
const DEMO_HISTORY_ENTRIES: usize = 50;

/// Replies for one processed message
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub messages: Vec<String>,
    pub quick_replies: Vec<QuickReply>,
    /// Language the replies are written in
    pub language: Language,
    pub intent: IntentPrediction,
    pub state: ConversationState,
    /// What the bot still needs to know about the user
    pub clarification: Option<Clarification>,
}

impl AssistantReply {
    /// All messages joined for logging and history
    pub fn text(&self) -> String {
        self.messages.join("\n\n")
    }
}

/// Pipeline options
#[derive(Debug, Clone, Copy)]
pub struct AssistantOptions {
    pub confidence_threshold: f32,
    pub record_history: bool,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.4,
            record_history: true,
        }
    }
}

/// Conversation front door shared by all chats
pub struct AssistantService {
    engine: DialogueEngine,
    classifier: Arc<dyn IntentClassifier>,
    translator: Arc<dyn Translator>,
    store: Arc<dyn StateStore>,
    options: AssistantOptions,
}

/// How the current message is being handled language-wise
struct LanguagePlan {
    detected: Language,
    /// Content language used to pick reply texts
    content_language: Language,
    /// Whether replies must be machine translated to `detected`
    translate_replies: bool,
}

impl AssistantService {
    pub fn new(
        engine: DialogueEngine,
        classifier: Arc<dyn IntentClassifier>,
        translator: Arc<dyn Translator>,
        store: Arc<dyn StateStore>,
        options: AssistantOptions,
    ) -> Self {
        Self {
            engine,
            classifier,
            translator,
            store,
            options,
        }
    }

    /// Process a free-text message
    pub async fn handle_text(&self, conversation_id: i64, text: &str) -> Result<AssistantReply> {
        let started = Instant::now();

        if let Some(intent) = parse_intent_payload(text) {
            let parsed = ParsedMessage {
                text: String::new(),
                intent: IntentPrediction::new(intent, 1.0),
                entities: Vec::new(),
            };
            let plan = self.plan_for(Language::English);
            return self.run_turn(conversation_id, text, parsed, plan, started).await;
        }

        let detected = self
            .translator
            .detect_language(text)
            .await
            .unwrap_or(Language::English);
        let (english_text, plan) = self.to_english(text, detected).await;

        let parsed = match self.classifier.parse(&english_text).await {
            Ok(parsed) => parsed.apply_threshold(self.options.confidence_threshold),
            Err(e) => {
                log_api_error(self.classifier.name(), &e.to_string(), Some("intent classification"));
                ParsedMessage::fallback(&english_text)
            }
        };

        self.run_turn(conversation_id, text, parsed, plan, started).await
    }

    /// Process an intent chosen through a quick-reply button, answering in
    /// `language` when it can be served
    pub async fn handle_intent(
        &self,
        conversation_id: i64,
        intent: &str,
        language: Language,
    ) -> Result<AssistantReply> {
        let parsed = ParsedMessage {
            text: String::new(),
            intent: IntentPrediction::new(intent, 1.0),
            entities: Vec::new(),
        };
        let user_message = format!("/{}", intent);
        let plan = self.plan_for(language);
        self.run_turn(conversation_id, &user_message, parsed, plan, Instant::now()).await
    }

    /// Forget the conversation context and its history
    pub async fn reset(&self, conversation_id: i64) -> Result<()> {
        debug!(conversation_id = conversation_id, "Resetting conversation");
        self.store.delete_state(conversation_id).await?;
        self.store.clear_history(conversation_id).await
    }

    /// Most recent demo requests, newest first
    pub async fn demo_requests(&self, limit: usize) -> Result<Vec<DemoRequest>> {
        self.store.demo_requests(limit).await
    }

    /// Recent exchanges, newest first
    pub async fn history(&self, conversation_id: i64, limit: usize) -> Result<Vec<HistoryEntry>> {
        self.store.history(conversation_id, limit).await
    }

    /// Stored state, or a fresh one for a new conversation
    pub async fn current_state(&self, conversation_id: i64) -> Result<ConversationState> {
        Ok(self.store.load_state(conversation_id).await?.unwrap_or_default())
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    /// Bundled content wins; otherwise replies are translated only when the
    /// translator can produce the language, else they stay English
    fn plan_for(&self, language: Language) -> LanguagePlan {
        let has_content = self.engine.content().has_language(language.code());
        LanguagePlan {
            detected: language,
            content_language: if has_content { language } else { Language::English },
            translate_replies: !has_content
                && language != Language::English
                && self.translator.supports_pair(Language::English, language),
        }
    }

    /// English text for classification, plus how to answer
    async fn to_english(&self, text: &str, detected: Language) -> (String, LanguagePlan) {
        if detected == Language::English {
            return (text.to_string(), self.plan_for(Language::English));
        }

        if !self.translator.supports_pair(detected, Language::English) {
            debug!(language = %detected, translator = self.translator.name(), "Language not translatable, replying in English");
            return (text.to_string(), self.plan_for(Language::English));
        }

        let plan = self.plan_for(detected);
        match self.translator.translate(text, detected, Language::English).await {
            Ok(english) => (english, plan),
            Err(e) => {
                warn!(language = %detected, error = %e, "Translation to English failed, replying in English");
                let plan = LanguagePlan {
                    translate_replies: false,
                    ..plan
                };
                (text.to_string(), plan)
            }
        }
    }

    async fn run_turn(
        &self,
        conversation_id: i64,
        user_message: &str,
        parsed: ParsedMessage,
        plan: LanguagePlan,
        started: Instant,
    ) -> Result<AssistantReply> {
        let previous = self.store.load_state(conversation_id).await?;
        let request = TurnRequest {
            intent: parsed.intent.name.clone(),
            entities: parsed.entities,
            text: parsed.text,
        };

        let outcome = self
            .engine
            .process_turn(previous.as_ref(), &request, plan.content_language.code());
        self.store.save_state(conversation_id, &outcome.state).await?;

        let (messages, language) = if plan.translate_replies {
            self.translate_replies(outcome.messages, plan.detected).await
        } else {
            (outcome.messages, plan.content_language)
        };

        let reply = AssistantReply {
            messages,
            quick_replies: outcome.quick_replies,
            language,
            intent: parsed.intent,
            state: outcome.state,
            clarification: outcome.clarification,
        };

        let reply_text = reply.text();
        let intent = reply.intent.name.as_str();
        if intent == DEMO_INTENT {
            self.save_demo_request(conversation_id, user_message, &reply).await;
        }

        if END_CHAT_INTENTS.contains(&intent) {
            if let Err(e) = self.store.clear_history(conversation_id).await {
                warn!(conversation_id = conversation_id, error = %e, "Failed to clear history");
            }
        } else if self.options.record_history {
            let entry = HistoryEntry {
                timestamp: Utc::now(),
                user_message: user_message.to_string(),
                bot_response: reply_text.clone(),
                language: reply.language.code().to_string(),
                intent: reply.intent.name.clone(),
                confidence: reply.intent.confidence,
            };
            if let Err(e) = self.store.append_history(conversation_id, &entry).await {
                warn!(conversation_id = conversation_id, error = %e, "Failed to record history");
            }
        }

        let state_before = previous.unwrap_or_default();
        log_conversation_turn(&TurnRecord {
            conversation_id,
            intent: &reply.intent.name,
            confidence: reply.intent.confidence,
            language: reply.language.code(),
            user_message,
            bot_response_length: reply_text.chars().count(),
            state_before: &state_before,
            state_after: &reply.state,
            processing_time_ms: started.elapsed().as_millis() as u64,
        });

        Ok(reply)
    }

    /// Store the request with the conversation that led to it
    async fn save_demo_request(&self, conversation_id: i64, user_message: &str, reply: &AssistantReply) {
        let conversation_history = match self.store.history(conversation_id, DEMO_HISTORY_ENTRIES).await {
            Ok(history) => history,
            Err(e) => {
                warn!(conversation_id = conversation_id, error = %e, "Failed to load history for demo request");
                Vec::new()
            }
        };

        let request = DemoRequest {
            conversation_id,
            timestamp: Utc::now(),
            user_message: user_message.to_string(),
            language: reply.language.code().to_string(),
            state: reply.state.to_flat(),
            conversation_history,
        };

        match self.store.save_demo_request(&request).await {
            Ok(()) => info!(conversation_id = conversation_id, "Demo request saved"),
            Err(e) => warn!(conversation_id = conversation_id, error = %e, "Failed to save demo request"),
        }
    }

    /// Translate every reply; any failure falls back to the English set
    async fn translate_replies(&self, messages: Vec<String>, target: Language) -> (Vec<String>, Language) {
        let mut translated = Vec::with_capacity(messages.len());
        for message in &messages {
            match self.translator.translate(message, Language::English, target).await {
                Ok(text) => translated.push(text),
                Err(e) => {
                    warn!(language = %target, error = %e, "Reply translation failed, replying in English");
                    return (messages, Language::English);
                }
            }
        }
        (translated, target)
    }
}
