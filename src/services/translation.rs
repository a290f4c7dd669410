//! Translation clients
//!
//! Messages in Indic languages are translated to English before
//! classification and replies are translated back. Language detection is
//! local and script based. The HTTP client is created lazily on first use so
//! that the bot starts even while the translation service is still warming up.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use crate::config::{TranslationConfig, TranslationProvider};
use crate::utils::errors::{TranslationError, TranslationResult};
use crate::utils::logging::log_translation;

/// Languages the assistant can talk in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Hindi,
    Bengali,
    Marathi,
    Tamil,
    Telugu,
    Gujarati,
    Kannada,
    Malayalam,
    Urdu,
    Odia,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::English,
        Language::Hindi,
        Language::Bengali,
        Language::Marathi,
        Language::Tamil,
        Language::Telugu,
        Language::Gujarati,
        Language::Kannada,
        Language::Malayalam,
        Language::Urdu,
        Language::Odia,
    ];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Bengali => "bn",
            Language::Marathi => "mr",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Gujarati => "gu",
            Language::Kannada => "kn",
            Language::Malayalam => "ml",
            Language::Urdu => "ur",
            Language::Odia => "or",
        }
    }

    /// Language tag used by IndicTrans2 models
    pub fn indictrans_code(&self) -> &'static str {
        match self {
            Language::English => "eng_Latn",
            Language::Hindi => "hin_Deva",
            Language::Bengali => "ben_Beng",
            Language::Marathi => "mar_Deva",
            Language::Tamil => "tam_Taml",
            Language::Telugu => "tel_Telu",
            Language::Gujarati => "guj_Gujr",
            Language::Kannada => "kan_Knda",
            Language::Malayalam => "mal_Mlym",
            Language::Urdu => "urd_Arab",
            Language::Odia => "ory_Orya",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|language| language.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Writing systems recognised by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Latin,
    Devanagari,
    Bengali,
    Gujarati,
    Odia,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Arabic,
}

impl Script {
    /// Detection order
    pub const ALL: [Script; 10] = [
        Script::Latin,
        Script::Devanagari,
        Script::Bengali,
        Script::Gujarati,
        Script::Odia,
        Script::Tamil,
        Script::Telugu,
        Script::Kannada,
        Script::Malayalam,
        Script::Arabic,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Script-based language detector
#[derive(Debug, Clone)]
pub struct ScriptDetector {
    script_to_language: HashMap<Script, Language>,
}

impl Default for ScriptDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptDetector {
    pub fn new() -> Self {
        let mut map = HashMap::new();
        map.insert(Script::Latin, Language::English);
        map.insert(Script::Devanagari, Language::Hindi);
        map.insert(Script::Bengali, Language::Bengali);
        map.insert(Script::Gujarati, Language::Gujarati);
        map.insert(Script::Odia, Language::Odia);
        map.insert(Script::Tamil, Language::Tamil);
        map.insert(Script::Telugu, Language::Telugu);
        map.insert(Script::Kannada, Language::Kannada);
        map.insert(Script::Malayalam, Language::Malayalam);
        map.insert(Script::Arabic, Language::Urdu);

        Self { script_to_language: map }
    }

    /// Language of the dominant script; English when nothing is recognised
    pub fn detect(&self, text: &str) -> Language {
        self.script_to_language
            .get(&self.detect_script(text))
            .copied()
            .unwrap_or(Language::English)
    }

    /// Most frequent script among letters of `text`; ties go to the script
    /// listed first in [`Script::ALL`]
    pub fn detect_script(&self, text: &str) -> Script {
        let mut counts = [0usize; Script::ALL.len()];
        for c in text.chars().filter(|c| c.is_alphabetic() || is_combining_mark(*c)) {
            counts[Self::char_to_script(c).index()] += 1;
        }

        let mut best = Script::Latin;
        for script in Script::ALL {
            if counts[script.index()] > counts[best.index()] {
                best = script;
            }
        }
        best
    }

    fn char_to_script(c: char) -> Script {
        match c as u32 {
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF => Script::Arabic,
            0x0900..=0x097F | 0xA8E0..=0xA8FF => Script::Devanagari,
            0x0980..=0x09FF => Script::Bengali,
            0x0A80..=0x0AFF => Script::Gujarati,
            0x0B00..=0x0B7F => Script::Odia,
            0x0B80..=0x0BFF => Script::Tamil,
            0x0C00..=0x0C7F => Script::Telugu,
            0x0C80..=0x0CFF => Script::Kannada,
            0x0D00..=0x0D7F => Script::Malayalam,
            _ => Script::Latin,
        }
    }
}

/// Indic vowel signs are marks, not letters, but still identify the script
fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0900..=0x0D7F)
}

/// Translates text between supported languages
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, from: Language, to: Language) -> TranslationResult<String>;

    async fn detect_language(&self, text: &str) -> TranslationResult<Language>;

    fn supports_pair(&self, from: Language, to: Language) -> bool;

    fn name(&self) -> &str;
}

/// Pass-through translator
#[derive(Debug, Clone, Default)]
pub struct NoopTranslator {
    detector: ScriptDetector,
}

impl NoopTranslator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str, _from: Language, _to: Language) -> TranslationResult<String> {
        Ok(text.to_string())
    }

    async fn detect_language(&self, text: &str) -> TranslationResult<Language> {
        Ok(self.detector.detect(text))
    }

    fn supports_pair(&self, _from: Language, _to: Language) -> bool {
        false
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source: &'static str,
    target: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// Client for an IndicTrans2 translation server
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    detector: ScriptDetector,
}

impl HttpTranslator {
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("FinBuddy-Bot/1.0")
            .build()
            .map_err(|e| TranslationError::InitializationFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/translate", config.url.trim_end_matches('/')),
            detector: ScriptDetector::new(),
        })
    }

    async fn request(&self, text: &str, from: Language, to: Language) -> TranslationResult<String> {
        let request = TranslateRequest {
            text,
            source: from.indictrans_code(),
            target: to.indictrans_code(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::Timeout
                } else if e.is_connect() {
                    TranslationError::ServiceUnavailable
                } else {
                    TranslationError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TranslationError::RequestFailed(format!("HTTP {}: {}", status, error_text)));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;
        Ok(body.translation)
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> TranslationResult<String> {
        if from == to || text.trim().is_empty() {
            return Ok(text.to_string());
        }
        if !self.supports_pair(from, to) {
            return Err(TranslationError::UnsupportedPair {
                from: from.code().to_string(),
                to: to.code().to_string(),
            });
        }

        debug!(from = %from, to = %to, "Making translation request");
        let result = self.request(text, from, to).await;
        log_translation(from.code(), to.code(), text.chars().count(), result.is_ok());
        result
    }

    async fn detect_language(&self, text: &str) -> TranslationResult<Language> {
        Ok(self.detector.detect(text))
    }

    /// IndicTrans2 models translate to or from English only
    fn supports_pair(&self, from: Language, to: Language) -> bool {
        from != to && (from == Language::English || to == Language::English)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Async constructor for the wrapped translator
type TranslatorFactory =
    Box<dyn Fn() -> BoxFuture<'static, TranslationResult<Arc<dyn Translator>>> + Send + Sync>;

/// Translator built on first use and shared afterwards
///
/// Concurrent first calls wait on the same initialization. A failed
/// initialization is not cached; the next call tries again.
pub struct LazyTranslator {
    cell: OnceCell<Arc<dyn Translator>>,
    factory: TranslatorFactory,
    detector: ScriptDetector,
}

impl LazyTranslator {
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TranslationResult<Arc<dyn Translator>>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(move || -> BoxFuture<'static, TranslationResult<Arc<dyn Translator>>> {
                Box::pin(factory())
            }),
            detector: ScriptDetector::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    async fn inner(&self) -> TranslationResult<&Arc<dyn Translator>> {
        self.cell
            .get_or_try_init(|| async {
                info!("Initializing translator");
                (self.factory)().await
            })
            .await
    }
}

impl fmt::Debug for LazyTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTranslator")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Translator for LazyTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> TranslationResult<String> {
        if from == to {
            return Ok(text.to_string());
        }
        self.inner().await?.translate(text, from, to).await
    }

    async fn detect_language(&self, text: &str) -> TranslationResult<Language> {
        Ok(self.detector.detect(text))
    }

    fn supports_pair(&self, from: Language, to: Language) -> bool {
        match self.cell.get() {
            Some(translator) => translator.supports_pair(from, to),
            None => from != to,
        }
    }

    fn name(&self) -> &str {
        "lazy"
    }
}

/// Build the translator selected in configuration
pub fn build_translator(config: &TranslationConfig) -> Arc<dyn Translator> {
    if !config.enabled || config.provider == TranslationProvider::Noop {
        return Arc::new(NoopTranslator::new());
    }

    let config = config.clone();
    Arc::new(LazyTranslator::new(move || {
        let config = config.clone();
        async move {
            let translator: Arc<dyn Translator> = Arc::new(HttpTranslator::new(&config)?);
            Ok(translator)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("hi"), Some(Language::Hindi));
        assert_eq!(Language::Hindi.indictrans_code(), "hin_Deva");
        assert_eq!(Language::Odia.code(), "or");
        assert_eq!(Language::from_code("xx"), None);
    }

    #[test]
    fn test_script_detection() {
        let detector = ScriptDetector::new();
        assert_eq!(detector.detect("मुझे लोन चाहिए"), Language::Hindi);
        assert_eq!(detector.detect("எனக்கு கடன் வேண்டும்"), Language::Tamil);
        assert_eq!(detector.detect("I need a loan"), Language::English);
        assert_eq!(detector.detect("12345 !!"), Language::English);
        assert_eq!(detector.detect("मुझे GigCash चाहिए"), Language::Hindi);
    }

    #[test]
    fn test_script_ties_follow_detection_order() {
        let detector = ScriptDetector::new();
        for _ in 0..20 {
            assert_eq!(detector.detect_script("কখ कख"), Script::Devanagari);
            assert_eq!(detector.detect_script("ab कख"), Script::Latin);
            assert_eq!(detector.detect_script("கக ಕಕ"), Script::Tamil);
        }
    }

    #[tokio::test]
    async fn test_noop_passthrough() {
        let translator = NoopTranslator::new();
        let text = translator.translate("नमस्ते", Language::Hindi, Language::English).await.unwrap();
        assert_eq!(text, "नमस्ते");
        assert!(!translator.supports_pair(Language::Hindi, Language::English));
    }

    #[tokio::test]
    async fn test_lazy_translator_initializes_once() {
        let inits = Arc::new(AtomicUsize::new(0));
        let counter = inits.clone();
        let lazy = Arc::new(LazyTranslator::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                let translator: Arc<dyn Translator> = Arc::new(NoopTranslator::new());
                Ok(translator)
            }
        }));

        assert!(!lazy.is_initialized());
        lazy.detect_language("hello").await.unwrap();
        assert!(!lazy.is_initialized());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lazy = lazy.clone();
                tokio::spawn(async move {
                    lazy.translate("hi", Language::English, Language::Hindi).await
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "hi");
        }

        assert!(lazy.is_initialized());
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lazy_translator_retries_failed_init() {
        let inits = Arc::new(AtomicUsize::new(0));
        let counter = inits.clone();
        let lazy = LazyTranslator::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(TranslationError::InitializationFailed("model missing".to_string())) }
        });

        assert!(lazy.translate("hi", Language::English, Language::Hindi).await.is_err());
        assert!(lazy.translate("hi", Language::English, Language::Hindi).await.is_err());
        assert_eq!(inits.load(Ordering::SeqCst), 2);
        assert!(!lazy.is_initialized());
    }

    #[test]
    fn test_build_translator_respects_config() {
        let mut config = crate::config::Settings::default().translation;
        assert_eq!(build_translator(&config).name(), "noop");

        config.enabled = true;
        config.provider = TranslationProvider::Http;
        assert_eq!(build_translator(&config).name(), "lazy");
    }
}
