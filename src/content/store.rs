//! Static content store
//!
//! Loads response texts from `<directory>/<lang>.json`, resolves dotted keys
//! such as `products.gigcash.fees`, falls back to the default language and
//! fills `{param}` placeholders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{info, warn, error, debug};
use crate::config::ContentConfig;
use crate::models::{Product, Topic};
use crate::utils::errors::{FinBuddyError, Result};

/// Content shipped with the binary, used when no content directory is deployed
const BUNDLED_ENGLISH: &str = include_str!("../../content/en.json");

/// Parameters for placeholder formatting
pub type ContentParams = HashMap<String, String>;

/// Response text store
#[derive(Debug, Clone)]
pub struct ContentStore {
    /// Loaded content by language code
    content: HashMap<String, Map<String, Value>>,
    /// Default language code
    default_language: String,
    /// Supported language codes
    supported_languages: Vec<String>,
    /// Directory holding content files
    directory: PathBuf,
}

impl ContentStore {
    /// Create an empty store for the configured languages
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            content: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
            directory: PathBuf::from(&config.directory),
        }
    }

    /// English store built from the bundled content
    pub fn bundled() -> Result<Self> {
        let mut store = Self {
            content: HashMap::new(),
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string()],
            directory: PathBuf::new(),
        };
        store.insert_language("en", serde_json::from_str(BUNDLED_ENGLISH)?)?;
        Ok(store)
    }

    /// Load all content files for the supported languages
    ///
    /// Only a missing or malformed default language file is fatal.
    pub async fn load(&mut self) -> Result<()> {
        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = self.directory.join(format!("{}.json", lang_code));

            if !file_path.exists() {
                warn!("Content file not found: {}", file_path.display());
                if lang_code == &self.default_language {
                    return Err(FinBuddyError::Content(
                        format!("Default language content file not found: {}", file_path.display())
                    ));
                }
                continue;
            }

            match self.load_language_file(&file_path, lang_code).await {
                Ok(_) => info!("Loaded content for language: {}", lang_code),
                Err(e) => {
                    error!("Failed to load content for {}: {}", lang_code, e);
                    if lang_code == &self.default_language {
                        return Err(FinBuddyError::Content(
                            format!("Failed to load default language content: {}", e)
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Load a single language file
    async fn load_language_file(&mut self, file_path: &Path, lang_code: &str) -> Result<()> {
        let raw = fs::read_to_string(file_path).await?;
        let value: Value = serde_json::from_str(&raw)?;
        self.insert_language(lang_code, value)
    }

    /// Register content for a language from an already parsed JSON object
    pub fn insert_language(&mut self, lang_code: &str, value: Value) -> Result<()> {
        match value {
            Value::Object(map) => {
                debug!("Loaded {} content keys for {}", count_keys(&map), lang_code);
                self.content.insert(lang_code.to_string(), map);
                Ok(())
            }
            _ => Err(FinBuddyError::Content(
                format!("Invalid content file format for {}", lang_code)
            )),
        }
    }

    /// Text for `key`, or the key itself when no language has it
    pub fn t(&self, key: &str, lang: &str, params: Option<&ContentParams>) -> String {
        match self.lookup(key, lang) {
            Some(text) => format_message(&text, params),
            None => {
                warn!("Content key '{}' not found in any language", key);
                key.to_string()
            }
        }
    }

    /// Text for `key` in `lang`, falling back to the default language
    pub fn lookup(&self, key: &str, lang: &str) -> Option<String> {
        let effective_lang = self.effective_language(lang);
        self.get_text(key, effective_lang).or_else(|| {
            if effective_lang != self.default_language {
                self.get_text(key, &self.default_language)
            } else {
                None
            }
        })
    }

    /// Canned answer for a product and topic, `None` when the content has none
    pub fn product_topic(&self, product: Product, topic: Topic, lang: &str) -> Option<String> {
        self.lookup(&format!("products.{}.{}", product.id(), topic.key()), lang)
    }

    /// Whether content has been loaded for `lang`
    pub fn has_language(&self, lang: &str) -> bool {
        self.content.contains_key(lang)
    }

    /// Get default language
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Get supported languages
    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Content statistics per loaded language
    pub fn get_stats(&self) -> ContentStats {
        let mut languages: Vec<LanguageStats> = self
            .content
            .iter()
            .map(|(code, map)| LanguageStats {
                code: code.clone(),
                key_count: count_keys(map),
            })
            .collect();
        languages.sort_by(|a, b| a.code.cmp(&b.code));

        let total_keys = self
            .content
            .get(&self.default_language)
            .map(count_keys)
            .unwrap_or(0);

        ContentStats { languages, total_keys }
    }

    fn effective_language<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.content.contains_key(lang) {
            lang
        } else {
            &self.default_language
        }
    }

    /// Walk a dotted key through the nested JSON content
    fn get_text(&self, key: &str, lang: &str) -> Option<String> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.content.get(lang)?.get(first)?;

        for part in parts {
            current = current.get(part)?;
        }

        match current {
            Value::String(text) => Some(text.clone()),
            Value::Array(lines) => {
                let lines: Vec<&str> = lines.iter().filter_map(Value::as_str).collect();
                Some(lines.join("\n"))
            }
            _ => None,
        }
    }
}

/// Format message with parameters
fn format_message(template: &str, params: Option<&ContentParams>) -> String {
    match params {
        Some(params) => params.iter().fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("{{{}}}", key), value)
        }),
        None => template.to_string(),
    }
}

/// Recursively count content keys
fn count_keys(obj: &Map<String, Value>) -> usize {
    obj.values()
        .map(|value| match value {
            Value::Object(nested) => count_keys(nested),
            _ => 1,
        })
        .sum()
}

/// Content statistics
#[derive(Debug, Clone)]
pub struct ContentStats {
    pub languages: Vec<LanguageStats>,
    pub total_keys: usize,
}

/// Language-specific statistics
#[derive(Debug, Clone)]
pub struct LanguageStats {
    pub code: String,
    pub key_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_store() -> ContentStore {
        let config = ContentConfig {
            directory: "content".to_string(),
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string(), "hi".to_string()],
        };
        let mut store = ContentStore::new(&config);
        store
            .insert_language("en", json!({
                "prompts": {"greeting": "Hello {name}!", "bye": "Goodbye"},
                "products": {"gigcash": {"fees": ["Line one", "Line two"]}}
            }))
            .unwrap();
        store
            .insert_language("hi", json!({"prompts": {"greeting": "नमस्ते {name}!"}}))
            .unwrap();
        store
    }

    #[test]
    fn test_lookup_with_language_fallback() {
        let store = test_store();
        assert_eq!(store.lookup("prompts.greeting", "hi").as_deref(), Some("नमस्ते {name}!"));
        assert_eq!(store.lookup("prompts.bye", "hi").as_deref(), Some("Goodbye"));
        assert_eq!(store.lookup("prompts.bye", "ta").as_deref(), Some("Goodbye"));
        assert_eq!(store.lookup("prompts.missing", "en"), None);
    }

    #[test]
    fn test_t_formats_and_falls_back_to_key() {
        let store = test_store();
        let mut params = ContentParams::new();
        params.insert("name".to_string(), "Asha".to_string());
        assert_eq!(store.t("prompts.greeting", "en", Some(&params)), "Hello Asha!");
        assert_eq!(store.t("prompts.nowhere", "en", None), "prompts.nowhere");
    }

    #[test]
    fn test_product_topic_joins_lines() {
        let store = test_store();
        assert_eq!(
            store.product_topic(Product::GigCash, Topic::Fees, "en").as_deref(),
            Some("Line one\nLine two")
        );
        assert_eq!(store.product_topic(Product::Scf, Topic::Fees, "en"), None);
    }

    #[test]
    fn test_insert_rejects_non_object() {
        let mut store = test_store();
        assert!(store.insert_language("ta", json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_bundled_content_covers_every_product_topic() {
        let store = ContentStore::bundled().unwrap();
        let topics = [
            Topic::Info,
            Topic::Fees,
            Topic::Eligibility,
            Topic::Process,
            Topic::Documents,
            Topic::Collateral,
            Topic::DisbursementSpeed,
        ];
        for product in Product::ALL {
            for topic in topics {
                assert!(
                    store.product_topic(product, topic, "en").is_some(),
                    "missing {}.{}",
                    product.id(),
                    topic.key()
                );
            }
        }
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"prompts": {"greeting": "Hi"}}"#).unwrap();

        let config = ContentConfig {
            directory: dir.path().to_string_lossy().to_string(),
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string(), "hi".to_string()],
        };
        let mut store = ContentStore::new(&config);
        store.load().await.unwrap();

        assert!(store.has_language("en"));
        assert!(!store.has_language("hi"));
        assert_eq!(store.get_stats().total_keys, 1);
    }

    #[tokio::test]
    async fn test_load_fails_without_default_language() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentConfig {
            directory: dir.path().to_string_lossy().to_string(),
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string()],
        };
        let mut store = ContentStore::new(&config);
        assert!(matches!(store.load().await, Err(FinBuddyError::Content(_))));
    }
}
