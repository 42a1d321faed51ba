//! UI languages and translation lookup
//!
//! Lookups fall back from the selected language to English and finally to
//! the key itself, so a missing string shows up as its key rather than as
//! an error.

use crate::error::{OptibillError, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
    French,
    Arabic,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::French => "fr",
            Language::Arabic => "ar",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::English),
            "hi" => Some(Language::Hindi),
            "fr" => Some(Language::French),
            "ar" => Some(Language::Arabic),
            _ => None,
        }
    }

    pub fn all() -> &'static [Language] {
        &[
            Language::English,
            Language::Hindi,
            Language::French,
            Language::Arabic,
        ]
    }

    /// Right-to-left script
    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic)
    }
}

impl FromStr for Language {
    type Err = OptibillError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| OptibillError::UnknownLanguage(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Key/value translation tables, one per language
#[derive(Debug, Clone, Default)]
pub struct Translations {
    tables: HashMap<Language, HashMap<String, String>>,
    language: Language,
}

impl Translations {
    pub fn new(language: Language) -> Self {
        Self {
            tables: HashMap::new(),
            language,
        }
    }

    /// Replace the table for `language` with a flat JSON object
    pub fn load_json(&mut self, language: Language, json: &str) -> Result<usize> {
        let table: HashMap<String, String> = serde_json::from_str(json)?;
        let count = table.len();
        self.tables.insert(language, table);
        Ok(count)
    }

    /// Load a bundle of tables keyed by language code:
    /// `{"en": {"key": "text"}, "hi": {...}}`
    ///
    /// Tables for unsupported languages are skipped with a warning.
    pub fn load_bundle(&mut self, json: &str) -> Result<usize> {
        let bundle: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;
        let mut loaded = 0;
        for (code, table) in bundle {
            match Language::from_code(&code) {
                Some(language) => {
                    self.tables.insert(language, table);
                    loaded += 1;
                }
                None => log::warn!("Skipping translations for unsupported language '{}'", code),
            }
        }
        Ok(loaded)
    }

    pub fn insert(&mut self, language: Language, key: &str, value: &str) {
        self.tables
            .entry(language)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Translate `key` into the selected language
    pub fn lookup(&self, key: &str) -> String {
        if let Some(value) = self.get(self.language, key) {
            return value.to_string();
        }
        if self.language != Language::English {
            if let Some(value) = self.get(Language::English, key) {
                log::debug!("No {} translation for '{}', using English", self.language, key);
                return value.to_string();
            }
        }
        log::warn!("Missing translation key '{}'", key);
        key.to_string()
    }

    fn get(&self, language: Language, key: &str) -> Option<&str> {
        self.tables
            .get(&language)
            .and_then(|table| table.get(key))
            .map(|s| s.as_str())
    }
}
