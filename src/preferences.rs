//! Durable client preferences (selected currency and UI language)
//!
//! Values live in a string key/value store and are validated against the
//! supported sets every time they are read back.

use crate::currency::{Currency, DEFAULT_CURRENCY};
use crate::error::{OptibillError, Result};
use crate::i18n::Language;
use hashbrown::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage key for the selected display currency
pub const CURRENCY_KEY: &str = "optibill.currency";

/// Storage key for the selected UI language
pub const LANGUAGE_KEY: &str = "optibill.language";

/// Durable string key/value storage
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store, used in tests and when no profile directory exists
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| OptibillError::Storage(format!("Store lock poisoned: {}", e)))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| OptibillError::Storage(format!("Store lock poisoned: {}", e)))?;
        values.remove(key);
        Ok(())
    }
}

/// JSON-object file store
///
/// The whole file is rewritten on every `set`; preference files hold a
/// handful of keys.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(values) => values.get(key).cloned(),
            Err(e) => {
                log::warn!(
                    "Failed to read preferences from {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// Validated preference values, read once at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub currency: Currency,
    pub language: Language,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY,
            language: Language::default(),
        }
    }
}

impl Preferences {
    /// Read and validate stored values, falling back to defaults
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self::load_with_defaults(store, Self::default())
    }

    /// Read and validate stored values, falling back to `defaults`
    pub fn load_with_defaults(store: &dyn PreferenceStore, defaults: Preferences) -> Self {
        let currency = match store.get(CURRENCY_KEY) {
            Some(code) => Currency::from_code(&code).unwrap_or_else(|| {
                log::warn!(
                    "Stored currency '{}' is not supported, using {}",
                    code,
                    defaults.currency
                );
                defaults.currency
            }),
            None => defaults.currency,
        };

        let language = match store.get(LANGUAGE_KEY) {
            Some(code) => Language::from_code(&code).unwrap_or_else(|| {
                log::warn!(
                    "Stored language '{}' is not supported, using {}",
                    code,
                    defaults.language
                );
                defaults.language
            }),
            None => defaults.language,
        };

        Self { currency, language }
    }

    pub fn save_currency(store: &dyn PreferenceStore, currency: Currency) -> Result<()> {
        store.set(CURRENCY_KEY, currency.code())
    }

    pub fn save_language(store: &dyn PreferenceStore, language: Language) -> Result<()> {
        store.set(LANGUAGE_KEY, language.code())
    }
}
