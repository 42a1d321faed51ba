//! Application configuration (TOML)
//!
//! ```toml
//! default_currency = "INR"
//! default_language = "en"
//! api_base_url = "http://localhost:5000/api"
//! fetch_timeout_secs = 30
//! rates_csv = "/etc/optibill/rates.csv"
//!
//! [rates]
//! INR = 83.25
//! ```

#[cfg(feature = "async")]
use crate::api::{FetchScope, HttpDataApi};
use crate::currency::{Currency, DEFAULT_CURRENCY};
use crate::error::{OptibillError, Result};
use crate::fx::RateTable;
use crate::i18n::Language;
use crate::preferences::{FileStore, Preferences};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub rates_csv: Option<PathBuf>,
    /// Units per 1 USD, overriding the built-in table
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".optibill")
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.code().to_string()
}

fn default_language() -> String {
    Language::default().code().to_string()
}

fn default_preferences_path() -> PathBuf {
    config_dir().join("preferences.json")
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            default_language: default_language(),
            preferences_path: default_preferences_path(),
            api_base_url: default_api_base_url(),
            fetch_timeout_secs: default_fetch_timeout(),
            rates_csv: None,
            rates: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Default location, `~/.optibill/config.toml`
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| OptibillError::Config(e.to_string()))
    }

    /// Load from `path`, or the default location when `None`
    ///
    /// A missing or unreadable file yields the defaults; problems are
    /// logged, never fatal.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to parse config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Defaults to apply when no preference has been stored yet
    pub fn default_preferences(&self) -> Preferences {
        let currency = Currency::from_code(&self.default_currency).unwrap_or_else(|| {
            log::warn!(
                "Configured currency '{}' is not supported, using {}",
                self.default_currency,
                DEFAULT_CURRENCY
            );
            DEFAULT_CURRENCY
        });
        let language = Language::from_code(&self.default_language).unwrap_or_else(|| {
            log::warn!(
                "Configured language '{}' is not supported, using {}",
                self.default_language,
                Language::default()
            );
            Language::default()
        });
        Preferences { currency, language }
    }

    /// Built-in rates, overlaid with `rates_csv` and then `[rates]`
    pub fn rate_table(&self) -> Result<RateTable> {
        let mut table = RateTable::default();

        if let Some(csv_path) = &self.rates_csv {
            let file = fs::File::open(csv_path)?;
            table = table.merge(&RateTable::from_csv(file)?);
        }

        if !self.rates.is_empty() {
            let overrides = self
                .rates
                .iter()
                .map(|(code, rate)| Ok((code.parse::<Currency>()?, *rate)))
                .collect::<Result<Vec<_>>>()?;
            table = table.merge(&RateTable::from_pairs(overrides)?);
        }

        Ok(table)
    }

    pub fn preference_store(&self) -> FileStore {
        FileStore::new(&self.preferences_path)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// HTTP client for `api_base_url`, bounded by `fetch_timeout_secs`
    #[cfg(feature = "async")]
    pub fn http_api(&self) -> Result<HttpDataApi> {
        if self.api_base_url.trim().is_empty() {
            return Err(OptibillError::Config("api_base_url is empty".to_string()));
        }
        HttpDataApi::new(&self.api_base_url, self.fetch_timeout())
    }

    /// Fetch scope bounded by `fetch_timeout_secs`
    #[cfg(feature = "async")]
    pub fn fetch_scope(&self) -> FetchScope {
        FetchScope::with_timeout(self.fetch_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::RateResolver;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.default_currency, "INR");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.default_preferences(), Preferences::default());
        assert_eq!(config.rate_table().unwrap(), RateTable::default());
    }

    #[test]
    fn test_rate_overrides() {
        let config = AppConfig::from_toml_str(
            r#"
            default_currency = "usd"

            [rates]
            INR = 90.0
            "#,
        )
        .unwrap();

        assert_eq!(config.default_preferences().currency, Currency::USD);
        let table = config.rate_table().unwrap();
        assert_eq!(table.rate(Currency::USD, Currency::INR), 90.0);
    }

    #[test]
    fn test_bad_rate_override_is_error() {
        let config = AppConfig::from_toml_str("[rates]\nXYZ = 2.0\n").unwrap();
        assert!(config.rate_table().is_err());

        let config = AppConfig::from_toml_str("[rates]\nEUR = -2.0\n").unwrap();
        assert!(config.rate_table().is_err());
    }

    #[test]
    fn test_rates_csv_then_inline() {
        let mut csv = NamedTempFile::new().unwrap();
        writeln!(csv, "currency,rate\nINR,85\nEUR,0.95").unwrap();

        let config = AppConfig {
            rates_csv: Some(csv.path().to_path_buf()),
            rates: [("EUR".to_string(), 0.9)].into_iter().collect(),
            ..AppConfig::default()
        };

        let table = config.rate_table().unwrap();
        assert_eq!(table.get(Currency::INR), Some(85.0));
        assert_eq!(table.get(Currency::EUR), Some(0.9));
        assert_eq!(table.get(Currency::GBP), Some(0.79));
    }

    #[test]
    fn test_unsupported_defaults_fall_back() {
        let config = AppConfig {
            default_currency: "ZZZ".into(),
            default_language: "tlh".into(),
            ..AppConfig::default()
        };
        assert_eq!(config.default_preferences(), Preferences::default());
    }

    #[test]
    fn test_load_missing_and_corrupt_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(AppConfig::load(Some(&missing)), AppConfig::default());

        let corrupt = dir.path().join("bad.toml");
        fs::write(&corrupt, "default_currency = [").unwrap();
        assert_eq!(AppConfig::load(Some(&corrupt)), AppConfig::default());

        let good = dir.path().join("good.toml");
        fs::write(&good, "fetch_timeout_secs = 5\n").unwrap();
        assert_eq!(AppConfig::load(Some(&good)).fetch_timeout_secs, 5);
    }

    #[cfg(feature = "async")]
    #[test]
    fn test_http_api_from_config() {
        let config = AppConfig::from_toml_str(
            r#"
            api_base_url = "http://billing.local:8080/api/"
            fetch_timeout_secs = 7
            "#,
        )
        .unwrap();

        let api = config.http_api().unwrap();
        assert_eq!(api.base_url(), "http://billing.local:8080/api");

        let blank = AppConfig {
            api_base_url: "  ".into(),
            ..AppConfig::default()
        };
        assert!(matches!(blank.http_api(), Err(OptibillError::Config(_))));
    }
}
