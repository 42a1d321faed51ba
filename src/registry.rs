//! Currency registry: monetary display values and their live conversion
//!
//! Every element that shows an amount registers it here under a stable id.
//! The registry keeps the original amount, converts everything into the
//! selected currency, and republishes the whole [`ConversionSnapshot`]
//! whenever the selection or any entry changes.
//!
//! The registry is an explicit context object: construct one at start-up,
//! hand `&mut` access to whatever renders amounts, and call
//! [`CurrencyRegistry::reset`] on logout.
//!
//! Recompute is a full rebuild over all entries. Entry counts are in the
//! dozens (one per visible price), so O(n) per mutation is cheaper than
//! tracking which converted values a change invalidates.
//!
//! # Example
//!
//! ```rust
//! use optibill::currency::Currency;
//! use optibill::registry::CurrencyRegistry;
//!
//! let mut registry = CurrencyRegistry::in_memory();
//! registry.select(Currency::USD);
//! registry.register_value("prod_price_42", 30.0);
//!
//! assert!(registry.set_currency("INR"));
//! assert_eq!(registry.converted("prod_price_42"), Some(30.0 * 83.0));
//!
//! // Unknown codes leave the selection alone
//! assert!(!registry.set_currency("XYZ"));
//! assert_eq!(registry.selected(), Currency::INR);
//! ```

use crate::currency::{Currency, BASE_CURRENCY, DEFAULT_CURRENCY};
use crate::format::format_optional;
use crate::fx::{RateResolver, RateTable};
use crate::preferences::{MemoryStore, PreferenceStore, Preferences};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Converted amounts in the selected currency, keyed by entry id
pub type ConversionSnapshot = HashMap<String, f64>;

type Listener = Box<dyn FnMut(&ConversionSnapshot, Currency)>;

/// A registered monetary display value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryEntry {
    /// Caller-chosen stable key, e.g. `prod_price_42`
    pub id: String,
    /// Amount as registered, in `entered_in`
    pub value: f64,
    /// User-entered amount typed in the then-selected currency
    pub is_dynamic: bool,
    /// Currency `value` is expressed in; USD for non-dynamic entries
    pub entered_in: Currency,
}

impl MonetaryEntry {
    /// Amount normalised to the base currency
    pub fn base_amount(&self, rates: &dyn RateResolver) -> f64 {
        if self.entered_in == BASE_CURRENCY {
            self.value
        } else {
            self.value / rates.rate(BASE_CURRENCY, self.entered_in)
        }
    }

    /// Amount in `target`
    pub fn convert(&self, rates: &dyn RateResolver, target: Currency) -> f64 {
        self.base_amount(rates) * rates.rate(BASE_CURRENCY, target)
    }
}

/// Holds every registered amount and its conversion into the selected currency
pub struct CurrencyRegistry {
    rates: Arc<dyn RateResolver>,
    store: Arc<dyn PreferenceStore>,
    fallback: Currency,
    selected: Currency,
    entries: HashMap<String, MonetaryEntry>,
    snapshot: ConversionSnapshot,
    revision: u64,
    listeners: Vec<Listener>,
}

impl CurrencyRegistry {
    /// Create a registry, restoring the persisted currency from `store`
    pub fn new(rates: Arc<dyn RateResolver>, store: Arc<dyn PreferenceStore>) -> Self {
        Self::with_default_currency(rates, store, DEFAULT_CURRENCY)
    }

    /// Like [`CurrencyRegistry::new`], with `fallback` used when nothing
    /// valid has been persisted yet
    pub fn with_default_currency(
        rates: Arc<dyn RateResolver>,
        store: Arc<dyn PreferenceStore>,
        fallback: Currency,
    ) -> Self {
        let selected = stored_currency(store.as_ref(), fallback);
        log::debug!("Currency registry starting with {}", selected);

        Self {
            rates,
            store,
            fallback,
            selected,
            entries: HashMap::new(),
            snapshot: HashMap::new(),
            revision: 0,
            listeners: Vec::new(),
        }
    }

    /// Registry over the built-in rate table and a process-local store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(RateTable::default()), Arc::new(MemoryStore::new()))
    }

    /// Register an amount expressed in the base currency
    ///
    /// Returns `false` when the id is already registered with a
    /// bit-identical amount; nothing is recomputed in that case.
    pub fn register_value(&mut self, id: &str, base_value: f64) -> bool {
        if let Some(existing) = self.entries.get(id) {
            if !existing.is_dynamic && existing.value.to_bits() == base_value.to_bits() {
                return false;
            }
        }

        self.entries.insert(
            id.to_string(),
            MonetaryEntry {
                id: id.to_string(),
                value: base_value,
                is_dynamic: false,
                entered_in: BASE_CURRENCY,
            },
        );
        self.recompute();
        true
    }

    /// Register a user-entered amount expressed in the selected currency
    ///
    /// Always overwrites. The entry remembers which currency was selected
    /// when it was typed, so later currency switches convert from that
    /// currency instead of re-deriving the base from the current one.
    pub fn register_dynamic(&mut self, id: &str, value: f64) {
        self.entries.insert(
            id.to_string(),
            MonetaryEntry {
                id: id.to_string(),
                value,
                is_dynamic: true,
                entered_in: self.selected,
            },
        );
        self.recompute();
    }

    /// Drop an entry whose display element has gone away
    pub fn unregister(&mut self, id: &str) -> bool {
        if self.entries.remove(id).is_some() {
            self.recompute();
            true
        } else {
            false
        }
    }

    /// Select a currency by ISO code
    ///
    /// Codes outside the supported set are ignored and `false` is returned.
    pub fn set_currency(&mut self, code: &str) -> bool {
        match Currency::from_code(code) {
            Some(currency) => {
                self.select(currency);
                true
            }
            None => {
                log::warn!("Ignoring unsupported currency code '{}'", code);
                false
            }
        }
    }

    /// Select a currency, persist it and reconvert every entry
    pub fn select(&mut self, currency: Currency) {
        if let Err(e) = Preferences::save_currency(self.store.as_ref(), currency) {
            log::warn!("Failed to persist currency {}: {}", currency, e);
        }

        if currency != self.selected {
            log::info!("Display currency changed {} -> {}", self.selected, currency);
            self.selected = currency;
            self.recompute();
        }
    }

    pub fn selected(&self) -> Currency {
        self.selected
    }

    /// Converted amount for `id`, or the raw registered amount before the
    /// first recompute; `None` for unknown ids
    pub fn converted(&self, id: &str) -> Option<f64> {
        self.snapshot
            .get(id)
            .copied()
            .or_else(|| self.entries.get(id).map(|entry| entry.value))
    }

    /// Converted amount for `id`, formatted in the selected currency
    pub fn format_entry(&self, id: &str, show_plus: bool) -> String {
        self.format_currency(self.converted(id), show_plus)
    }

    /// Format an amount already in the selected currency
    ///
    /// Missing or non-finite amounts render as zero.
    pub fn format_currency(&self, value: Option<f64>, show_plus: bool) -> String {
        format_optional(value, self.selected, show_plus)
    }

    /// Convert an amount typed in the selected currency to the base currency
    pub fn to_base(&self, amount: f64) -> f64 {
        amount / self.rates.rate(BASE_CURRENCY, self.selected)
    }

    /// Convert a base-currency amount into the selected currency
    pub fn from_base(&self, amount: f64) -> f64 {
        amount * self.rates.rate(BASE_CURRENCY, self.selected)
    }

    pub fn snapshot(&self) -> &ConversionSnapshot {
        &self.snapshot
    }

    pub fn entry(&self, id: &str) -> Option<&MonetaryEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recomputes so far; unchanged means nothing was republished
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Call `listener` with the new snapshot after every recompute
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ConversionSnapshot, Currency) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Logout: forget every entry and subscriber, restore the stored currency
    pub fn reset(&mut self) {
        self.entries.clear();
        self.snapshot.clear();
        self.listeners.clear();
        self.selected = stored_currency(self.store.as_ref(), self.fallback);
        self.revision += 1;
        log::debug!("Currency registry reset");
    }

    fn recompute(&mut self) {
        let rates = self.rates.as_ref();
        let selected = self.selected;

        self.snapshot = self
            .entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.convert(rates, selected)))
            .collect();
        self.revision += 1;

        log::trace!(
            "Recomputed {} entries in {} (revision {})",
            self.snapshot.len(),
            selected,
            self.revision
        );

        for listener in self.listeners.iter_mut() {
            listener(&self.snapshot, selected);
        }
    }
}

fn stored_currency(store: &dyn PreferenceStore, fallback: Currency) -> Currency {
    let defaults = Preferences {
        currency: fallback,
        ..Preferences::default()
    };
    Preferences::load_with_defaults(store, defaults).currency
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for CurrencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrencyRegistry")
            .field("selected", &self.selected)
            .field("entries", &self.entries.len())
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
