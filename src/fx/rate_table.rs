//! USD-pivoted rate table
//!
//! Stores units of each currency per 1 USD. Cross rates are always derived
//! through USD, so a table of N entries answers every N x N pair.

use super::resolver::RateResolver;
use crate::currency::{Currency, BASE_CURRENCY};
use crate::error::{OptibillError, Result};
use hashbrown::HashMap;
use serde::Deserialize;
use std::io::Read;

/// Built-in rates, units per 1 USD
pub const DEFAULT_RATES: &[(Currency, f64)] = &[
    (Currency::USD, 1.0),
    (Currency::INR, 83.0),
    (Currency::EUR, 0.92),
    (Currency::GBP, 0.79),
    (Currency::AED, 3.67),
    (Currency::AUD, 1.52),
    (Currency::CAD, 1.36),
    (Currency::SGD, 1.34),
    (Currency::JPY, 150.0),
];

/// Read-only table of rates against the base currency
///
/// # Example
/// ```
/// use optibill::currency::Currency;
/// use optibill::fx::{RateResolver, RateTable};
///
/// let table = RateTable::from_pairs([(Currency::EUR, 0.5)]).unwrap();
///
/// // USD is not in the table, but USD -> EUR still resolves directly
/// assert_eq!(table.rate(Currency::USD, Currency::EUR), 0.5);
/// assert_eq!(table.rate(Currency::EUR, Currency::USD), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: HashMap<Currency, f64>,
}

#[derive(Debug, Deserialize)]
struct RateRow {
    currency: String,
    rate: f64,
}

impl RateTable {
    /// Create an empty table (every lookup falls back to 1.0)
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Build from (currency, units per USD) pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Currency, f64)>,
    {
        let mut table = Self::empty();
        for (currency, rate) in pairs {
            table.set_rate(currency, rate)?;
        }
        Ok(table)
    }

    /// Load a table from CSV with a `currency,rate` header
    ///
    /// Lines for currencies outside the supported set are rejected rather
    /// than skipped, so a typo in a rates file shows up at start-up.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut table = Self::empty();
        for row in csv_reader.deserialize() {
            let row: RateRow = row?;
            let currency: Currency = row.currency.parse()?;
            table.set_rate(currency, row.rate)?;
        }

        log::debug!("Loaded {} rates from CSV", table.len());
        Ok(table)
    }

    /// Insert or replace a rate
    ///
    /// Rates must be positive and finite; anything else would poison every
    /// pivoted cross rate.
    pub fn set_rate(&mut self, currency: Currency, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(OptibillError::InvalidRate {
                currency: currency.code().to_string(),
                rate,
            });
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// Overlay another table's entries onto this one
    pub fn merge(mut self, overrides: &RateTable) -> Self {
        for (currency, rate) in &overrides.rates {
            self.rates.insert(*currency, *rate);
        }
        self
    }

    /// Units of `currency` per 1 USD
    pub fn get(&self, currency: Currency) -> Option<f64> {
        self.rates.get(&currency).copied()
    }

    pub fn contains(&self, currency: Currency) -> bool {
        self.rates.contains_key(&currency)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Currencies present in the table, in enumeration order
    pub fn currencies(&self) -> Vec<Currency> {
        Currency::all()
            .iter()
            .copied()
            .filter(|c| self.contains(*c))
            .collect()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_RATES.iter().copied().collect(),
        }
    }
}

impl RateResolver for RateTable {
    fn rate(&self, from: Currency, to: Currency) -> f64 {
        if from == to {
            return 1.0;
        }

        match (self.get(from), self.get(to)) {
            (Some(from_rate), Some(to_rate)) => (1.0 / from_rate) * to_rate,
            (_, Some(to_rate)) if from == BASE_CURRENCY => to_rate,
            (Some(from_rate), _) if to == BASE_CURRENCY => 1.0 / from_rate,
            _ => {
                log::warn!(
                    "No exchange rate for {}/{}, using 1.0",
                    from.code(),
                    to.code()
                );
                1.0
            }
        }
    }
}
