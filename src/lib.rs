//! # optibill
//!
//! Billing core for an optical retail practice: multi-currency display of
//! prices with live re-conversion, locale-aware formatting, sales analytics
//! over invoices, and the records exchanged with the practice data API.
//!
//! ## Example
//!
//! ```rust
//! use optibill::prelude::*;
//!
//! let mut registry = CurrencyRegistry::in_memory();
//! registry.select(Currency::USD);
//! registry.register_value("prod_price_42", 30.0);
//! assert_eq!(registry.format_entry("prod_price_42", false), "$30.00");
//!
//! let products = vec![Product::new("42", "Titanium frame", 30.0)];
//! let invoices = vec![Invoice::new(
//!     "inv-1",
//!     InvoiceStatus::Paid,
//!     vec![InvoiceItem::new("42", 3)],
//! )];
//! let best = best_seller(&invoices, &products, None).unwrap();
//! assert_eq!(best.units_sold, 3);
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod currency;
pub mod error;
pub mod format;
pub mod fx;
pub mod i18n;
pub mod models;
pub mod preferences;
pub mod registry;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::analytics::{best_seller, BestSeller, PriceRange};
    pub use crate::api::{DataApi, InMemoryApi};
    pub use crate::config::AppConfig;
    pub use crate::currency::{Currency, BASE_CURRENCY, DEFAULT_CURRENCY};
    pub use crate::error::{OptibillError, Result};
    pub use crate::format::format_amount;
    pub use crate::fx::{RateResolver, RateTable};
    pub use crate::i18n::{Language, Translations};
    pub use crate::models::{Invoice, InvoiceItem, InvoiceStatus, Product};
    pub use crate::preferences::{FileStore, MemoryStore, PreferenceStore, Preferences};
    pub use crate::registry::{ConversionSnapshot, CurrencyRegistry, MonetaryEntry};
    pub use crate::types::{Page, PageRequest};
}
