//! Foreign exchange (FX) rate resolution
//!
//! Rates are static for the life of the process: a USD-pivoted table built
//! from defaults, configuration or a CSV file at start-up.
//!
//! # Components
//!
//! - **rate_table**: the USD-pivoted table and its loaders
//! - **resolver**: the `RateResolver` trait and conversion helpers
//!
//! # Example
//!
//! ```rust
//! use optibill::currency::Currency;
//! use optibill::fx::{RateResolver, RateTable};
//!
//! let table = RateTable::default();
//!
//! // Same currency is always 1.0
//! assert_eq!(table.rate(Currency::INR, Currency::INR), 1.0);
//!
//! // USD -> INR comes straight from the table
//! let inr = table.convert(10.0, Currency::USD, Currency::INR);
//! assert!(inr > 10.0);
//! ```

pub mod rate_table;
pub mod resolver;

pub use rate_table::{RateTable, DEFAULT_RATES};
pub use resolver::{convert_amount, convert_amounts, RateResolver};
