//! Currency types and locale display rules

use crate::error::OptibillError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base currency every stored amount is expressed in
pub const BASE_CURRENCY: Currency = Currency::USD;

/// Currency selected on first start
pub const DEFAULT_CURRENCY: Currency = Currency::INR;

/// Currencies the storefront can display (ISO 4217 codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    /// US Dollar
    USD,
    /// Indian Rupee
    INR,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// UAE Dirham
    AED,
    /// Australian Dollar
    AUD,
    /// Canadian Dollar
    CAD,
    /// Singapore Dollar
    SGD,
    /// Japanese Yen
    JPY,
}

/// How the integer part of an amount is grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// 1,234,567
    Thousands,
    /// 12,34,567 (lakh/crore)
    Indian,
}

impl Currency {
    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::INR => "INR",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::AED => "AED",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::SGD => "SGD",
            Currency::JPY => "JPY",
        }
    }

    /// Symbol as shown in this currency's own [`locale`](Currency::locale)
    ///
    /// Dollar currencies outside the US render a bare `$` in their home
    /// locale. AED is written as its code; amounts always use Latin digits.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::INR => "₹",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::AED => "AED ",
            Currency::AUD => "$",
            Currency::CAD => "$",
            Currency::SGD => "$",
            Currency::JPY => "￥",
        }
    }

    /// BCP 47 locale used when formatting amounts in this currency
    pub fn locale(&self) -> &'static str {
        match self {
            Currency::USD => "en-US",
            Currency::INR => "en-IN",
            Currency::EUR => "de-DE",
            Currency::GBP => "en-GB",
            Currency::AED => "ar-AE",
            Currency::AUD => "en-AU",
            Currency::CAD => "en-CA",
            Currency::SGD => "en-SG",
            Currency::JPY => "ja-JP",
        }
    }

    /// Minor unit digits shown after the decimal separator
    pub fn fraction_digits(&self) -> usize {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            Currency::EUR => ',',
            _ => '.',
        }
    }

    pub fn group_separator(&self) -> char {
        match self {
            Currency::EUR => '.',
            _ => ',',
        }
    }

    pub fn grouping(&self) -> Grouping {
        match self {
            Currency::INR => Grouping::Indian,
            _ => Grouping::Thousands,
        }
    }

    /// Parse from ISO code (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "INR" => Some(Currency::INR),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "AED" => Some(Currency::AED),
            "AUD" => Some(Currency::AUD),
            "CAD" => Some(Currency::CAD),
            "SGD" => Some(Currency::SGD),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }

    /// Get all supported currencies
    pub fn all() -> &'static [Currency] {
        &[
            Currency::USD,
            Currency::INR,
            Currency::EUR,
            Currency::GBP,
            Currency::AED,
            Currency::AUD,
            Currency::CAD,
            Currency::SGD,
            Currency::JPY,
        ]
    }
}

impl Default for Currency {
    fn default() -> Self {
        DEFAULT_CURRENCY
    }
}

impl FromStr for Currency {
    type Err = OptibillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| OptibillError::UnknownCurrency(s.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
