//! Locale-aware currency formatting
//!
//! Formatting never fails: non-finite or missing input renders as zero.

use crate::currency::{Currency, Grouping};

/// Format an amount in `currency`'s locale
///
/// `show_plus` prefixes `+` on strictly positive amounts, which the invoice
/// views use for adjustments and refunds.
pub fn format_amount(value: f64, currency: Currency, show_plus: bool) -> String {
    let value = sanitize(value);
    let digits = currency.fraction_digits();

    let rendered = format!("{:.*}", digits, value.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut body = group_digits(integer, currency.grouping(), currency.group_separator());
    if let Some(fraction) = fraction {
        body.push(currency.decimal_separator());
        body.push_str(fraction);
    }

    // Rounding may collapse a tiny negative to zero; don't print "-0.00"
    let is_zero = rendered.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !is_zero {
        "-"
    } else if show_plus && value > 0.0 && !is_zero {
        "+"
    } else {
        ""
    };

    if symbol_trails(currency) {
        format!("{}{} {}", sign, body, currency.symbol())
    } else {
        format!("{}{}{}", sign, currency.symbol(), body)
    }
}

/// Format a possibly-missing amount; `None` renders as zero
pub fn format_optional(value: Option<f64>, currency: Currency, show_plus: bool) -> String {
    format_amount(value.unwrap_or(0.0), currency, show_plus)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn symbol_trails(currency: Currency) -> bool {
    matches!(currency, Currency::EUR)
}

fn group_digits(integer: &str, grouping: Grouping, separator: char) -> String {
    let digits: Vec<char> = integer.chars().collect();
    if digits.len() <= 3 {
        return integer.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let head_group = match grouping {
        Grouping::Thousands => 3,
        Grouping::Indian => 2,
    };

    let mut groups: Vec<String> = head
        .rchunks(head_group)
        .map(|chunk| chunk.iter().collect())
        .collect();
    groups.reverse();
    groups.push(tail.iter().collect());

    groups.join(&separator.to_string())
}
