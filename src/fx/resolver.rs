//! Rate resolution trait and conversion helpers

use crate::currency::Currency;

/// Resolves multiplicative exchange rates
///
/// Implementations are total: a missing pair resolves to `1.0` (with a
/// warning) instead of an error, so a display never fails to render over
/// incomplete configuration.
pub trait RateResolver: Send + Sync {
    /// Rate such that `to_amount = from_amount * rate`
    fn rate(&self, from: Currency, to: Currency) -> f64;

    /// Convert a single amount
    fn convert(&self, amount: f64, from: Currency, to: Currency) -> f64 {
        amount * self.rate(from, to)
    }

    /// Resolve several pairs at once
    fn rates(&self, pairs: &[(Currency, Currency)]) -> Vec<f64> {
        pairs.iter().map(|(from, to)| self.rate(*from, *to)).collect()
    }
}

/// Convert an amount between currencies
pub fn convert_amount<R: RateResolver + ?Sized>(
    resolver: &R,
    amount: f64,
    from: Currency,
    to: Currency,
) -> f64 {
    resolver.convert(amount, from, to)
}

/// Convert a batch of amounts, each in its own currency, into `to`
pub fn convert_amounts<R: RateResolver + ?Sized>(
    resolver: &R,
    amounts: &[(f64, Currency)],
    to: Currency,
) -> Vec<f64> {
    amounts
        .iter()
        .map(|(amount, from)| resolver.convert(*amount, *from, to))
        .collect()
}
