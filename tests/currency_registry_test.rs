//! Integration tests for the currency registry
//!
//! Covers the conversion invariants across currency switches, persistence
//! through a file-backed store, and fail-soft behaviour on bad input.

use approx::assert_relative_eq;
use optibill::currency::{Currency, BASE_CURRENCY};
use optibill::fx::{RateResolver, RateTable};
use optibill::preferences::{FileStore, MemoryStore, PreferenceStore, CURRENCY_KEY};
use optibill::registry::CurrencyRegistry;
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn registry_with(table: RateTable) -> CurrencyRegistry {
    CurrencyRegistry::new(Arc::new(table), Arc::new(MemoryStore::new()))
}

#[test]
fn test_every_entry_follows_every_currency() {
    let table = RateTable::default();
    let mut registry = registry_with(table.clone());

    let prices = [("frame_1", 49.99), ("lens_7", 120.0), ("case_2", 4.5)];
    for (id, price) in prices {
        registry.register_value(id, price);
    }

    for currency in Currency::all() {
        assert!(registry.set_currency(currency.code()));
        for (id, price) in prices {
            let expected = price * table.rate(BASE_CURRENCY, *currency);
            assert_relative_eq!(registry.converted(id).unwrap(), expected, max_relative = 1e-12);
        }
    }
}

#[test]
fn test_repeated_registration_is_not_republished() {
    let mut registry = CurrencyRegistry::in_memory();
    let mut republished = 0;
    let counter = std::rc::Rc::new(std::cell::Cell::new(0));
    let seen = counter.clone();
    registry.subscribe(move |_, _| seen.set(seen.get() + 1));

    // A view re-rendering ten times with the same price
    for _ in 0..10 {
        if registry.register_value("prod_price_42", 30.0) {
            republished += 1;
        }
    }

    assert_eq!(republished, 1);
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_missing_rate_falls_back_to_raw_value() {
    // Only INR configured; EUR lookups fall back to identity
    let table = RateTable::from_pairs([(Currency::INR, 80.0)]).unwrap();
    let mut registry = registry_with(table);
    registry.register_value("frame", 10.0);

    assert!(registry.set_currency("EUR"));
    assert_relative_eq!(registry.converted("frame").unwrap(), 10.0);

    assert!(registry.set_currency("INR"));
    assert_relative_eq!(registry.converted("frame").unwrap(), 800.0);
}

#[test]
fn test_dynamic_amount_survives_currency_round_trip() {
    let mut registry = CurrencyRegistry::in_memory();
    registry.select(Currency::EUR);
    registry.register_dynamic("manual_discount", 25.0);

    for code in ["USD", "INR", "GBP", "JPY", "AED", "EUR"] {
        registry.set_currency(code);
    }

    assert_relative_eq!(
        registry.converted("manual_discount").unwrap(),
        25.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_currency_persists_across_sessions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let store = Arc::new(FileStore::new(&path));
        let mut registry = CurrencyRegistry::new(Arc::new(RateTable::default()), store);
        assert_eq!(registry.selected(), Currency::INR);
        registry.set_currency("gbp");
    }

    let store = Arc::new(FileStore::new(&path));
    assert_eq!(store.get(CURRENCY_KEY), Some("GBP".to_string()));
    let registry = CurrencyRegistry::new(Arc::new(RateTable::default()), store);
    assert_eq!(registry.selected(), Currency::GBP);
}

#[test]
fn test_tampered_preference_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    store.set(CURRENCY_KEY, "<script>").unwrap();

    let registry = CurrencyRegistry::new(Arc::new(RateTable::default()), store);
    assert_eq!(registry.selected(), Currency::INR);
}

#[test]
fn test_format_never_fails() {
    let mut registry = CurrencyRegistry::in_memory();
    assert_eq!(registry.format_currency(None, false), "₹0.00");
    assert_eq!(registry.format_currency(Some(f64::NAN), false), "₹0.00");
    assert_eq!(registry.format_currency(Some(f64::NEG_INFINITY), true), "₹0.00");

    registry.select(Currency::USD);
    assert_eq!(registry.format_currency(None, true), "$0.00");
    assert_eq!(registry.format_currency(Some(12.0), true), "+$12.00");
}

#[test]
fn test_logout_then_login() {
    let store = Arc::new(MemoryStore::new());
    let mut registry = CurrencyRegistry::new(Arc::new(RateTable::default()), store);
    registry.register_value("a", 1.0);
    registry.set_currency("USD");

    registry.reset();
    assert!(registry.is_empty());
    assert_eq!(registry.converted("a"), None);
    assert_eq!(registry.selected(), Currency::USD);

    registry.register_value("a", 2.0);
    assert_eq!(registry.converted("a"), Some(2.0));
}

fn any_currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::all().to_vec())
}

proptest! {
    #[test]
    fn prop_rate_to_self_is_one(currency in any_currency()) {
        prop_assert_eq!(RateTable::default().rate(currency, currency), 1.0);
        prop_assert_eq!(RateTable::empty().rate(currency, currency), 1.0);
    }

    #[test]
    fn prop_snapshot_matches_base_times_rate(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 1..30),
        switches in prop::collection::vec(any_currency(), 1..8),
    ) {
        let table = RateTable::default();
        let mut registry = registry_with(table.clone());
        for (i, value) in values.iter().enumerate() {
            registry.register_value(&format!("slot_{}", i), *value);
        }

        for currency in switches {
            registry.select(currency);
            prop_assert_eq!(registry.snapshot().len(), values.len());
            for (i, value) in values.iter().enumerate() {
                let expected = value * table.rate(BASE_CURRENCY, currency);
                let actual = registry.converted(&format!("slot_{}", i)).unwrap();
                prop_assert!((actual - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            }
        }
    }

    #[test]
    fn prop_unknown_code_keeps_selection(code in "[A-Z]{3}", start in any_currency()) {
        prop_assume!(Currency::from_code(&code).is_none());
        let mut registry = CurrencyRegistry::in_memory();
        registry.select(start);
        prop_assert!(!registry.set_currency(&code));
        prop_assert_eq!(registry.selected(), start);
    }

    #[test]
    fn prop_pivot_round_trip(from in any_currency(), to in any_currency()) {
        let table = RateTable::default();
        let there = table.rate(from, to);
        let back = table.rate(to, from);
        prop_assert!((there * back - 1.0).abs() < 1e-12);
    }
}
