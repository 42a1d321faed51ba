//! Data API fetches bound to a cancellable scope

#![cfg(feature = "async")]

use optibill::analytics::best_seller;
use optibill::api::{DataApi, FetchScope, InMemoryApi};
use optibill::config::AppConfig;
use optibill::error::{OptibillError, Result};
use optibill::models::{Customer, Invoice, InvoiceItem, InvoiceStatus, Patient, Prescription, Product};
use optibill::types::{Page, PageRequest};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// In-memory records served after a fixed delay
struct SlowApi {
    inner: InMemoryApi,
    delay: Duration,
}

impl DataApi for SlowApi {
    fn get_patients(&self) -> impl Future<Output = Result<Vec<Patient>>> + Send {
        async move {
            tokio::time::sleep(self.delay).await;
            self.inner.get_patients().await
        }
    }

    fn get_customers(&self) -> impl Future<Output = Result<Vec<Customer>>> + Send {
        async move {
            tokio::time::sleep(self.delay).await;
            self.inner.get_customers().await
        }
    }

    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>>> + Send {
        async move {
            tokio::time::sleep(self.delay).await;
            self.inner.get_products().await
        }
    }

    fn get_invoices(&self) -> impl Future<Output = Result<Vec<Invoice>>> + Send {
        async move {
            tokio::time::sleep(self.delay).await;
            self.inner.get_invoices().await
        }
    }

    fn get_prescriptions(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Prescription>>> + Send {
        async move {
            tokio::time::sleep(self.delay).await;
            self.inner.get_prescriptions(request).await
        }
    }
}

fn shop() -> InMemoryApi {
    InMemoryApi::default()
        .with_products(vec![
            Product::new("A", "Round frame", 30.0),
            Product::new("S", "Sunglasses", 95.0),
        ])
        .with_invoices(vec![
            Invoice::new("1", InvoiceStatus::Paid, vec![InvoiceItem::new("A", 2)]),
            Invoice::new("2", InvoiceStatus::Paid, vec![InvoiceItem::new("S", 4)]),
        ])
}

fn slow(delay: Duration) -> SlowApi {
    SlowApi {
        inner: shop(),
        delay,
    }
}

#[tokio::test]
async fn test_fetches_complete_inside_scope() {
    let api = shop();
    let scope = AppConfig::default().fetch_scope();

    let products = scope.run("products", api.get_products()).await.unwrap();
    let invoices = scope.run("invoices", api.get_invoices()).await.unwrap();

    let best = best_seller(&invoices, &products, None).unwrap();
    assert_eq!(best.product.id, "S");
    assert_eq!(best.units_sold, 4);
}

#[tokio::test]
async fn test_dropping_scope_cancels_pending_fetch() {
    let api = Arc::new(slow(Duration::from_secs(30)));
    let scope = FetchScope::new();

    let fetching = Arc::clone(&api);
    let handle = scope.spawn("products", async move { fetching.get_products().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    drop(scope);

    match handle.await.unwrap() {
        Err(OptibillError::Cancelled(resource)) => assert_eq!(resource, "products"),
        other => panic!("expected cancellation, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_cancel_interrupts_running_fetch() {
    let api = slow(Duration::from_secs(30));
    let scope = FetchScope::new();

    let (result, _) = tokio::join!(scope.run("invoices", api.get_invoices()), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        scope.cancel();
    });

    assert!(matches!(result, Err(OptibillError::Cancelled(r)) if r == "invoices"));
}

#[tokio::test]
async fn test_slow_api_hits_scope_timeout() {
    let api = slow(Duration::from_secs(30));
    let scope = FetchScope::with_timeout(Duration::from_millis(50));

    let result = scope
        .run("prescriptions", api.get_prescriptions(PageRequest::default()))
        .await;

    match result {
        Err(OptibillError::Timeout { resource, after }) => {
            assert_eq!(resource, "prescriptions");
            assert_eq!(after, Duration::from_millis(50));
        }
        other => panic!("expected timeout, got {:?}", other.map(|p| p.total)),
    }
}

#[tokio::test]
async fn test_fast_fetch_beats_timeout() {
    let api = slow(Duration::from_millis(5));
    let scope = FetchScope::with_timeout(Duration::from_secs(5));

    let patients = scope.run("patients", api.get_patients()).await.unwrap();
    assert!(patients.is_empty());
}
