//! Practice data API
//!
//! The storefront reads its records from a REST-style service. This module
//! describes that service as a trait, with an in-memory implementation for
//! fixtures and tests and (feature `async`) an HTTP client plus cancellable
//! fetch scopes.

#[cfg(feature = "async")]
pub mod http;
#[cfg(feature = "async")]
pub mod scope;

#[cfg(feature = "async")]
pub use http::HttpDataApi;
#[cfg(feature = "async")]
pub use scope::FetchScope;

use crate::error::Result;
use crate::models::{Customer, Invoice, Patient, Prescription, Product};
use crate::types::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::Path;

/// `GET /patients` envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientsResponse {
    #[serde(default)]
    pub patients: Vec<Patient>,
}

/// `GET /customers` envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomersResponse {
    #[serde(default)]
    pub customers: Vec<Customer>,
}

/// `GET /prescriptions?page=&limit=` envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionsResponse {
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
    #[serde(default)]
    pub total: Option<usize>,
}

impl PrescriptionsResponse {
    pub fn into_page(self) -> Page<Prescription> {
        let total = self.total.unwrap_or(self.prescriptions.len());
        Page::new(self.prescriptions, total)
    }
}

/// Read access to the practice records
pub trait DataApi: Send + Sync {
    fn get_patients(&self) -> impl Future<Output = Result<Vec<Patient>>> + Send;

    fn get_customers(&self) -> impl Future<Output = Result<Vec<Customer>>> + Send;

    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>>> + Send;

    fn get_invoices(&self) -> impl Future<Output = Result<Vec<Invoice>>> + Send;

    fn get_prescriptions(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Prescription>>> + Send;
}

/// Fixture-backed data API
///
/// Also loadable from a single JSON document holding every collection,
/// which is how the CLI reads exported data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryApi {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_invoices(mut self, invoices: Vec<Invoice>) -> Self {
        self.invoices = invoices;
        self
    }

    pub fn with_patients(mut self, patients: Vec<Patient>) -> Self {
        self.patients = patients;
        self
    }

    pub fn with_prescriptions(mut self, prescriptions: Vec<Prescription>) -> Self {
        self.prescriptions = prescriptions;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let api = Self::from_json(&contents)?;
        log::debug!(
            "Loaded {} products and {} invoices from {}",
            api.products.len(),
            api.invoices.len(),
            path.as_ref().display()
        );
        Ok(api)
    }
}

impl DataApi for InMemoryApi {
    fn get_patients(&self) -> impl Future<Output = Result<Vec<Patient>>> + Send {
        let patients = self.patients.clone();
        async move { Ok(patients) }
    }

    fn get_customers(&self) -> impl Future<Output = Result<Vec<Customer>>> + Send {
        let customers = self.customers.clone();
        async move { Ok(customers) }
    }

    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>>> + Send {
        let products = self.products.clone();
        async move { Ok(products) }
    }

    fn get_invoices(&self) -> impl Future<Output = Result<Vec<Invoice>>> + Send {
        let invoices = self.invoices.clone();
        async move { Ok(invoices) }
    }

    fn get_prescriptions(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Prescription>>> + Send {
        let page = request.apply(&self.prescriptions);
        async move { Ok(page) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceItem, InvoiceStatus};

    fn fixture() -> &'static str {
        r#"{
            "products": [{"id": "A", "name": "Frame", "price": 30.0}],
            "invoices": [{"id": "1", "status": "Paid", "items": [{"productId": "A", "quantity": 5}]}],
            "prescriptions": [
                {"id": "rx1", "patientId": "p1"},
                {"id": "rx2", "patientId": "p1"},
                {"id": "rx3", "patientId": "p2"}
            ]
        }"#
    }

    #[test]
    fn test_from_json_defaults_missing_collections() {
        let api = InMemoryApi::from_json(fixture()).unwrap();
        assert_eq!(api.products.len(), 1);
        assert!(api.patients.is_empty());
        assert!(api.customers.is_empty());
    }

    #[test]
    fn test_prescriptions_envelope() {
        let response: PrescriptionsResponse =
            serde_json::from_str(r#"{"prescriptions": [{"id": "rx1", "patientId": "p1"}]}"#).unwrap();
        let page = response.into_page();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].patient_id, "p1");
    }

    #[tokio::test]
    async fn test_in_memory_api() {
        let api = InMemoryApi::from_json(fixture()).unwrap();

        let products = api.get_products().await.unwrap();
        assert_eq!(products[0].id, "A");

        let invoices = api.get_invoices().await.unwrap();
        assert_eq!(invoices[0].items, vec![InvoiceItem::new("A", 5)]);
        assert_eq!(invoices[0].status, InvoiceStatus::Paid);

        let page = api.get_prescriptions(PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "rx3");
    }

    #[tokio::test]
    async fn test_builder() {
        let api = InMemoryApi::new().with_products(vec![Product::new("X", "Case", 4.0)]);
        assert_eq!(api.get_products().await.unwrap().len(), 1);
        assert!(api.get_patients().await.unwrap().is_empty());
        assert!(api.get_customers().await.unwrap().is_empty());
    }
}
