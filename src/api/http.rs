//! HTTP client for the practice data API

use super::{CustomersResponse, DataApi, PatientsResponse, PrescriptionsResponse};
use crate::error::{OptibillError, Result};
use crate::models::{Customer, Invoice, Patient, Prescription, Product};
use crate::types::{Page, PageRequest};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// REST client; every request is bounded by the client timeout
#[derive(Debug, Clone)]
pub struct HttpDataApi {
    client: Client,
    base_url: String,
}

impl HttpDataApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OptibillError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str, path: String) -> Result<T> {
        let url = self.url(&path);
        log::debug!("GET {}", url);

        let fetch_error = |message: String| OptibillError::DataFetch {
            resource: resource.to_string(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("Server returned {}", response.status())));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| fetch_error(format!("Invalid response body: {}", e)))
    }
}

impl DataApi for HttpDataApi {
    fn get_patients(&self) -> impl Future<Output = Result<Vec<Patient>>> + Send {
        async move {
            let body: PatientsResponse = self.get_json("patients", "patients".to_string()).await?;
            Ok(body.patients)
        }
    }

    fn get_customers(&self) -> impl Future<Output = Result<Vec<Customer>>> + Send {
        async move {
            let body: CustomersResponse = self.get_json("customers", "customers".to_string()).await?;
            Ok(body.customers)
        }
    }

    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>>> + Send {
        self.get_json("products", "products".to_string())
    }

    fn get_invoices(&self) -> impl Future<Output = Result<Vec<Invoice>>> + Send {
        self.get_json("invoices", "invoices".to_string())
    }

    fn get_prescriptions(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Prescription>>> + Send {
        async move {
            let path = format!("prescriptions?page={}&limit={}", request.page, request.limit);
            let body: PrescriptionsResponse = self.get_json("prescriptions", path).await?;
            Ok(body.into_page())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = HttpDataApi::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8080/api");
        assert_eq!(api.url("/products"), "http://localhost:8080/api/products");
        assert_eq!(api.url("invoices"), "http://localhost:8080/api/invoices");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_fetch_error() {
        let api = HttpDataApi::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        match api.get_products().await {
            Err(OptibillError::DataFetch { resource, .. }) => assert_eq!(resource, "products"),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }
}
