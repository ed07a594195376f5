//! End-to-end test support for Punchcard.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server with the built-in sample seed
//! cargo run -p punchcard-server
//!
//! # Run the end-to-end tests
//! cargo test -p punchcard-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d by default because they need a running server.
//! The server resets its store on restart, so restart it between runs that
//! mutate points.
//!
//! This crate also provides [`RestStore`], a `CustomerStore` backed by the
//! HTTP API. Driving `punchcard_client::LoyaltyClient` through it exercises
//! the full stack the way the mobile shell does: device-side cache over a
//! remote store.

use async_trait::async_trait;
use reqwest::StatusCode;

use punchcard_core::{Customer, CustomerId, CustomerStore, PointsAward, StoreError};

/// Base URL for the server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("PUNCHCARD_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A [`CustomerStore`] backed by the Punchcard HTTP API.
///
/// Test support only: transport failures and unexpected statuses panic with
/// the response context instead of being folded into `StoreError`.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestStore {
    /// Create a store talking to the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a store from `PUNCHCARD_BASE_URL` (default localhost:3000).
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(base_url())
    }
}

#[async_trait]
impl CustomerStore for RestStore {
    async fn get_all(&self) -> Result<Vec<Customer>, StoreError> {
        let resp = self
            .client
            .get(format!("{}/api/customers", self.base_url))
            .send()
            .await
            .expect("GET /api/customers");
        assert_eq!(resp.status(), StatusCode::OK);
        Ok(resp.json().await.expect("customer list body"))
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, StoreError> {
        let resp = self
            .client
            .get(format!("{}/api/customers/{id}", self.base_url))
            .send()
            .await
            .expect("GET /api/customers/{id}");
        match resp.status() {
            StatusCode::OK => Ok(resp.json().await.expect("customer body")),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id)),
            status => panic!("unexpected status {status} for get_by_id"),
        }
    }

    async fn scan_random(&self) -> Result<Customer, StoreError> {
        let resp = self
            .client
            .post(format!("{}/api/customers/scan", self.base_url))
            .send()
            .await
            .expect("POST /api/customers/scan");
        match resp.status() {
            StatusCode::OK => Ok(resp.json().await.expect("customer body")),
            StatusCode::NOT_FOUND => Err(StoreError::EmptyCollection),
            status => panic!("unexpected status {status} for scan_random"),
        }
    }

    async fn add_points(
        &self,
        id: CustomerId,
        amount: u32,
    ) -> Result<PointsAward, StoreError> {
        let resp = self
            .client
            .post(format!("{}/api/customers/{id}/points", self.base_url))
            .json(&serde_json::json!({ "points": amount }))
            .send()
            .await
            .expect("POST /api/customers/{id}/points");
        match resp.status() {
            StatusCode::OK => Ok(resp.json().await.expect("award body")),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id)),
            StatusCode::BAD_REQUEST => Err(StoreError::InvalidAmount(i64::from(amount))),
            status => panic!("unexpected status {status} for add_points"),
        }
    }
}
