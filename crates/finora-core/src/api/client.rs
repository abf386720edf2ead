//! API client for communicating with the finora REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests for dashboard, household, account and transaction data.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{
    Account, AccountRequest, AuthResponse, Household, HouseholdMember, LoginRequest, Transaction,
    TransactionFilter, TransactionRequest, UpdateHouseholdRequest,
};

use super::{ApiError, DashboardQuery, DashboardSource};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the finora backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the given base URL (e.g. `http://localhost:5000`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    /// `build` is called once per attempt since a `RequestBuilder` is consumed on send.
    async fn send(
        &self,
        url: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build().send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            debug!(url = url, error = %e, "Failed to parse JSON response");
            ApiError::InvalidResponse(format!("{} from {}", e, url))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.send(&url, || self.request(Method::GET, &url)).await?;
        Self::parse_json(response, &url).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self
            .send(&url, || self.request(Method::GET, &url).query(query))
            .await?;
        Self::parse_json(response, &url).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, method = %method, "Sending JSON body");
        let response = self
            .send(&url, || self.request(method.clone(), &url).json(body))
            .await?;
        Self::parse_json(response, &url).await
    }

    // ===== Auth =====

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, "/api/auth/login", request).await
    }

    // ===== Dashboard =====

    /// Fetch the raw dashboard payload for a period.
    pub async fn fetch_dashboard(&self, query: &DashboardQuery) -> Result<serde_json::Value, ApiError> {
        self.get_with_query("/api/dashboard", &query.params()).await
    }

    // ===== Household =====

    pub async fn fetch_household(&self) -> Result<Household, ApiError> {
        self.get("/api/household/me").await
    }

    pub async fn fetch_household_members(&self) -> Result<Vec<HouseholdMember>, ApiError> {
        self.get("/api/household/members").await
    }

    pub async fn update_household(
        &self,
        id: &str,
        request: &UpdateHouseholdRequest,
    ) -> Result<Household, ApiError> {
        self.send_json(Method::PUT, &format!("/api/household/{}", id), request)
            .await
    }

    // ===== Accounts =====

    pub async fn fetch_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.get("/api/accounts").await
    }

    pub async fn fetch_account(&self, id: &str) -> Result<Account, ApiError> {
        self.get(&format!("/api/accounts/{}", id)).await
    }

    pub async fn create_account(&self, request: &AccountRequest) -> Result<Account, ApiError> {
        self.send_json(Method::POST, "/api/accounts", request).await
    }

    // ===== Transactions =====

    pub async fn fetch_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, ApiError> {
        self.get_with_query("/api/transactions", filter).await
    }

    pub async fn create_transaction(&self, request: &TransactionRequest) -> Result<Transaction, ApiError> {
        self.send_json(Method::POST, "/api/transactions", request).await
    }
}

impl DashboardSource for ApiClient {
    async fn get_dashboard(&self, query: DashboardQuery) -> Result<serde_json::Value, ApiError> {
        self.fetch_dashboard(&query).await
    }
}
