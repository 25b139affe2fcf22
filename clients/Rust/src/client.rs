use std::time::Duration;

use crate::error::{OptimizerError, Result};
use crate::types::{
    ApiErrorBody, MultiStoreRequest, RankedStoresResult, SingleStoreRequest,
    TopMultiStoreSolutionsResult,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Header carrying the opaque device identifier
pub const DEVICE_ID_HEADER: &str = "X-Device-ID";

const SINGLE_STORE_PATH: &str = "optimize/single-store";
const MULTI_STORE_PATH: &str = "optimize/multi-store";
const HEALTH_PATH: &str = "health";

/// HTTP client for interacting with the basket optimization API
#[derive(Debug, Clone)]
pub struct OptimizerClient {
    client: Client,
    base_url: Url,
    device_id: Option<String>,
    timeout: Option<Duration>,
}

impl OptimizerClient {
    /// Create a new optimization API client
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the optimization API (e.g., "http://localhost:8000")
    ///
    /// # Example
    ///
    /// ```no_run
    /// use basket_optimizer_sdk::OptimizerClient;
    ///
    /// let client = OptimizerClient::new("http://localhost:8000").unwrap();
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with custom reqwest client
    ///
    /// This allows you to configure proxies, TLS, connection pools, etc.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url.as_ref())?,
            device_id: None,
            timeout: None,
        })
    }

    /// Set the device identifier sent as `X-Device-ID`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use basket_optimizer_sdk::OptimizerClient;
    ///
    /// let client = OptimizerClient::new("http://localhost:8000")
    ///     .unwrap()
    ///     .with_device_id("device-1234");
    /// ```
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Bound every request to `timeout`; expiry surfaces as [`OptimizerError::Timeout`]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check the health of the API server
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use basket_optimizer_sdk::OptimizerClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = OptimizerClient::new("http://localhost:8000")?;
    /// let is_healthy = client.health_check().await?;
    /// println!("Server healthy: {}", is_healthy);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn health_check(&self) -> Result<bool> {
        let url = self.endpoint(HEALTH_PATH)?;

        let mut req_builder = self.client.get(url);
        if let Some(timeout) = self.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder.send().await.map_err(map_transport_error)?;
        Ok(response.status().is_success())
    }

    /// Find the best individual stores for a list
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use basket_optimizer_sdk::{OptimizerClient, OptimizationItem, OptimizationRequestBuilder};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = OptimizerClient::new("http://localhost:8000")?;
    ///
    /// let request = OptimizationRequestBuilder::new()
    ///     .location(32.0853, 34.7818)
    ///     .add_item(OptimizationItem::new("ABC123", 2).with_name("Milk"))
    ///     .max_store_distance(5.0)
    ///     .build_single_store()?;
    ///
    /// let result = client.optimize_single_store(&request).await?;
    ///
    /// for store in &result.ranked_stores {
    ///     println!("{} scored {}", store.store_key(), store.combined_score);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn optimize_single_store(
        &self,
        request: &SingleStoreRequest,
    ) -> Result<RankedStoresResult> {
        self.post(SINGLE_STORE_PATH, request).await
    }

    /// Find the cheapest ways to split a list across several stores
    pub async fn optimize_multi_store(
        &self,
        request: &MultiStoreRequest,
    ) -> Result<TopMultiStoreSolutionsResult> {
        self.post(MULTI_STORE_PATH, request).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| OptimizerError::InvalidUrl(e.to_string()))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;

        let mut req_builder = self.client.post(url).json(body);

        if let Some(ref device_id) = self.device_id {
            req_builder = req_builder.header(DEVICE_ID_HEADER, device_id);
        }
        if let Some(timeout) = self.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);

            return Err(OptimizerError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| OptimizerError::MalformedResponse(e.to_string()))
    }
}

fn map_transport_error(error: reqwest::Error) -> OptimizerError {
    if error.is_timeout() {
        OptimizerError::Timeout
    } else {
        OptimizerError::Network(error)
    }
}

// `Url::join` replaces the last path segment unless the base ends in '/'.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| OptimizerError::InvalidUrl(e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(OptimizerError::InvalidUrl(format!("{raw} cannot be a base URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
