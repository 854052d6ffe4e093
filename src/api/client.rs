//! reqwest-backed transport

use super::{join_url, ApiError, Operation, Transport};
use crate::config::ApiConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

/// HTTP client for the demo API (stateless apart from the connection pool)
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from config
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn fetch(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_network_error(Operation::Fetch, path, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_http_status(
                Operation::Fetch,
                path,
                status,
                &error_text,
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::from_network_error(Operation::Fetch, path, e))
    }

    async fn create(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!("POST {} {}", url, body);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::from_network_error(Operation::Create, path, e))?;

        // The body is read before the status check so a server-provided
        // message can be surfaced on failure.
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_network_error(Operation::Create, path, e))?;
        tracing::debug!("API response ({}): {}", status, text);

        if !status.is_success() {
            return Err(ApiError::from_http_status(
                Operation::Create,
                path,
                status,
                &text,
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            ApiError::with_status(
                Operation::Create,
                path,
                format!("{}: {}", super::CREATE_FALLBACK_MESSAGE, e),
                Some(status.as_u16()),
            )
        })
    }

    async fn update(&self, path: &str, id: u64, body: Value) -> Result<Value, ApiError> {
        let item_path = format!("{}/{}", path, id);
        let url = self.url(&item_path);
        tracing::debug!("PUT {} {}", url, body);

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::from_network_error(Operation::Update, &item_path, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_http_status(
                Operation::Update,
                item_path,
                status,
                &error_text,
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::from_network_error(Operation::Update, &item_path, e))
    }

    async fn delete(&self, path: &str, id: u64) -> Result<(), ApiError> {
        let item_path = format!("{}/{}", path, id);
        let url = self.url(&item_path);
        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_network_error(Operation::Delete, &item_path, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_http_status(
                Operation::Delete,
                item_path,
                status,
                &error_text,
            ));
        }

        Ok(())
    }
}
