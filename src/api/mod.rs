//! Transport layer for the demo REST API
//!
//! Four side-effecting calls (GET, POST, PUT, DELETE) with JSON bodies and
//! one typed error per call. No retries: the first failure goes straight
//! back to the caller.
//!
//! [`Transport`] works on `serde_json::Value` so it stays object-safe; the
//! typed helpers ([`fetch_data`], [`create_data`], [`update_data`]) decode
//! into the caller's expected shape and map decode failures onto the error
//! of the operation that produced them.

mod client;
mod error;
#[cfg(feature = "test-sim")]
pub mod sim;

pub use client::ApiClient;
pub use error::{ApiError, Operation, CREATE_FALLBACK_MESSAGE};
#[cfg(feature = "test-sim")]
pub use sim::{Gate, SimCall, SimMethod, SimTransport};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// HTTP transport abstraction
///
/// Paths are relative to the configured base endpoint (`"todos"`,
/// `"todos/7"`, `"todos/add"`). `update` and `delete` append `/{id}`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` and return the decoded JSON body
    async fn fetch(&self, path: &str) -> Result<Value, ApiError>;

    /// POST `body` to `path` and return the decoded JSON body
    async fn create(&self, path: &str, body: Value) -> Result<Value, ApiError>;

    /// PUT the partial `body` to `path/id` and return the decoded JSON body
    async fn update(&self, path: &str, id: u64, body: Value) -> Result<Value, ApiError>;

    /// DELETE `path/id`
    async fn delete(&self, path: &str, id: u64) -> Result<(), ApiError>;
}

/// GET `path` and decode as `T`
pub async fn fetch_data<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
) -> Result<T, ApiError> {
    let value = transport.fetch(path).await?;
    decode(Operation::Fetch, path, value)
}

/// POST `body` to `path` and decode the created record as `T`
pub async fn create_data<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
    body: Value,
) -> Result<T, ApiError> {
    let value = transport.create(path, body).await?;
    decode(Operation::Create, path, value)
}

/// PUT `body` to `path/id` and decode the updated record as `T`
pub async fn update_data<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
    id: u64,
    body: Value,
) -> Result<T, ApiError> {
    let value = transport.update(path, id, body).await?;
    decode(Operation::Update, &format!("{}/{}", path, id), value)
}

fn decode<T: DeserializeOwned>(op: Operation, path: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        let reason = match op {
            Operation::Create => format!("{}: {}", CREATE_FALLBACK_MESSAGE, e),
            _ => format!("Invalid response body: {}", e),
        };
        ApiError::new(op, path, reason)
    })
}

/// Join a base URL and a relative path with exactly one slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
