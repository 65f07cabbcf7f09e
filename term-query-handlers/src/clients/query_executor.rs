//! Query Executor Client
//!
//! Client for the external query service that runs SOQL against the record
//! store. The service receives `{ "soql": "<query>" }` and answers with a JSON
//! payload carrying records under `records`.
//!
//! Each call makes exactly one request. Failures are reported to the caller,
//! never retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Environment variable naming the query service endpoint.
pub const QUERY_SERVICE_URL_ENV: &str = "SF_QUERY_SERVICE_URL";

/// Environment variable holding an optional bearer token.
pub const QUERY_SERVICE_TOKEN_ENV: &str = "SF_QUERY_AUTH_TOKEN";

/// Environment variable overriding the request timeout.
pub const QUERY_SERVICE_TIMEOUT_ENV: &str = "SF_QUERY_TIMEOUT_SECS";

/// Query executor client configuration.
#[derive(Debug, Clone)]
pub struct QueryExecutorConfig {
    /// Endpoint receiving the query payload
    pub endpoint: Url,

    /// Authentication token
    pub auth_token: Option<String>,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for QueryExecutorConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("http://localhost:8081/query").expect("Valid default URL"),
            auth_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl QueryExecutorConfig {
    /// Build a config for an endpoint with default timeout and no token.
    pub fn new(endpoint: &str) -> Result<Self, QueryExecutorError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)
                .map_err(|e| QueryExecutorError::Configuration(e.to_string()))?,
            ..Default::default()
        })
    }
}

/// Errors from query service invocations.
///
/// Display strings are surfaced to callers as the `detail` of a 502 response.
#[derive(Debug, Error)]
pub enum QueryExecutorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Query service returned status {status}: {message}")]
    Response { status: u16, message: String },

    #[error("Malformed query service payload: {0}")]
    Serialization(String),

    #[error("timeout")]
    Timeout,

    /// Failure reported verbatim by an executor implementation.
    #[error("{0}")]
    Invocation(String),
}

impl From<reqwest::Error> for QueryExecutorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QueryExecutorError::Timeout
        } else if err.is_connect() {
            QueryExecutorError::Connection(err.to_string())
        } else {
            QueryExecutorError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for QueryExecutorError {
    fn from(err: serde_json::Error) -> Self {
        QueryExecutorError::Serialization(err.to_string())
    }
}

/// Payload sent to the query service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub soql: String,
}

/// Executes SOQL queries on behalf of a handler.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `soql` and return the raw response payload.
    async fn execute(&self, soql: &str) -> Result<Value, QueryExecutorError>;
}

/// HTTP client implementation for the query service.
#[derive(Clone)]
pub struct QueryExecutorClient {
    client: Client,
    config: QueryExecutorConfig,
}

impl QueryExecutorClient {
    /// Create a new client.
    pub fn new(config: QueryExecutorConfig) -> Result<Self, QueryExecutorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QueryExecutorError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl QueryExecutor for QueryExecutorClient {
    #[instrument(skip(self, soql), fields(endpoint = %self.config.endpoint))]
    async fn execute(&self, soql: &str) -> Result<Value, QueryExecutorError> {
        let payload = QueryRequest {
            soql: soql.to_string(),
        };

        let request = self.client.post(self.config.endpoint.clone()).json(&payload);
        let request = if let Some(ref token) = self.config.auth_token {
            request.bearer_auth(token)
        } else {
            request
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Query service returned an error status");
            return Err(QueryExecutorError::Response {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        debug!("Response body: {}", body);

        Ok(serde_json::from_str(&body)?)
    }
}
