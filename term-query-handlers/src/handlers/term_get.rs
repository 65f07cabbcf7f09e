//! Term GET Handler
//!
//! Handler behind `GET /api/v1/terms`.
//!
//! # Flow
//!
//! 1. Read filter parameters from the request (none is fine)
//! 2. Build SOQL from the term schema and the parameters
//! 3. Invoke the query service exactly once
//! 4. Pull `records` out of the payload (missing or malformed means none)
//! 5. Flatten every record through the schema
//! 6. Return the flat records as a JSON array
//!
//! A failed invocation short-circuits to a 502 carrying the error message.
//!
//! # Response Format
//!
//! ```json
//! {
//!   "statusCode": 200,
//!   "headers": { "Content-Type": "application/json" },
//!   "body": "[{\"id\":\"a0B1\",\"ownerName\":\"Ada\",...}]"
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::clients::{QueryExecutor, QueryExecutorError};
use crate::contracts::{records_from_payload, ErrorEnvelope, FilterParams, FlatRecord, SchemaRegistry};
use crate::projection::RecordProjector;
use crate::query::QueryBuilder;
use crate::telemetry::TelemetryEmitter;

/// Handler identifier used in telemetry.
pub const TERM_GET_HANDLER_ID: &str = "term-get";

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Incoming request, in HTTP proxy event shape.
///
/// `queryStringParameters` may be absent or `null`; both mean no filters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermGetRequest {
    #[serde(default)]
    pub query_string_parameters: Option<FilterParams>,
}

impl TermGetRequest {
    pub fn new(params: FilterParams) -> Self {
        Self {
            query_string_parameters: Some(params),
        }
    }
}

/// HTTP-shaped handler response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermGetResponse {
    /// HTTP status code (200 or 502)
    pub status_code: u16,

    /// Response headers
    pub headers: BTreeMap<String, String>,

    /// JSON body
    pub body: String,
}

impl TermGetResponse {
    /// 200 with the flat records as a JSON array.
    pub fn ok(records: Vec<FlatRecord>) -> Self {
        let body = Value::Array(records.into_iter().map(Value::Object).collect()).to_string();
        Self::json(200, body)
    }

    /// 502 for a failed query service invocation.
    pub fn upstream_failure(err: &QueryExecutorError) -> Self {
        Self::json(502, ErrorEnvelope::upstream(err.to_string()).to_body())
    }

    fn json(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string());

        Self {
            status_code,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Term query handler.
///
/// Holds the shared schema and an injected query executor. Stateless per
/// request, so one instance serves concurrent requests.
pub struct TermGetHandler {
    schema: Arc<SchemaRegistry>,
    executor: Arc<dyn QueryExecutor>,
    telemetry: TelemetryEmitter,
}

impl TermGetHandler {
    /// Create a handler with default telemetry.
    pub fn new(schema: Arc<SchemaRegistry>, executor: Arc<dyn QueryExecutor>) -> Self {
        Self::with_components(schema, executor, TelemetryEmitter::new(TERM_GET_HANDLER_ID))
    }

    /// Create a handler with custom components.
    pub fn with_components(
        schema: Arc<SchemaRegistry>,
        executor: Arc<dyn QueryExecutor>,
        telemetry: TelemetryEmitter,
    ) -> Self {
        Self {
            schema,
            executor,
            telemetry,
        }
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// SOQL for a set of filter parameters.
    pub fn build_query(&self, params: &FilterParams) -> String {
        QueryBuilder::term(&self.schema).build(params)
    }

    /// Flatten the records carried by a query service payload.
    pub fn project_payload(&self, payload: Value) -> Vec<FlatRecord> {
        let records = records_from_payload(payload);
        RecordProjector::new(&self.schema).project_all(&records)
    }

    /// Handle a request under a fresh request ID.
    pub async fn handle(&self, request: TermGetRequest) -> TermGetResponse {
        self.handle_with_id(Uuid::new_v4(), request).await
    }

    /// Handle a request.
    #[instrument(skip_all, fields(request_id = %request_id))]
    pub async fn handle_with_id(
        &self,
        request_id: Uuid,
        request: TermGetRequest,
    ) -> TermGetResponse {
        let start_time = Instant::now();
        let params = request.query_string_parameters.unwrap_or_default();

        info!(param_count = params.len(), "Handling term query request");
        self.telemetry.emit_started(request_id, params.len());

        let soql = self.build_query(&params);
        info!(soql = %soql, "Built SOQL");
        self.telemetry.emit_query_built(request_id, &soql);

        match self.fetch(&soql).await {
            Ok(records) => {
                info!(
                    record_count = records.len(),
                    processing_time_ms = start_time.elapsed().as_millis() as u64,
                    "Term query completed"
                );
                self.telemetry
                    .emit_completed(request_id, records.len(), start_time.elapsed());

                TermGetResponse::ok(records)
            }
            Err(e) => {
                error!(error = %e, "Error invoking query service");
                self.telemetry
                    .emit_failure(request_id, &e.to_string(), start_time.elapsed());

                TermGetResponse::upstream_failure(&e)
            }
        }
    }

    /// Invoke the query service and flatten its records.
    async fn fetch(&self, soql: &str) -> Result<Vec<FlatRecord>, QueryExecutorError> {
        let payload = self.executor.execute(soql).await?;
        debug!(payload = %payload, "Query service payload");

        Ok(self.project_payload(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Executor returning a canned result and recording the queries it saw.
    struct StubExecutor {
        result: Result<Value, String>,
        queries: Mutex<Vec<String>>,
    }

    impl StubExecutor {
        fn returning(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(payload),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Err(message.to_string()),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryExecutor for StubExecutor {
        async fn execute(&self, soql: &str) -> Result<Value, QueryExecutorError> {
            self.queries.lock().unwrap().push(soql.to_string());
            self.result.clone().map_err(QueryExecutorError::Invocation)
        }
    }

    fn handler(executor: Arc<StubExecutor>) -> TermGetHandler {
        let schema = Arc::new(SchemaRegistry::term().unwrap());
        TermGetHandler::with_components(
            schema,
            executor,
            TelemetryEmitter::with_config(TERM_GET_HANDLER_ID, false),
        )
    }

    #[tokio::test]
    async fn test_success_projects_records() {
        let executor = StubExecutor::returning(json!({
            "records": [
                { "Id": "a0B1", "Status__c": "Open", "Owner": { "Name": "Ada" } }
            ]
        }));
        let response = handler(executor.clone()).handle(TermGetRequest::default()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers[CONTENT_TYPE_HEADER], JSON_CONTENT_TYPE);

        let body: Vec<FlatRecord> = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["id"], "a0B1");
        assert_eq!(body[0]["status"], "Open");
        assert_eq!(body[0]["ownerName"], "Ada");
        assert_eq!(body[0]["schoolName"], Value::Null);
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_502() {
        let executor = StubExecutor::failing("timeout");
        let response = handler(executor).handle(TermGetRequest::default()).await;

        assert_eq!(response.status_code, 502);
        assert!(!response.is_success());
        assert!(response.body.contains(r#""detail":"timeout""#), "{}", response.body);

        let envelope: ErrorEnvelope = serde_json::from_str(&response.body).unwrap();
        assert_eq!(envelope.detail, "timeout");
    }

    #[tokio::test]
    async fn test_missing_records_returns_empty_array() {
        let executor = StubExecutor::returning(json!({ "totalSize": 0, "done": true }));
        let response = handler(executor).handle(TermGetRequest::default()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "[]");
    }

    #[tokio::test]
    async fn test_single_invocation_with_built_query() {
        let executor = StubExecutor::returning(json!({ "records": [] }));
        let params: FilterParams = [("status", "Open"), ("color", "blue")].into_iter().collect();

        handler(executor.clone()).handle(TermGetRequest::new(params)).await;

        let queries = executor.queries();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].starts_with("SELECT Id, Name, Status__c"));
        assert!(queries[0].ends_with(" FROM Term__c WHERE Status__c = 'Open'"));
    }

    #[test]
    fn test_request_null_parameters() {
        let request: TermGetRequest =
            serde_json::from_value(json!({ "queryStringParameters": null })).unwrap();
        assert!(request.query_string_parameters.is_none());

        let request: TermGetRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.query_string_parameters.is_none());
    }

    #[test]
    fn test_response_serializes_proxy_shape() {
        let response = TermGetResponse::ok(Vec::new());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["headers"]["Content-Type"], "application/json");
        assert_eq!(value["body"], "[]");
    }
}
