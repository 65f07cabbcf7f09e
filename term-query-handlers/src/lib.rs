//! Term Query Handlers
//!
//! Translates HTTP filter parameters into SOQL, runs the query through an
//! external query service, and flattens the returned records using the same
//! schema document that drove the query.
//!
//! # Pipeline
//!
//! ```text
//! filter params ──► QueryBuilder ──► SOQL ──► QueryExecutor ──► nested records
//!                        ▲                                            │
//!                        └──────────── SchemaRegistry ──────────► RecordProjector
//!                                                                     │
//!                                                              flat records ──► response
//! ```
//!
//! The schema is loaded once and shared read-only. The query executor sits
//! behind a trait so handlers can run against a test double.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use term_query_handlers::{
//!     FilterParams, QueryExecutorClient, QueryExecutorConfig, SchemaRegistry, TermGetHandler,
//!     TermGetRequest,
//! };
//!
//! let schema = Arc::new(SchemaRegistry::term()?);
//! let config = QueryExecutorConfig::new("https://sf-query.example.com/query")?;
//! let executor = Arc::new(QueryExecutorClient::new(config)?);
//! let handler = TermGetHandler::new(schema, executor);
//!
//! let params: FilterParams = [("status", "Open")].into_iter().collect();
//! let response = handler.handle(TermGetRequest::new(params)).await;
//! assert_eq!(response.status_code, 200);
//! ```
//!
//! # Modules
//!
//! - [`contracts`]: Schema registry, field paths, records and envelopes
//! - [`query`]: SOQL construction
//! - [`projection`]: Nested record flattening
//! - [`clients`]: Query service client
//! - [`handlers`]: HTTP-shaped request handlers
//! - [`telemetry`]: Structured invocation events

#![warn(rustdoc::missing_crate_level_docs)]

pub mod clients;
pub mod contracts;
pub mod handlers;
pub mod projection;
pub mod query;
pub mod telemetry;

// Re-export commonly used types
pub use clients::{QueryExecutor, QueryExecutorClient, QueryExecutorConfig, QueryExecutorError};
pub use contracts::{
    ErrorEnvelope, FieldPath, FieldPathError, FieldType, FilterParams, FlatRecord, NestedRecord,
    SchemaDescriptor, SchemaError, SchemaRegistry,
};
pub use handlers::{TermGetHandler, TermGetRequest, TermGetResponse};
pub use projection::RecordProjector;
pub use query::{QueryBuilder, TERM_ENTITY};
pub use telemetry::TelemetryEmitter;
