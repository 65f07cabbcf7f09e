//! External Service Clients
//!
//! Clients for the services a handler depends on. The query service is the
//! only one: it executes SOQL against the record store.

pub mod query_executor;

pub use query_executor::*;
