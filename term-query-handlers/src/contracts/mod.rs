//! Contracts Module
//!
//! Types shared by every stage of a term query: the schema registry and its
//! field paths, filter parameters, nested and flat records, and response
//! envelopes.

pub mod common;
pub mod field_path;
pub mod records;
pub mod schema;

pub use common::*;
pub use field_path::*;
pub use records::*;
pub use schema::*;
