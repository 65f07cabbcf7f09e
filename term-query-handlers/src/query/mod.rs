//! Query Module
//!
//! Translation of filter parameters into SOQL for the query service.

pub mod builder;

pub use builder::*;
