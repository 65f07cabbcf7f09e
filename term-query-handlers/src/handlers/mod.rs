//! Request Handlers
//!
//! HTTP-shaped handlers, independent of any particular server. Each takes a
//! proxy-style request and returns a status code, headers and a JSON body.
//!
//! # Available Handlers
//!
//! - `TermGetHandler`: filtered term lookup through the query service

pub mod term_get;

pub use term_get::*;
