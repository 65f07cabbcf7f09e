//! SOQL Builder
//!
//! Builds `SELECT <fields> FROM <entity>[ WHERE <predicates>]` from a schema
//! registry and caller filter parameters.
//!
//! The projection always lists every schema field. Predicates are equality
//! clauses for the filter parameters that name a schema field, in parameter
//! order; parameters with no matching field are dropped. String-typed fields
//! get a single-quoted literal with `'` escaped as `\'`. Values for any other
//! type are inserted verbatim and are not validated.

use tracing::debug;

use crate::contracts::{FilterParams, SchemaDescriptor, SchemaRegistry};

/// Root entity queried by the term handler.
pub const TERM_ENTITY: &str = "Term__c";

/// Builds SOQL queries against one root entity.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    schema: &'a SchemaRegistry,
    entity: &'a str,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a SchemaRegistry, entity: &'a str) -> Self {
        Self { schema, entity }
    }

    /// Builder for the term entity.
    pub fn term(schema: &'a SchemaRegistry) -> Self {
        Self::new(schema, TERM_ENTITY)
    }

    /// Relation path of every descriptor, comma-separated, in schema order.
    pub fn select_list(&self) -> String {
        self.schema
            .iter()
            .map(SchemaDescriptor::relation_path)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Equality predicates for the known parameters, in parameter order.
    pub fn predicates(&self, params: &FilterParams) -> Vec<String> {
        params
            .iter()
            .filter_map(|(name, raw)| match self.schema.get(name) {
                Some(descriptor) => Some(predicate(descriptor, raw)),
                None => {
                    debug!(parameter = %name, "Ignoring unknown filter parameter");
                    None
                }
            })
            .collect()
    }

    /// ` WHERE a AND b`, or an empty string when no parameter matched.
    pub fn where_clause(&self, params: &FilterParams) -> String {
        let clauses = self.predicates(params);
        if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        }
    }

    /// Full query string.
    pub fn build(&self, params: &FilterParams) -> String {
        format!(
            "SELECT {} FROM {}{}",
            self.select_list(),
            self.entity,
            self.where_clause(params)
        )
    }
}

fn predicate(descriptor: &SchemaDescriptor, raw: &str) -> String {
    let value = if descriptor.field_type().is_string() {
        quote_literal(raw)
    } else {
        raw.to_string()
    };

    format!("{} = {}", descriptor.relation_path(), value)
}

/// Single-quote a string literal, escaping embedded single quotes.
pub fn quote_literal(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "\\'"))
}
