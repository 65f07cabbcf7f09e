//! Record Projection
//!
//! Flattens nested records returned by the query service into one object per
//! record, keyed by the schema's external field names.

use serde_json::Value;

use crate::contracts::{FlatRecord, NestedRecord, SchemaRegistry};

/// Projects nested records through a schema.
#[derive(Debug, Clone, Copy)]
pub struct RecordProjector<'a> {
    schema: &'a SchemaRegistry,
}

impl<'a> RecordProjector<'a> {
    pub fn new(schema: &'a SchemaRegistry) -> Self {
        Self { schema }
    }

    /// Flatten one record.
    ///
    /// Every descriptor yields a key, in schema order. A path that cannot be
    /// followed to the end resolves to `null`.
    pub fn project(&self, record: &NestedRecord) -> FlatRecord {
        let mut flat = FlatRecord::new();

        for descriptor in self.schema {
            let value = resolve(record, descriptor.traversal_path())
                .cloned()
                .unwrap_or(Value::Null);
            flat.insert(descriptor.external_name().to_string(), value);
        }

        flat
    }

    /// Flatten every record, keeping input order.
    pub fn project_all(&self, records: &[NestedRecord]) -> Vec<FlatRecord> {
        records.iter().map(|record| self.project(record)).collect()
    }
}

/// Walk `path` from `record`.
///
/// Stops at the first absent or `null` cursor. An explicit `null` at the last
/// segment is returned as-is.
pub fn resolve<'v>(record: &'v Value, path: &[String]) -> Option<&'v Value> {
    let mut cursor = record;

    for segment in path {
        cursor = match cursor {
            Value::Object(object) => object.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(cursor)
}
