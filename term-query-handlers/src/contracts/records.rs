//! Request and Record Contracts
//!
//! Filter parameters coming in, nested records coming back from the query
//! service, and the flat records handed to callers.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Record as returned by the query service. Nesting mirrors the relation graph.
pub type NestedRecord = Value;

/// Projected record: one key per schema descriptor, in schema order.
pub type FlatRecord = Map<String, Value>;

/// Key under which the query service returns records.
pub const RECORDS_KEY: &str = "records";

/// Caller-supplied filter parameters.
///
/// Keeps insertion order. Inserting an existing key replaces its value in
/// place, so a key appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterParams {
    entries: Vec<(String, String)>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing the value of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<'de> Deserialize<'de> for FilterParams {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FilterParamsVisitor;

        impl<'de> Visitor<'de> for FilterParamsVisitor {
            type Value = FilterParams;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of string parameters")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut params = FilterParams::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    params.insert(key, value);
                }
                Ok(params)
            }
        }

        deserializer.deserialize_map(FilterParamsVisitor)
    }
}

/// Pull the record collection out of a query service payload.
///
/// Anything other than an object carrying an array under `records` yields no
/// records.
pub fn records_from_payload(payload: Value) -> Vec<NestedRecord> {
    match payload {
        Value::Object(mut object) => match object.remove(RECORDS_KEY) {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
