//! Schema Registry
//!
//! Typed, load-once view of a schema document. Each property of the document
//! becomes a [`SchemaDescriptor`]: the external field name exposed to callers,
//! the dotted title locating the field in the record store, and its declared
//! primitive type.
//!
//! The registry is validated when it is built and never mutated afterwards,
//! so one instance can be shared across concurrent requests behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::field_path::{FieldPath, FieldPathError};

/// Term schema document compiled into the crate.
pub const TERM_SCHEMA_JSON: &str = include_str!("../../schemas/term.json");

/// Errors raised while loading a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schema document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid property '{name}': {reason}")]
    InvalidProperty { name: String, reason: String },

    #[error("Invalid title for property '{name}': {source}")]
    InvalidTitle {
        name: String,
        #[source]
        source: FieldPathError,
    },

    #[error("Duplicate property '{0}'")]
    DuplicateProperty(String),
}

/// Declared primitive type of a schema property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    /// Any other tag, kept verbatim. Treated as non-string.
    Other(String),
}

impl FieldType {
    /// Map a JSON-schema type tag onto a field type.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            other => Self::Other(other.to_string()),
        }
    }

    /// Type tag as written in the schema document.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Other(tag) => tag,
        }
    }

    /// Whether filter values for this type are emitted as quoted literals.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One schema property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    external_name: String,
    title: String,
    field_type: FieldType,
    path: FieldPath,
}

impl SchemaDescriptor {
    /// Build a descriptor, parsing its title.
    pub fn new(
        external_name: impl Into<String>,
        title: impl Into<String>,
        field_type: FieldType,
    ) -> Result<Self, SchemaError> {
        let external_name = external_name.into();
        let title = title.into();

        let path = FieldPath::parse(&title).map_err(|source| SchemaError::InvalidTitle {
            name: external_name.clone(),
            source,
        })?;

        Ok(Self {
            external_name,
            title,
            field_type,
            path,
        })
    }

    pub fn external_name(&self) -> &str {
        &self.external_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Relation path used in SELECT and WHERE clauses.
    pub fn relation_path(&self) -> &str {
        self.path.relation_path()
    }

    /// Segments used when walking a returned record.
    pub fn traversal_path(&self) -> &[String] {
        self.path.traversal_path()
    }
}

/// Raw schema document as stored on disk.
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    title: Option<String>,

    properties: Map<String, Value>,
}

/// Raw property definition. Extra JSON-schema keywords are ignored.
#[derive(Debug, Deserialize)]
struct PropertyDefinition {
    title: String,

    #[serde(rename = "type")]
    type_tag: String,
}

/// Immutable, ordered collection of schema descriptors.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    title: Option<String>,
    descriptors: Vec<SchemaDescriptor>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Build a registry from descriptors in declaration order.
    pub fn from_descriptors(
        descriptors: Vec<SchemaDescriptor>,
    ) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(descriptors.len());

        for (position, descriptor) in descriptors.iter().enumerate() {
            if index
                .insert(descriptor.external_name.clone(), position)
                .is_some()
            {
                return Err(SchemaError::DuplicateProperty(
                    descriptor.external_name.clone(),
                ));
            }
        }

        Ok(Self {
            title: None,
            descriptors,
            index,
        })
    }

    /// Parse a schema document. Property order in the document is kept.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(json)?;

        let mut descriptors = Vec::with_capacity(document.properties.len());
        for (name, raw) in document.properties {
            let definition: PropertyDefinition =
                serde_json::from_value(raw).map_err(|e| SchemaError::InvalidProperty {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;

            descriptors.push(SchemaDescriptor::new(
                name,
                definition.title,
                FieldType::from_tag(&definition.type_tag),
            )?);
        }

        let mut registry = Self::from_descriptors(descriptors)?;
        registry.title = document.title;
        Ok(registry)
    }

    /// Load a schema document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&json)
    }

    /// The term schema compiled into the crate.
    pub fn term() -> Result<Self, SchemaError> {
        Self::from_json_str(TERM_SCHEMA_JSON)
    }

    /// Document title, if the schema declared one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Look up a descriptor by external name.
    pub fn get(&self, external_name: &str) -> Option<&SchemaDescriptor> {
        self.index
            .get(external_name)
            .map(|&position| &self.descriptors[position])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SchemaDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for &'a SchemaRegistry {
    type Item = &'a SchemaDescriptor;
    type IntoIter = std::slice::Iter<'a, SchemaDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_term_schema_loads() {
        let schema = SchemaRegistry::term().expect("embedded schema should load");

        assert_eq!(schema.title(), Some("Term"));
        assert!(!schema.is_empty());

        let status = schema.get("status").expect("status property");
        assert_eq!(status.relation_path(), "Status__c");
        assert!(status.field_type().is_string());

        let owner = schema.get("ownerName").expect("ownerName property");
        assert_eq!(owner.traversal_path(), &["Owner", "Name"]);
    }

    #[test]
    fn test_declaration_order_preserved() {
        let schema = SchemaRegistry::from_json_str(
            r#"{
                "properties": {
                    "zeta": { "title": "Term__c.Zeta__c", "type": "string" },
                    "alpha": { "title": "Term__c.Alpha__c", "type": "integer" },
                    "mid": { "title": "Term__c.Owner.Mid", "type": "string" }
                }
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = schema.iter().map(SchemaDescriptor::external_name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(schema.get("alpha").unwrap().field_type(), &FieldType::Integer);
    }

    #[test]
    fn test_short_title_fails_fast() {
        let err = SchemaRegistry::from_json_str(
            r#"{ "properties": { "bad": { "title": "Term__c", "type": "string" } } }"#,
        )
        .unwrap_err();

        match err {
            SchemaError::InvalidTitle { name, .. } => assert_eq!(name, "bad"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_type_rejected() {
        let err = SchemaRegistry::from_json_str(
            r#"{ "properties": { "name": { "title": "Term__c.Name" } } }"#,
        )
        .unwrap_err();

        assert!(matches!(err, SchemaError::InvalidProperty { .. }));
    }

    #[test]
    fn test_missing_properties_rejected() {
        let err = SchemaRegistry::from_json_str(r#"{ "title": "Term" }"#).unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn test_duplicate_descriptor_rejected() {
        let descriptors = vec![
            SchemaDescriptor::new("name", "Term__c.Name", FieldType::String).unwrap(),
            SchemaDescriptor::new("name", "Term__c.Other__c", FieldType::String).unwrap(),
        ];

        let err = SchemaRegistry::from_descriptors(descriptors).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateProperty(name) if name == "name"));
    }

    #[test]
    fn test_unknown_type_tag_kept() {
        let field_type = FieldType::from_tag("date");

        assert_eq!(field_type, FieldType::Other("date".to_string()));
        assert_eq!(field_type.to_string(), "date");
        assert!(!field_type.is_string());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SchemaRegistry::from_path("/nonexistent/term.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/term.json"));
    }
}
