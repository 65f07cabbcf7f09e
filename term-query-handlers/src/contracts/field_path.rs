//! Field Paths
//!
//! Parsing of dotted descriptor titles such as `Term__c.Owner.Name`.
//!
//! The first segment names the root entity and never appears in queries or
//! record lookups. The remaining segments serve two purposes:
//!
//! - joined with `.` they form the relation path used in SOQL
//!   (`Owner.Name`)
//! - as a sequence they form the traversal path used to walk a returned
//!   record (`["Owner", "Name"]`)

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing a descriptor title.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldPathError {
    #[error("title '{title}' needs a root entity and at least one field segment")]
    TooFewSegments { title: String },

    #[error("title '{title}' contains an empty segment")]
    EmptySegment { title: String },
}

/// A parsed descriptor title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    root: String,
    segments: Vec<String>,
    relation: String,
}

impl FieldPath {
    /// Parse a dotted title. Requires a root plus at least one field segment.
    pub fn parse(title: &str) -> Result<Self, FieldPathError> {
        let mut parts = title.split('.');

        let root = parts.next().unwrap_or_default();
        let segments: Vec<String> = parts.map(str::to_string).collect();

        if segments.is_empty() {
            return Err(FieldPathError::TooFewSegments {
                title: title.to_string(),
            });
        }

        if root.is_empty() || segments.iter().any(String::is_empty) {
            return Err(FieldPathError::EmptySegment {
                title: title.to_string(),
            });
        }

        Ok(Self {
            root: root.to_string(),
            relation: segments.join("."),
            segments,
        })
    }

    /// Server-side field reference with the root stripped.
    pub fn relation_path(&self) -> &str {
        &self.relation
    }

    /// Segments used to walk a nested record.
    pub fn traversal_path(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.root, self.relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_path_strips_root() {
        let path = FieldPath::parse("Term__c.Academic_Year__r.School__r.Name").unwrap();

        assert_eq!(path.relation_path(), "Academic_Year__r.School__r.Name");
        assert_eq!(path.to_string(), "Term__c.Academic_Year__r.School__r.Name");
        assert_eq!(
            path.traversal_path(),
            &["Academic_Year__r", "School__r", "Name"]
        );
    }

    #[test]
    fn test_two_segment_title() {
        let path = FieldPath::parse("Term__c.Status__c").unwrap();

        assert_eq!(path.relation_path(), "Status__c");
        assert_eq!(path.traversal_path().len(), 1);
        assert_eq!(path.to_string(), "Term__c.Status__c");
    }

    #[test]
    fn test_single_segment_rejected() {
        let err = FieldPath::parse("Term__c").unwrap_err();
        assert_eq!(
            err,
            FieldPathError::TooFewSegments {
                title: "Term__c".to_string()
            }
        );
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(matches!(
            FieldPath::parse("Term__c..Name"),
            Err(FieldPathError::EmptySegment { .. })
        ));
        assert!(matches!(
            FieldPath::parse(".Name"),
            Err(FieldPathError::EmptySegment { .. })
        ));
        assert!(matches!(
            FieldPath::parse("Term__c."),
            Err(FieldPathError::EmptySegment { .. })
        ));
    }
}
