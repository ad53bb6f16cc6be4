use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure raised while turning a raw definition into an [`EnumDefinition`](crate::EnumDefinition).
///
/// Both kinds are raised at definition time only. Read paths never return them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The definition argument itself was absent (`null`, `false` or blank).
    #[error("enum field definitions are missing")]
    Missing,

    /// The definition was present but could not be normalized into a key to metadata mapping.
    #[error("invalid enum field definitions: {message}")]
    Invalid { message: String },
}

impl DefinitionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Error returned when dispatching a synthesized name that the model does not know.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MethodError {
    #[error("undefined method '{name}'")]
    Undefined { name: String },
}

impl MethodError {
    pub fn undefined(name: impl Into<String>) -> Self {
        Self::Undefined { name: name.into() }
    }
}

/// Errors produced while loading TOML declarations of enum fields.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse enum field configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("enum field '{accessor}' on model '{model}': {source}")]
    Definition {
        model: String,
        accessor: String,
        #[source]
        source: DefinitionError,
    },
}

/// Collection of validation issues reported for a single record.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Messages attached to `field`, in the order they were reported.
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.field == field)
            .map(|issue| issue.message.as_str())
            .collect()
    }
}

/// Validation failure attached to one column or association name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_grouped_by_field() {
        let error = ValidationError::new([
            ValidationIssue::new("status", "validation.inclusion", "is not included in the list"),
            ValidationIssue::new("record", "validation.inclusion", "must be one of: TypeA"),
        ]);
        assert_eq!(error.messages_for("status"), vec!["is not included in the list"]);
        assert_eq!(error.messages_for("record"), vec!["must be one of: TypeA"]);
        assert!(error.messages_for("other").is_empty());
    }

    #[test]
    fn definition_error_display() {
        assert_eq!(DefinitionError::Missing.to_string(), "enum field definitions are missing");
        assert_eq!(
            DefinitionError::invalid("entry 'a' is missing a value").to_string(),
            "invalid enum field definitions: entry 'a' is missing a value"
        );
    }
}
