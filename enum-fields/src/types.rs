use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ValidationIssue;
use crate::host::Record;
use crate::query::Query;

/// Model-level synthesized method, e.g. `status_values`.
pub type ClassMethod = Arc<dyn Fn() -> Value + Send + Sync>;

/// Instance-level synthesized reader, e.g. `status_label` or `active_status?`.
pub type InstanceMethod = Arc<dyn Fn(&dyn Record) -> Value + Send + Sync>;

/// Instance-level synthesized writer, e.g. `status=` when the accessor has its own column.
pub type WriterMethod = Arc<dyn Fn(&mut dyn Record, Value) + Send + Sync>;

/// Query scope body. The returned query is built from values captured at definition time.
pub type ScopeBody = Arc<dyn Fn() -> Query + Send + Sync>;

/// Custom validation block. Pushes one issue per failure onto the collector.
pub type CustomValidator = Arc<dyn Fn(&dyn Record, &mut Vec<ValidationIssue>) + Send + Sync>;

/// Options accepted when defining an enum field.
///
/// # Example
///
/// ```
/// use enum_fields::FieldOptions;
///
/// let options = FieldOptions::new().with_column("state").with_validate(false);
/// assert_eq!(options.column.as_deref(), Some("state"));
/// assert!(!options.validate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Storage attribute holding the value. Defaults to the accessor name.
    #[serde(default)]
    pub column: Option<String>,
    /// Whether to install a validation rule for the column.
    #[serde(default = "default_validate")]
    pub validate: bool,
}

fn default_validate() -> bool {
    true
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            column: None,
            validate: default_validate(),
        }
    }
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// A belongs-to association as reported by a host's reflection capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationReflection {
    pub name: String,
    #[serde(default)]
    pub polymorphic: bool,
}

impl AssociationReflection {
    pub fn new(name: impl Into<String>, polymorphic: bool) -> Self {
        Self {
            name: name.into(),
            polymorphic,
        }
    }

    /// The sibling column tracking the related object's type, e.g. `record_type`.
    pub fn type_column(&self) -> String {
        format!("{}_type", self.name)
    }
}

/// Validation installed for one column.
#[derive(Clone)]
pub enum ValidationRule {
    /// The value must be one of `allowed`, or null.
    Inclusion { allowed: Vec<Value> },
    Custom(CustomValidator),
}

impl ValidationRule {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationRule::Inclusion { .. } => "inclusion",
            ValidationRule::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Inclusion { allowed } => f.debug_struct("Inclusion").field("allowed", allowed).finish(),
            ValidationRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
