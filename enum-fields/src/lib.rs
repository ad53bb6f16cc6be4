//! Enum fields for host data models.
//!
//! A model attribute is declared to hold one of a fixed set of keyed values, each with arbitrary
//! metadata (`value`, `label`, plus extras such as `icon` or `color`). Defining the field
//! synthesizes lookup methods, predicates, query scopes and inclusion validation on the model, and
//! records the definition in a process-wide registry for introspection.

pub mod config;
pub mod definition;
pub mod errors;
pub mod field;
pub mod host;
pub mod id;
pub mod keys;
pub mod model;
pub mod query;
pub mod registry;
pub mod types;
pub mod validators;

use std::sync::Arc;

use serde_json::Value;

pub use config::{EnumFieldsConfig, FieldConfig, ModelConfig};
pub use definition::{EnumDefinition, Metadata, PropertySet};
pub use errors::*;
pub use field::{EnumField, FieldTable};
pub use host::{HostModel, Record};
pub use model::{Instance, Model};
pub use query::{Condition, Query};
pub use registry::{ModelFields, Registry, RegistrySnapshot, register, registry, reset_registry};
pub use types::{AssociationReflection, FieldOptions, ValidationRule};

/// Defines the enum field `accessor` on `model`.
///
/// Blank definitions (`null`, `false`, an empty mapping or sequence, a blank string) are
/// rejected with [`DefinitionError::Missing`]. Everything else goes through
/// [`EnumField::define`].
///
/// ```
/// use enum_fields::{FieldOptions, Instance, Model, define_enum_field};
/// use serde_json::json;
///
/// let mut model = Model::new("Ticket");
/// define_enum_field(&mut model, "state", &json!(["open", "closed"]), FieldOptions::default()).unwrap();
///
/// let ticket = Instance::new().with("state", "open");
/// assert_eq!(model.call_on(&ticket, "open_state?"), Ok(json!(true)));
/// ```
pub fn define_enum_field<M: HostModel + ?Sized>(
    model: &mut M,
    accessor: &str,
    definition: &Value,
    options: FieldOptions,
) -> Result<Arc<EnumField>, DefinitionError> {
    if is_blank(definition) {
        return Err(DefinitionError::Missing);
    }
    EnumField::define(model, accessor, definition, options)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_definitions_are_missing() {
        let mut model = Model::new("Task");
        for blank in [json!(null), json!(false), json!({}), json!([]), json!("  ")] {
            assert_eq!(
                define_enum_field(&mut model, "state", &blank, FieldOptions::default()).unwrap_err(),
                DefinitionError::Missing,
                "{blank}"
            );
        }
        assert!(model.enum_fields().is_empty());
    }

    #[test]
    fn present_but_malformed_definitions_are_invalid() {
        let mut model = Model::new("Task");
        for malformed in [json!("invalid"), json!(true), json!(3), json!({ "a": "b" })] {
            let error = define_enum_field(&mut model, "state", &malformed, FieldOptions::default()).unwrap_err();
            assert!(matches!(error, DefinitionError::Invalid { .. }), "{malformed}");
        }
    }
}
