//! Host capability contract.
//!
//! The field generator never owns records or models. It talks to them through two traits:
//! [`Record`] for attribute access on one instance, and [`HostModel`] for installing
//! synthesized behavior into a model's dispatch tables. [`crate::Model`] and
//! [`crate::Instance`] are ready-made implementations.

use serde_json::{Map, Value};

use crate::definition::{EnumDefinition, Metadata};
use crate::field::FieldTable;
use crate::keys::{model_key, table_name};
use crate::types::{AssociationReflection, ClassMethod, InstanceMethod, ScopeBody, ValidationRule, WriterMethod};

/// Attribute access on one model instance.
pub trait Record {
    /// Current value of attribute `name`, or `None` when the record has no such attribute.
    fn read_attribute(&self, name: &str) -> Option<Value>;

    fn write_attribute(&mut self, name: &str, value: Value);

    /// Type name of the object currently loaded for `association`, if any.
    fn associated_type_name(&self, _association: &str) -> Option<String> {
        None
    }
}

/// Model-level capabilities needed to define enum fields.
pub trait HostModel {
    /// Fully-qualified model name, e.g. `Admin::User`. `None` for anonymous models.
    fn model_name(&self) -> Option<&str>;

    /// Process-unique identity token, used when the model has no name.
    fn model_token(&self) -> &str;

    fn enum_fields(&self) -> &FieldTable;

    fn enum_fields_mut(&mut self) -> &mut FieldTable;

    fn define_class_method(&mut self, name: String, method: ClassMethod);

    fn define_instance_method(&mut self, name: String, method: InstanceMethod);

    fn define_instance_writer(&mut self, name: String, method: WriterMethod);

    fn define_scope(&mut self, name: String, body: ScopeBody);

    /// Removes a synthesized name from every dispatch table.
    fn undefine(&mut self, name: &str);

    /// Installs the validation `accessor` owns on `column`, replacing that accessor's previous one.
    ///
    /// Rules of other accessors on the same column are kept and keep running.
    fn install_validation(&mut self, accessor: &str, column: &str, rule: ValidationRule);

    /// Removes the validation owned by `accessor`, if any.
    fn clear_validation(&mut self, accessor: &str);

    /// Reflection over belongs-to associations.
    ///
    /// `None` means the host has no reflection capability, which disables polymorphic validation.
    fn polymorphic_associations(&self) -> Option<Vec<AssociationReflection>> {
        None
    }

    /// Key this model is registered under in the process-wide registry.
    fn registry_key(&self) -> String {
        match self.model_name() {
            Some(name) if !name.trim().is_empty() => model_key(name),
            _ => self.model_token().to_string(),
        }
    }

    /// Table name used when rendering scopes.
    fn table_name(&self) -> String {
        match self.model_name() {
            Some(name) if !name.trim().is_empty() => table_name(name),
            _ => format!("anonymous_{}", self.model_token()),
        }
    }

    /// Normalized definition of `accessor`, read from the model's own store.
    fn enum_field_for(&self, accessor: &str) -> Option<&EnumDefinition> {
        self.enum_fields().definition_for(accessor)
    }

    fn is_enum_field(&self, accessor: &str) -> bool {
        self.enum_fields().contains(accessor)
    }

    /// Current metadata of every enum field on `record`, accessor to metadata (or `null`).
    fn enum_fields_metadata(&self, record: &dyn Record) -> Map<String, Value> {
        self.enum_fields()
            .iter()
            .map(|field| {
                let metadata = field.metadata(record).map(Metadata::to_value).unwrap_or(Value::Null);
                (field.accessor().to_string(), metadata)
            })
            .collect()
    }
}
