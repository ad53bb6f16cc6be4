//! In-memory host implementations.
//!
//! [`Model`] keeps its synthesized behavior in name-keyed dispatch tables and resolves calls by
//! name at runtime. [`Instance`] is a plain attribute bag. Together they are enough to use enum
//! fields without an ORM, and they are what the CLI and the tests run against.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::trace;
use serde_json::{Map, Value};

use crate::errors::{DefinitionError, MethodError, ValidationError, ValidationResult};
use crate::field::{EnumField, FieldTable};
use crate::host::{HostModel, Record};
use crate::id::generate_model_token;
use crate::query::Query;
use crate::types::{
    AssociationReflection, ClassMethod, FieldOptions, InstanceMethod, ScopeBody, ValidationRule, WriterMethod,
};
use crate::validators;

/// A validation rule together with the accessor that owns it and the column it checks.
#[derive(Debug)]
struct InstalledValidation {
    accessor: String,
    column: String,
    rule: ValidationRule,
}

pub struct Model {
    name: Option<String>,
    token: String,
    fields: FieldTable,
    class_methods: HashMap<String, ClassMethod>,
    instance_methods: HashMap<String, InstanceMethod>,
    writers: HashMap<String, WriterMethod>,
    scopes: HashMap<String, ScopeBody>,
    validations: Vec<InstalledValidation>,
    associations: Option<Vec<AssociationReflection>>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_name(Some(name.into()))
    }

    /// A model without a name. It registers under its identity token.
    pub fn anonymous() -> Self {
        Self::with_name(None)
    }

    fn with_name(name: Option<String>) -> Self {
        Self {
            name,
            token: generate_model_token(),
            fields: FieldTable::new(),
            class_methods: HashMap::new(),
            instance_methods: HashMap::new(),
            writers: HashMap::new(),
            scopes: HashMap::new(),
            validations: Vec::new(),
            associations: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declares a belongs-to association. The first declaration enables reflection.
    pub fn belongs_to(&mut self, name: impl Into<String>, polymorphic: bool) -> &mut Self {
        self.associations
            .get_or_insert_with(Vec::new)
            .push(AssociationReflection::new(name, polymorphic));
        self
    }

    /// Defines an enum field. Blank definitions are rejected with [`DefinitionError::Missing`].
    pub fn enum_field(
        &mut self,
        accessor: &str,
        definition: Value,
        options: FieldOptions,
    ) -> Result<Arc<EnumField>, DefinitionError> {
        crate::define_enum_field(self, accessor, &definition, options)
    }

    /// Invokes a model-level synthesized method.
    pub fn call(&self, name: &str) -> Result<Value, MethodError> {
        trace!("dispatching class method {name}");
        self.class_methods
            .get(name)
            .map(|method| method())
            .ok_or_else(|| MethodError::undefined(name))
    }

    /// Invokes an instance-level method, falling back to the record's own attribute.
    pub fn call_on(&self, record: &dyn Record, name: &str) -> Result<Value, MethodError> {
        if let Some(method) = self.instance_methods.get(name) {
            return Ok(method(record));
        }
        record
            .read_attribute(name)
            .ok_or_else(|| MethodError::undefined(name))
    }

    /// Assigns through a synthesized writer when one exists, otherwise writes the attribute.
    pub fn assign(&self, record: &mut dyn Record, name: &str, value: Value) {
        match self.writers.get(&format!("{name}=")) {
            Some(writer) => writer(record, value),
            None => record.write_attribute(name, value),
        }
    }

    pub fn scope(&self, name: &str) -> Result<Query, MethodError> {
        self.scopes
            .get(name)
            .map(|body| body())
            .ok_or_else(|| MethodError::undefined(name))
    }

    /// True when `name` is a model-level method or a scope.
    pub fn responds_to(&self, name: &str) -> bool {
        self.class_methods.contains_key(name) || self.scopes.contains_key(name)
    }

    pub fn instance_responds_to(&self, name: &str) -> bool {
        self.instance_methods.contains_key(name) || self.writers.contains_key(name)
    }

    /// Runs every installed validation rule against `record`.
    pub fn validate(&self, record: &dyn Record) -> ValidationResult<()> {
        let mut issues = Vec::new();
        for installed in &self.validations {
            validators::run_rule(&installed.column, &installed.rule, record, &mut issues);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }

    pub fn is_valid(&self, record: &dyn Record) -> bool {
        self.validate(record).is_ok()
    }

    /// First rule installed on `column`; several accessors may share it.
    pub fn validation_rule(&self, column: &str) -> Option<&ValidationRule> {
        self.validations
            .iter()
            .find(|installed| installed.column == column)
            .map(|installed| &installed.rule)
    }

    /// Rule owned by `accessor`.
    pub fn validation_for(&self, accessor: &str) -> Option<&ValidationRule> {
        self.validations
            .iter()
            .find(|installed| installed.accessor == accessor)
            .map(|installed| &installed.rule)
    }

    pub fn has_custom_validations(&self) -> bool {
        self.validations
            .iter()
            .any(|installed| matches!(installed.rule, ValidationRule::Custom(_)))
    }

    /// Sorted names of every model-level method and scope.
    pub fn class_method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .class_methods
            .keys()
            .chain(self.scopes.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Sorted names of every instance-level method and writer.
    pub fn instance_method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .instance_methods
            .keys()
            .chain(self.writers.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("token", &self.token)
            .field("fields", &self.fields.accessors().collect::<Vec<_>>())
            .field("class_methods", &self.class_methods.len())
            .field("instance_methods", &self.instance_methods.len())
            .field("scopes", &self.scopes.len())
            .field("validations", &self.validations)
            .field("associations", &self.associations)
            .finish()
    }
}

impl HostModel for Model {
    fn model_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn model_token(&self) -> &str {
        &self.token
    }

    fn enum_fields(&self) -> &FieldTable {
        &self.fields
    }

    fn enum_fields_mut(&mut self) -> &mut FieldTable {
        &mut self.fields
    }

    fn define_class_method(&mut self, name: String, method: ClassMethod) {
        self.class_methods.insert(name, method);
    }

    fn define_instance_method(&mut self, name: String, method: InstanceMethod) {
        self.instance_methods.insert(name, method);
    }

    fn define_instance_writer(&mut self, name: String, method: WriterMethod) {
        self.writers.insert(name, method);
    }

    fn define_scope(&mut self, name: String, body: ScopeBody) {
        self.scopes.insert(name, body);
    }

    fn undefine(&mut self, name: &str) {
        self.class_methods.remove(name);
        self.instance_methods.remove(name);
        self.writers.remove(name);
        self.scopes.remove(name);
    }

    fn install_validation(&mut self, accessor: &str, column: &str, rule: ValidationRule) {
        let installed = InstalledValidation {
            accessor: accessor.to_string(),
            column: column.to_string(),
            rule,
        };
        match self.validations.iter_mut().find(|existing| existing.accessor == accessor) {
            Some(existing) => *existing = installed,
            None => self.validations.push(installed),
        }
    }

    fn clear_validation(&mut self, accessor: &str) {
        self.validations.retain(|installed| installed.accessor != accessor);
    }

    fn polymorphic_associations(&self) -> Option<Vec<AssociationReflection>> {
        self.associations.clone()
    }
}

/// Attribute bag standing in for one persisted record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    attributes: Map<String, Value>,
    associations: HashMap<String, String>,
}

impl Instance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Loads a related object of `type_name` for `association` and records its type column.
    pub fn associate(&mut self, association: &str, type_name: impl Into<String>) {
        let type_name = type_name.into();
        self.attributes
            .insert(format!("{association}_type"), Value::String(type_name.clone()));
        self.associations.insert(association.to_string(), type_name);
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl From<Map<String, Value>> for Instance {
    fn from(attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            associations: HashMap::new(),
        }
    }
}

/// Non-object values produce an empty instance.
impl From<Value> for Instance {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(attributes) => Self::from(attributes),
            _ => Self::default(),
        }
    }
}

impl Record for Instance {
    fn read_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn write_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    fn associated_type_name(&self, association: &str) -> Option<String> {
        self.associations.get(association).cloned()
    }
}
