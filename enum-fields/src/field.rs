//! Field generator.
//!
//! [`EnumField::define`] normalizes a raw definition, registers it, stores it on the model and
//! installs the full behavior surface into the model's dispatch tables. Every installed closure
//! captures the field (accessor, column and the shared definition); nothing is re-normalized at
//! read time.

use std::sync::Arc;

use log::{debug, trace, warn};
use serde_json::{Map, Value, json};

use crate::definition::{EnumDefinition, Metadata};
use crate::errors::DefinitionError;
use crate::host::{HostModel, Record};
use crate::keys::FieldNames;
use crate::query::Query;
use crate::registry;
use crate::types::{FieldOptions, ValidationRule};
use crate::validators;

/// One enum field of one model: accessor, storage column, definition and options.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumField {
    accessor: String,
    column: String,
    definition: Arc<EnumDefinition>,
    validate: bool,
}

impl EnumField {
    /// Builds the field without installing anything.
    pub fn new(accessor: impl Into<String>, definition: &Value, options: &FieldOptions) -> Result<Self, DefinitionError> {
        let accessor = accessor.into();
        let column = options.column.clone().unwrap_or_else(|| accessor.clone());
        Ok(Self {
            accessor,
            column,
            definition: Arc::new(EnumDefinition::new(definition)?),
            validate: options.validate,
        })
    }

    /// Defines `accessor` on `model`, replacing any previous definition of the same accessor.
    pub fn define<M: HostModel + ?Sized>(
        model: &mut M,
        accessor: &str,
        definition: &Value,
        options: FieldOptions,
    ) -> Result<Arc<EnumField>, DefinitionError> {
        let field = Arc::new(Self::new(accessor, definition, &options)?);
        field.install(model);
        Ok(field)
    }

    pub fn accessor(&self) -> &str {
        &self.accessor
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn definition(&self) -> &Arc<EnumDefinition> {
        &self.definition
    }

    pub fn validates(&self) -> bool {
        self.validate
    }

    /// True when the accessor reads and writes a differently-named column.
    pub fn has_custom_column(&self) -> bool {
        self.accessor != self.column
    }

    pub fn names(&self) -> FieldNames<'_> {
        FieldNames::new(&self.accessor)
    }

    /// Current column value, with `null` and absent both reported as `None`.
    pub fn column_value(&self, record: &dyn Record) -> Option<Value> {
        record.read_attribute(&self.column).filter(|value| !value.is_null())
    }

    /// Metadata entry matching the record's current column value.
    pub fn metadata(&self, record: &dyn Record) -> Option<&Metadata> {
        let value = self.column_value(record)?;
        self.definition.lookup(&value)
    }

    /// One property of the current metadata entry.
    pub fn property(&self, record: &dyn Record, property: &str) -> Option<&Value> {
        self.metadata(record).and_then(|metadata| metadata.get(property))
    }

    /// True iff the column currently holds the `value` of `key`.
    pub fn is(&self, record: &dyn Record, key: &str) -> bool {
        match self.definition.get(key) {
            Some(metadata) => record.read_attribute(&self.column).unwrap_or(Value::Null) == *metadata.value(),
            None => false,
        }
    }

    /// The `value` declared under `key`.
    pub fn value_of(&self, key: &str) -> Option<&Value> {
        self.definition.get(key).map(Metadata::value)
    }

    /// Query for records whose column holds the `value` of `key`.
    pub fn scope(&self, table: &str, key: &str) -> Option<Query> {
        self.value_of(key)
            .map(|value| Query::new(table).where_eq(self.column.clone(), value.clone()))
    }

    /// Every name this field installs into a model's dispatch tables.
    pub fn synthesized_names(&self) -> Vec<String> {
        let names = self.names();
        let mut synthesized = vec![names.collection(), names.count(), names.values(), names.options()];
        synthesized.extend(self.definition.keys().map(|key| names.value_constant(key)));
        if self.has_custom_column() {
            synthesized.push(names.getter());
            synthesized.push(names.writer());
        }
        synthesized.push(names.metadata());
        synthesized.extend(self.definition.properties().iter().map(|property| names.property(property)));
        synthesized.extend(self.definition.keys().map(|key| names.predicate(key)));
        synthesized.extend(self.definition.keys().map(|key| names.scope(key)));
        synthesized
    }

    fn install<M: HostModel + ?Sized>(self: &Arc<Self>, model: &mut M) {
        let model_key = model.registry_key();

        if let Some(previous) = model.enum_fields().get(&self.accessor).cloned() {
            debug!("redefining enum field {model_key}.{}", self.accessor);
            for name in previous.synthesized_names() {
                model.undefine(&name);
            }
            model.clear_validation(previous.accessor());
        }

        let duplicates = self.definition.duplicate_values();
        if !duplicates.is_empty() {
            warn!(
                "enum field {model_key}.{} declares values under several keys: {duplicates:?}; lookups resolve to the first key",
                self.accessor
            );
        }

        registry::register(model, &self.accessor, Arc::clone(&self.definition));
        model.enum_fields_mut().insert(Arc::clone(self));

        self.define_collection_methods(model);
        self.define_value_constants(model);
        self.define_accessors(model);
        self.define_metadata_method(model);
        self.define_property_methods(model);
        self.define_predicates(model);
        self.define_scopes(model);
        let validation = self.define_validation(model);

        debug!(
            "defined enum field {model_key}.{} (column: {}, entries: {}, validation: {validation})",
            self.accessor,
            self.column,
            self.definition.len()
        );
    }

    fn define_collection_methods<M: HostModel + ?Sized>(&self, model: &mut M) {
        let names = self.names();

        let definition = Arc::clone(&self.definition);
        define_class(model, names.collection(), move || definition.to_value());

        let definition = Arc::clone(&self.definition);
        define_class(model, names.count(), move || json!(definition.len()));

        let definition = Arc::clone(&self.definition);
        define_class(model, names.values(), move || {
            Value::Array(definition.entry_values().into_iter().cloned().collect())
        });

        let definition = Arc::clone(&self.definition);
        define_class(model, names.options(), move || {
            let options = definition
                .options()
                .into_iter()
                .map(|(label, key)| json!([label, key]))
                .collect();
            Value::Array(options)
        });
    }

    fn define_value_constants<M: HostModel + ?Sized>(&self, model: &mut M) {
        let names = self.names();
        for (key, metadata) in self.definition.iter() {
            let value = metadata.value().clone();
            define_class(model, names.value_constant(key), move || value.clone());
        }
    }

    fn define_accessors<M: HostModel + ?Sized>(&self, model: &mut M) {
        if !self.has_custom_column() {
            return;
        }
        let names = self.names();

        let column = self.column.clone();
        trace!("synthesizing {}", names.getter());
        model.define_instance_method(
            names.getter(),
            Arc::new(move |record: &dyn Record| record.read_attribute(&column).unwrap_or(Value::Null)),
        );

        let column = self.column.clone();
        trace!("synthesizing {}", names.writer());
        model.define_instance_writer(
            names.writer(),
            Arc::new(move |record: &mut dyn Record, value: Value| record.write_attribute(&column, value)),
        );
    }

    fn define_metadata_method<M: HostModel + ?Sized>(self: &Arc<Self>, model: &mut M) {
        let field = Arc::clone(self);
        define_instance(model, self.names().metadata(), move |record| {
            field.metadata(record).map(Metadata::to_value).unwrap_or(Value::Null)
        });
    }

    fn define_property_methods<M: HostModel + ?Sized>(self: &Arc<Self>, model: &mut M) {
        let names = self.names();
        for property in self.definition.properties().iter() {
            let field = Arc::clone(self);
            let property_name = property.to_string();
            define_instance(model, names.property(property), move |record| {
                field.property(record, &property_name).cloned().unwrap_or(Value::Null)
            });
        }
    }

    fn define_predicates<M: HostModel + ?Sized>(self: &Arc<Self>, model: &mut M) {
        let names = self.names();
        for key in self.definition.keys() {
            let field = Arc::clone(self);
            let key_name = key.to_string();
            define_instance(model, names.predicate(key), move |record| Value::Bool(field.is(record, &key_name)));
        }
    }

    fn define_scopes<M: HostModel + ?Sized>(&self, model: &mut M) {
        let names = self.names();
        let table = model.table_name();
        for key in self.definition.keys() {
            let Some(query) = self.scope(&table, key) else {
                continue;
            };
            let name = names.scope(key);
            trace!("synthesizing scope {name}");
            model.define_scope(name, Arc::new(move || query.clone()));
        }
    }

    fn define_validation<M: HostModel + ?Sized>(&self, model: &mut M) -> &'static str {
        if !self.validate || self.definition.is_empty() {
            return "none";
        }

        let allowed: Vec<Value> = self.definition.entry_values().into_iter().cloned().collect();
        let rule = match self.polymorphic_association(model) {
            Some(association) => {
                ValidationRule::Custom(validators::polymorphic_type(association, self.column.clone(), allowed))
            }
            None => ValidationRule::Inclusion { allowed },
        };
        let kind = rule.kind();
        model.install_validation(&self.accessor, &self.column, rule);
        kind
    }

    /// Name of the polymorphic belongs-to association whose type column is this field's column.
    fn polymorphic_association<M: HostModel + ?Sized>(&self, model: &M) -> Option<String> {
        model
            .polymorphic_associations()?
            .into_iter()
            .find(|reflection| reflection.polymorphic && reflection.type_column() == self.column)
            .map(|reflection| reflection.name)
    }
}

fn define_class<M, F>(model: &mut M, name: String, method: F)
where
    M: HostModel + ?Sized,
    F: Fn() -> Value + Send + Sync + 'static,
{
    trace!("synthesizing class method {name}");
    model.define_class_method(name, Arc::new(method));
}

fn define_instance<M, F>(model: &mut M, name: String, method: F)
where
    M: HostModel + ?Sized,
    F: Fn(&dyn Record) -> Value + Send + Sync + 'static,
{
    trace!("synthesizing instance method {name}");
    model.define_instance_method(name, Arc::new(method));
}

/// Model-local accessor -> field store, in definition order.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: Vec<Arc<EnumField>>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, accessor: &str) -> Option<&Arc<EnumField>> {
        self.fields.iter().find(|field| field.accessor() == accessor)
    }

    /// Inserts `field`, replacing a field with the same accessor in place.
    pub fn insert(&mut self, field: Arc<EnumField>) -> Option<Arc<EnumField>> {
        match self.fields.iter_mut().find(|existing| existing.accessor() == field.accessor()) {
            Some(existing) => Some(std::mem::replace(existing, field)),
            None => {
                self.fields.push(field);
                None
            }
        }
    }

    pub fn contains(&self, accessor: &str) -> bool {
        self.get(accessor).is_some()
    }

    pub fn definition_for(&self, accessor: &str) -> Option<&EnumDefinition> {
        self.get(accessor).map(|field| field.definition().as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EnumField>> {
        self.fields.iter()
    }

    pub fn accessors(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.accessor())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw definitions keyed by accessor.
    pub fn to_value(&self) -> Value {
        let data: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.accessor().to_string(), field.definition().to_value()))
            .collect();
        Value::Object(data)
    }
}
