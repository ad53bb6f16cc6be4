//! TOML declarations of enum fields.
//!
//! ```toml
//! [[models]]
//! name = "Admin::User"
//!
//! [[models.fields]]
//! accessor = "status"
//! column = "state"
//! definition = ["pending", "active"]
//! ```

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ConfigError, DefinitionError};
use crate::model::Model;
use crate::types::{AssociationReflection, FieldOptions};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumFieldsConfig {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Omitted for anonymous models.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub belongs_to: Vec<AssociationReflection>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl ModelConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(anonymous)")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub accessor: String,
    #[serde(flatten)]
    pub options: FieldOptions,
    #[serde(default)]
    pub definition: Option<Value>,
}

impl EnumFieldsConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded enum field configuration from {}", path.display());
        Self::from_toml_str(&source)
    }

    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models
            .iter()
            .find(|model| model.name.as_deref() == Some(name))
    }

    /// Builds every declared model, defining (and registering) each field in order.
    pub fn build_models(&self) -> Result<Vec<Model>, ConfigError> {
        self.models.iter().map(ModelConfig::build).collect()
    }
}

impl ModelConfig {
    pub fn build(&self) -> Result<Model, ConfigError> {
        let mut model = match &self.name {
            Some(name) => Model::new(name.clone()),
            None => Model::anonymous(),
        };
        for association in &self.belongs_to {
            model.belongs_to(association.name.clone(), association.polymorphic);
        }

        for field in &self.fields {
            let definition = field.definition.clone().ok_or(DefinitionError::Missing);
            definition
                .and_then(|definition| model.enum_field(&field.accessor, definition, field.options.clone()))
                .map_err(|source| ConfigError::Definition {
                    model: self.display_name().to_string(),
                    accessor: field.accessor.clone(),
                    source,
                })?;
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostModel;
    use crate::model::Instance;
    use serde_json::json;
    use serial_test::serial;
    use std::io::Write;

    const SAMPLE: &str = r#"
[[models]]
name = "Comment"

[[models.belongs_to]]
name = "record"
polymorphic = true

[[models.fields]]
accessor = "record_type"
definition = ["Article", "Photo"]

[[models.fields]]
accessor = "status"
column = "state"
validate = false

[models.fields.definition]
draft = { value = 0, label = "Draft" }
live = { value = 1, label = "Live", color = "green" }
"#;

    #[test]
    fn parses_declarations() {
        let config = EnumFieldsConfig::from_toml_str(SAMPLE).unwrap();
        let comment = config.model("Comment").unwrap();
        assert_eq!(comment.belongs_to, vec![AssociationReflection::new("record", true)]);
        assert_eq!(comment.fields.len(), 2);
        assert_eq!(comment.fields[0].options, FieldOptions::default());
        assert_eq!(
            comment.fields[1].options,
            FieldOptions::new().with_column("state").with_validate(false)
        );
        assert_eq!(
            comment.fields[1].definition,
            Some(json!({
                "draft": { "value": 0, "label": "Draft" },
                "live": { "value": 1, "label": "Live", "color": "green" },
            }))
        );
    }

    #[test]
    fn rejects_malformed_toml() {
        let error = EnumFieldsConfig::from_toml_str("[[models]\nname = 1").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    #[serial]
    fn builds_models_from_declarations() {
        let models = EnumFieldsConfig::from_toml_str(SAMPLE).unwrap().build_models().unwrap();
        let comment = &models[0];

        assert!(comment.has_custom_validations());
        assert!(comment.validation_rule("state").is_none());
        assert_eq!(comment.call("statuses_count"), Ok(json!(2)));

        let record = Instance::new().with("state", 1);
        assert_eq!(comment.call_on(&record, "status_color"), Ok(json!("green")));
        assert!(comment.is_enum_field("record_type"));
    }

    #[test]
    #[serial]
    fn missing_definition_names_the_field() {
        let source = r#"
[[models]]
name = "Task"

[[models.fields]]
accessor = "state"
"#;
        let error = EnumFieldsConfig::from_toml_str(source).unwrap().build_models().unwrap_err();
        match error {
            ConfigError::Definition { model, accessor, source } => {
                assert_eq!(model, "Task");
                assert_eq!(accessor, "state");
                assert_eq!(source, DefinitionError::Missing);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = EnumFieldsConfig::load(file.path()).unwrap();
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].display_name(), "Comment");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = EnumFieldsConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
