use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value;

use enum_fields::{HostModel, Model, Registry, RegistrySnapshot, registry};

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, styled_table};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Registry Overview",
        commands: &[
            "enum-fields inspect enum_fields.toml                  # Every declared field",
            "enum-fields inspect enum_fields.toml --model Comment  # One model only",
        ],
    },
    ExampleGroup {
        title: "Scripting",
        commands: &["enum-fields --output json inspect enum_fields.toml   # Registry snapshot as JSON"],
    },
];

#[derive(Args)]
pub struct InspectArgs {
    /// TOML file declaring models and their enum fields
    pub config: PathBuf,

    /// Only show this model
    #[arg(long)]
    pub model: Option<String>,
}

/// One registered enum field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldRow {
    pub model: String,
    pub accessor: String,
    pub column: String,
    pub keys: Vec<String>,
    pub values: Vec<Value>,
    pub properties: Vec<String>,
    pub validation: String,
}

/// Table rows for humans; the JSON form is the registry snapshot itself.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    #[serde(skip)]
    pub rows: Vec<FieldRow>,
    #[serde(flatten)]
    pub registry: RegistrySnapshot,
}

impl InspectReport {
    pub fn collect(models: &[&Model], registry: &Registry) -> Self {
        let mut rows = Vec::new();
        let mut snapshot = RegistrySnapshot::new();

        for model in models {
            let key = model.registry_key();
            for field in model.enum_fields().iter() {
                let Some(definition) = registry.get(&key, field.accessor()) else {
                    continue;
                };
                rows.push(FieldRow {
                    model: key.clone(),
                    accessor: field.accessor().to_string(),
                    column: field.column().to_string(),
                    keys: definition.keys().map(str::to_string).collect(),
                    values: definition.entry_values().into_iter().cloned().collect(),
                    properties: definition.properties().iter().map(str::to_string).collect(),
                    validation: model
                        .validation_for(field.accessor())
                        .map(|rule| rule.kind())
                        .unwrap_or("none")
                        .to_string(),
                });
                snapshot
                    .entry(key.clone())
                    .or_default()
                    .insert(field.accessor().to_string(), definition.to_value());
            }
        }

        Self {
            rows,
            registry: snapshot,
        }
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl TableDisplay for InspectReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = styled_table(
            options,
            &["Model", "Accessor", "Column", "Keys", "Values", "Properties", "Validation"],
        );
        for row in &self.rows {
            table.add_row(vec![
                Cell::new(&row.model),
                Cell::new(&row.accessor),
                Cell::new(&row.column),
                Cell::new(row.keys.join(", ")),
                Cell::new(join_values(&row.values)),
                Cell::new(row.properties.join(", ")),
                Cell::new(&row.validation),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("{}.{} ({}) = [{}]", row.model, row.accessor, row.column, row.keys.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn handle_inspect(args: InspectArgs, output: &OutputManager) -> Result<()> {
    let models = super::load_models(&args.config)?;
    output.info(&format!("Loaded {} models from {}", models.len(), args.config.display()));

    let selected: Vec<&Model> = models
        .iter()
        .filter(|model| match args.model.as_deref() {
            Some(name) => model.name() == Some(name),
            None => true,
        })
        .collect();

    if let Some(name) = args.model.as_deref()
        && selected.is_empty()
    {
        bail!("Model '{name}' is not declared in {}", args.config.display());
    }

    output.heading("Enum Fields");
    let report = InspectReport::collect(&selected, &registry());
    if report.rows.is_empty() {
        output.warning("No enum fields declared");
        return Ok(());
    }

    output.display(&report)?;
    output.success(&format!(
        "{} enum fields across {} models",
        report.rows.len(),
        report.registry.len()
    ));
    Ok(())
}
