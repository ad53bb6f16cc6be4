use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value;

use enum_fields::{Instance, Model, ValidationIssue};

use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, styled_table};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Record Validation",
    commands: &[
        r#"enum-fields validate enum_fields.toml --model Task --record '{"state": "open"}'"#,
        r#"enum-fields validate enum_fields.toml --model Comment --record '{"record_type": "Video"}'"#,
    ],
}];

#[derive(Args)]
pub struct ValidateArgs {
    /// TOML file declaring models and their enum fields
    pub config: PathBuf,

    /// Model whose validations are run
    #[arg(long)]
    pub model: String,

    /// Record attributes as a JSON object
    #[arg(long)]
    pub record: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub model: String,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn run(model: &Model, record: &Instance) -> Self {
        let issues = match model.validate(record) {
            Ok(()) => Vec::new(),
            Err(error) => error.issues,
        };
        Self {
            model: model.name().unwrap_or_default().to_string(),
            valid: issues.is_empty(),
            issues,
        }
    }
}

impl TableDisplay for ValidationReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = styled_table(options, &["Field", "Code", "Message"]);
        for issue in &self.issues {
            table.add_row(vec![Cell::new(&issue.field), Cell::new(&issue.code), Cell::new(&issue.message)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        if self.valid {
            return format!("{}: valid", self.model);
        }
        self.issues
            .iter()
            .map(|issue| format!("{}.{}: {}", self.model, issue.field, issue.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_record(raw: &str) -> Result<Instance> {
    let value: Value = serde_json::from_str(raw).context("Record must be valid JSON")?;
    match value {
        Value::Object(attributes) => Ok(Instance::from(attributes)),
        other => bail!("Record must be a JSON object, got {other}"),
    }
}

pub fn handle_validate(args: ValidateArgs, output: &OutputManager) -> Result<()> {
    let record = parse_record(&args.record)?;
    let models = super::load_models(&args.config)?;
    let Some(model) = models.iter().find(|model| model.name() == Some(args.model.as_str())) else {
        bail!("Model '{}' is not declared in {}", args.model, args.config.display());
    };

    let report = ValidationReport::run(model, &record);
    if report.valid {
        output.display(&report)?;
        output.success(&format!("Record is valid for {}", args.model));
        return Ok(());
    }

    output.heading("Validation Issues");
    output.display(&report)?;
    bail!("Record is invalid for {} ({} issues)", args.model, report.issues.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enum_fields::FieldOptions;
    use serde_json::json;

    #[test]
    fn rejects_non_object_records() {
        assert!(parse_record("[1, 2]").is_err());
        assert!(parse_record("not json").is_err());
        assert_eq!(parse_record(r#"{"state": "open"}"#).unwrap().get("state"), Some(&json!("open")));
    }

    #[test]
    fn reports_inclusion_failures() {
        let mut model = Model::new("Task");
        model
            .enum_field("state", json!(["open", "closed"]), FieldOptions::default())
            .unwrap();

        let report = ValidationReport::run(&model, &Instance::new().with("state", "archived"));
        assert!(!report.valid);
        assert_eq!(report.issues[0].field, "state");
        assert_eq!(report.to_compact(), "Task.state: is not included in the list");

        let report = ValidationReport::run(&model, &Instance::new().with("state", "open"));
        assert!(report.valid);
        assert_eq!(report.to_compact(), "Task: valid");
    }
}
