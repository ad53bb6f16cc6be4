use std::sync::Arc;

use serde_json::Value;

use crate::errors::ValidationIssue;
use crate::host::Record;
use crate::types::{CustomValidator, ValidationRule};

pub const INCLUSION_CODE: &str = "validation.inclusion";
pub const INCLUSION_MESSAGE: &str = "is not included in the list";

/// Returns `true` if `value` is null or one of `allowed`.
pub fn is_included(value: &Value, allowed: &[Value]) -> bool {
    value.is_null() || allowed.contains(value)
}

/// `must be one of: a, b` with string values rendered without quotes.
pub fn one_of_message(allowed: &[Value]) -> String {
    let rendered: Vec<String> = allowed
        .iter()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect();
    format!("must be one of: {}", rendered.join(", "))
}

/// Runs one installed rule against `record`, collecting failures.
pub fn run_rule(column: &str, rule: &ValidationRule, record: &dyn Record, issues: &mut Vec<ValidationIssue>) {
    match rule {
        ValidationRule::Inclusion { allowed } => {
            let value = record.read_attribute(column).unwrap_or(Value::Null);
            if !is_included(&value, allowed) {
                issues.push(ValidationIssue::new(column, INCLUSION_CODE, INCLUSION_MESSAGE));
            }
        }
        ValidationRule::Custom(validator) => validator(record, issues),
    }
}

/// Validation for the type column of a polymorphic belongs-to association.
///
/// With a loaded related object its type name is checked and failures attach to the association.
/// Without one the raw column is checked and failures attach to the column; null passes.
pub fn polymorphic_type(association: String, column: String, allowed: Vec<Value>) -> CustomValidator {
    Arc::new(move |record: &dyn Record, issues: &mut Vec<ValidationIssue>| {
        match record.associated_type_name(&association) {
            Some(type_name) => {
                if !allowed.contains(&Value::String(type_name)) {
                    issues.push(ValidationIssue::new(&association, INCLUSION_CODE, one_of_message(&allowed)));
                }
            }
            None => {
                let value = record.read_attribute(&column).unwrap_or(Value::Null);
                if !is_included(&value, &allowed) {
                    issues.push(ValidationIssue::new(&column, INCLUSION_CODE, one_of_message(&allowed)));
                }
            }
        }
    })
}
