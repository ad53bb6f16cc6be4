//! Query objects returned by synthesized scopes.
//!
//! Scopes do not execute anything. A [`Query`] carries the table and the conditions a host's
//! query layer needs; it can render itself as SQL text or filter in-memory records.

use serde::Serialize;
use serde_json::Value;

use crate::host::Record;

/// A single predicate over one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    /// The column equals the value. A null value matches null or absent attributes.
    Equals { column: String, value: Value },
    /// All nested conditions hold.
    And(Vec<Condition>),
}

impl Condition {
    /// Create a column equality condition.
    #[inline]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &dyn Record) -> bool {
        match self {
            Condition::Equals { column, value } => record.read_attribute(column).unwrap_or(Value::Null) == *value,
            Condition::And(conditions) => conditions.iter().all(|condition| condition.matches(record)),
        }
    }

    fn to_sql(&self, table: &str) -> String {
        match self {
            Condition::Equals { column, value } if value.is_null() => {
                format!("{}.{} IS NULL", quote_identifier(table), quote_identifier(column))
            }
            Condition::Equals { column, value } => format!(
                "{}.{} = {}",
                quote_identifier(table),
                quote_identifier(column),
                sql_literal(value)
            ),
            Condition::And(conditions) if conditions.is_empty() => "1=1".to_string(),
            Condition::And(conditions) => {
                let parts: Vec<String> = conditions.iter().map(|condition| condition.to_sql(table)).collect();
                format!("({})", parts.join(" AND "))
            }
        }
    }
}

/// Query builder produced by a scope, e.g. "records whose `status` equals `active`".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub table: String,
    pub conditions: Vec<Condition>,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
        }
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::eq(column, value));
        self
    }

    pub fn matches(&self, record: &dyn Record) -> bool {
        self.conditions.iter().all(|condition| condition.matches(record))
    }

    /// Records satisfying every condition, in input order.
    pub fn filter<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|record| self.matches(*record)).collect()
    }

    pub fn to_sql(&self) -> String {
        let table = quote_identifier(&self.table);
        if self.conditions.is_empty() {
            return format!("SELECT {table}.* FROM {table}");
        }
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .map(|condition| condition.to_sql(&self.table))
            .collect();
        format!("SELECT {table}.* FROM {table} WHERE {}", clauses.join(" AND "))
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => format!("'{}'", text.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Instance;
    use serde_json::json;

    #[test]
    fn renders_equality_scope() {
        let query = Query::new("test_models").where_eq("sample_column", "value1");
        assert_eq!(
            query.to_sql(),
            r#"SELECT "test_models".* FROM "test_models" WHERE "test_models"."sample_column" = 'value1'"#
        );
    }

    #[test]
    fn renders_literals() {
        let query = Query::new("t")
            .where_eq("a", 3)
            .where_eq("b", true)
            .where_eq("c", Value::Null)
            .where_eq("d", "it's");
        assert_eq!(
            query.to_sql(),
            r#"SELECT "t".* FROM "t" WHERE "t"."a" = 3 AND "t"."b" = TRUE AND "t"."c" IS NULL AND "t"."d" = 'it''s'"#
        );
    }

    #[test]
    fn renders_nested_conditions() {
        let mut query = Query::new("t");
        query.conditions.push(Condition::And(vec![Condition::eq("a", 1), Condition::eq("b", 2)]));
        assert_eq!(query.to_sql(), r#"SELECT "t".* FROM "t" WHERE ("t"."a" = 1 AND "t"."b" = 2)"#);
    }

    #[test]
    fn filters_records_in_memory() {
        let records = vec![
            Instance::from(json!({ "status": "active", "role": "admin" })),
            Instance::from(json!({ "status": "archived", "role": "admin" })),
            Instance::from(json!({ "status": "active", "role": "member" })),
        ];
        let query = Query::new("users")
            .where_eq("status", "active")
            .where_eq("role", "admin");
        let matched = query.filter(&records);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].get("role"), Some(&json!("admin")));
    }

    #[test]
    fn null_matches_absent_attributes() {
        let record = Instance::new();
        assert!(Query::new("t").where_eq("status", Value::Null).matches(&record));
        assert!(!Query::new("t").where_eq("status", "active").matches(&record));
    }
}
