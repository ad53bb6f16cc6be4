use enum_fields::{DefinitionError, FieldOptions, HostModel, Instance, MethodError, Model, Query};
use serde_json::{Value, json};

fn definitions() -> Value {
    json!({
        "value1": { "value": "value1", "label": "Value 1", "additional_property": "additional_value1" },
        "value2": { "value": "value2", "label": "Value 2", "additional_property": "additional_value2" },
    })
}

fn test_model() -> Model {
    let mut model = Model::new("TestModel");
    model
        .enum_field("sample_column", definitions(), FieldOptions::default())
        .unwrap();
    model
}

fn record(value: impl Into<Value>) -> Instance {
    Instance::new().with("sample_column", value)
}

#[test]
fn collection_methods() {
    let model = test_model();

    assert_eq!(model.call("sample_columns"), Ok(definitions()));
    assert_eq!(model.call("sample_columns_count"), Ok(json!(2)));
    assert_eq!(model.call("sample_column_values"), Ok(json!(["value1", "value2"])));
    assert_eq!(
        model.call("sample_column_options"),
        Ok(json!([["Value 1", "value1"], ["Value 2", "value2"]]))
    );
    assert_eq!(model.call("value1_sample_column_value"), Ok(json!("value1")));
    assert_eq!(model.call("value2_sample_column_value"), Ok(json!("value2")));
}

#[test]
fn metadata_and_properties() {
    let model = test_model();
    let record = record("value1");

    assert_eq!(
        model.call_on(&record, "sample_column_metadata"),
        Ok(definitions()["value1"].clone())
    );
    assert_eq!(model.call_on(&record, "sample_column_value"), Ok(json!("value1")));
    assert_eq!(model.call_on(&record, "sample_column_label"), Ok(json!("Value 1")));
    assert_eq!(
        model.call_on(&record, "sample_column_additional_property"),
        Ok(json!("additional_value1"))
    );
}

#[test]
fn property_reads_are_pure() {
    let model = test_model();
    let record = record("value2");

    let first = model.call_on(&record, "sample_column_label");
    let second = model.call_on(&record, "sample_column_label");
    assert_eq!(first, second);
}

#[test]
fn unresolved_values_read_as_null() {
    let model = test_model();

    for record in [Instance::new(), record(Value::Null), record("unknown")] {
        assert_eq!(model.call_on(&record, "sample_column_metadata"), Ok(Value::Null));
        assert_eq!(model.call_on(&record, "sample_column_label"), Ok(Value::Null));
    }
}

#[test]
fn predicates_compare_against_the_column() {
    let model = test_model();

    let first = record("value1");
    assert_eq!(model.call_on(&first, "value1_sample_column?"), Ok(json!(true)));
    assert_eq!(model.call_on(&first, "value2_sample_column?"), Ok(json!(false)));

    let empty = record(Value::Null);
    assert_eq!(model.call_on(&empty, "value1_sample_column?"), Ok(json!(false)));
    assert_eq!(model.call_on(&Instance::new(), "value2_sample_column?"), Ok(json!(false)));
}

#[test]
fn scopes_filter_on_the_column() {
    let model = test_model();

    let scope = model.scope("value1_sample_column").unwrap();
    assert_eq!(scope, Query::new("test_models").where_eq("sample_column", "value1"));
    assert_eq!(
        scope.to_sql(),
        r#"SELECT "test_models".* FROM "test_models" WHERE "test_models"."sample_column" = 'value1'"#
    );

    let records = vec![record("value1"), record("value2"), record("value1")];
    assert_eq!(model.scope("value2_sample_column").unwrap().filter(&records).len(), 1);
    assert_eq!(scope.filter(&records).len(), 2);
}

#[test]
fn inclusion_validation() {
    let model = test_model();

    assert!(model.is_valid(&record("value1")));
    assert!(model.is_valid(&record(Value::Null)));

    let error = model.validate(&record("invalid_value")).unwrap_err();
    assert_eq!(error.messages_for("sample_column"), vec!["is not included in the list"]);
    assert_eq!(error.issues[0].code, "validation.inclusion");
}

#[test]
fn validation_can_be_disabled() {
    let mut model = Model::new("TestModel");
    model
        .enum_field("sample_column", definitions(), FieldOptions::new().with_validate(false))
        .unwrap();

    assert!(model.validation_rule("sample_column").is_none());
    assert!(model.is_valid(&record("invalid_value")));
}

#[test]
fn array_definitions() {
    let mut model = Model::new("TestModel");
    model
        .enum_field("sample_column", json!(["value1", "value2"]), FieldOptions::default())
        .unwrap();

    assert_eq!(
        model.call("sample_columns"),
        Ok(json!({
            "value1": { "value": "value1", "label": "value1" },
            "value2": { "value": "value2", "label": "value2" },
        }))
    );
    assert_eq!(model.call_on(&record("value2"), "sample_column_label"), Ok(json!("value2")));
    assert!(!model.is_valid(&record("value3")));
}

#[test]
fn numeric_values_resolve_by_value_scan() {
    let mut model = Model::new("Ticket");
    model
        .enum_field(
            "priority",
            json!({
                "low": { "value": 1, "label": "Low" },
                "high": { "value": 3, "label": "High", "icon": "flame" },
            }),
            FieldOptions::default(),
        )
        .unwrap();

    let ticket = Instance::new().with("priority", 3);
    assert_eq!(model.call_on(&ticket, "priority_label"), Ok(json!("High")));
    assert_eq!(model.call_on(&ticket, "priority_icon"), Ok(json!("flame")));
    assert_eq!(model.call_on(&ticket, "high_priority?"), Ok(json!(true)));

    let low = Instance::new().with("priority", 1);
    assert_eq!(model.call_on(&low, "priority_icon"), Ok(Value::Null));
    assert_eq!(model.call("priority_values"), Ok(json!([1, 3])));
    assert_eq!(model.call("priority_options"), Ok(json!([["Low", "low"], ["High", "high"]])));
}

#[test]
fn labels_default_to_values() {
    let mut model = Model::new("Ticket");
    model
        .enum_field("state", json!({ "open": { "value": "o" } }), FieldOptions::default())
        .unwrap();
    assert_eq!(model.call("state_options"), Ok(json!([["o", "open"]])));
}

#[test]
fn redefinition_replaces_every_synthesized_name() {
    let mut model = test_model();
    model
        .enum_field(
            "sample_column",
            json!({ "value3": { "value": "value3", "label": "Value 3" } }),
            FieldOptions::default(),
        )
        .unwrap();

    assert_eq!(model.call("sample_columns_count"), Ok(json!(1)));
    assert_eq!(
        model.call("value1_sample_column_value"),
        Err(MethodError::undefined("value1_sample_column_value"))
    );
    assert!(model.scope("value1_sample_column").is_err());
    assert!(!model.instance_responds_to("value1_sample_column?"));
    assert!(!model.instance_responds_to("sample_column_additional_property"));
    assert!(model.instance_responds_to("value3_sample_column?"));

    assert!(model.is_valid(&record("value3")));
    assert!(!model.is_valid(&record("value1")));
    assert_eq!(model.enum_fields().len(), 1);
}

#[test]
fn model_level_conveniences() {
    let mut model = test_model();
    model
        .enum_field("state", json!(["open", "closed"]), FieldOptions::default())
        .unwrap();

    assert!(model.is_enum_field("sample_column"));
    assert!(!model.is_enum_field("title"));
    assert_eq!(model.enum_field_for("state").map(|definition| definition.len()), Some(2));
    assert!(model.enum_field_for("title").is_none());

    let record = record("value1").with("state", "unknown");
    let metadata = model.enum_fields_metadata(&record);
    assert_eq!(metadata.keys().collect::<Vec<_>>(), vec!["sample_column", "state"]);
    assert_eq!(metadata["sample_column"]["label"], json!("Value 1"));
    assert_eq!(metadata["state"], Value::Null);
}

#[test]
fn definition_errors() {
    let mut model = Model::new("TestModel");

    assert_eq!(
        model.enum_field("sample_column", Value::Null, FieldOptions::default()),
        Err(DefinitionError::Missing)
    );
    assert!(matches!(
        model.enum_field("sample_column", json!("invalid"), FieldOptions::default()),
        Err(DefinitionError::Invalid { .. })
    ));
    assert!(matches!(
        model.enum_field("sample_column", json!({ "x": { "label": "x" } }), FieldOptions::default()),
        Err(DefinitionError::Invalid { .. })
    ));
    assert!(model.enum_fields().is_empty());
    assert!(!model.responds_to("sample_columns"));
}

#[test]
fn anonymous_models_use_their_token() {
    let mut model = Model::anonymous();
    model
        .enum_field("state", json!(["open"]), FieldOptions::default())
        .unwrap();

    let scope = model.scope("open_state").unwrap();
    assert_eq!(scope.table, format!("anonymous_{}", model.model_token()));
    assert!(scope.matches(&Instance::new().with("state", "open")));
}
