//! Unit tests for the pure parts of the ingestion pipeline and the
//! derived-metric arithmetic. Nothing here touches a database.

use serde_json::{json, Map, Value};

use chrono::NaiveDate;

use crate::commands::crm::{
    delivery_notification, should_notify_delivery, CustomerContact, DeliveryInput,
};
use crate::commands::stats::{batch_efficiency, overall_efficiency};
use crate::ingest::{drying_ratio_and_yield, insert_sql, param_values};
use crate::normalize::{camel_to_snake, normalize_keys};
use crate::registry::{self, FieldKind};
use crate::validate::{to_message, validate, IssueKind};

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {:?}", other),
    }
}

fn schema(route: &str) -> &'static registry::RecordSchema {
    registry::find(route).unwrap_or_else(|| panic!("no schema for {}", route))
}

// --- key normalization ---

#[test]
fn camel_case_keys_become_snake_case() {
    assert_eq!(camel_to_snake("collectionDate"), "collection_date");
    assert_eq!(camel_to_snake("wasteWeight"), "waste_weight");
    assert_eq!(camel_to_snake("trayFacilityId"), "tray_facility_id");
}

#[test]
fn snake_case_keys_pass_through() {
    assert_eq!(camel_to_snake("collection_date"), "collection_date");
    assert_eq!(camel_to_snake("notes"), "notes");
}

#[test]
fn leading_uppercase_gets_no_underscore() {
    assert_eq!(camel_to_snake("Date"), "date");
    assert_eq!(camel_to_snake("QCPersonnel"), "q_c_personnel");
}

#[test]
fn normalize_recurses_into_nested_structures() {
    let input = json!({
        "outerKey": {"innerKey": 1},
        "listKey": [{"deepKey": "x"}, 2],
    });
    let expected = json!({
        "outer_key": {"inner_key": 1},
        "list_key": [{"deep_key": "x"}, 2],
    });
    assert_eq!(normalize_keys(input), expected);
}

#[test]
fn normalize_is_idempotent() {
    let input = json!({"collectionDate": "2026-01-01", "wasteWeight": 12.5});
    let once = normalize_keys(input);
    let twice = normalize_keys(once.clone());
    assert_eq!(once, twice);
}

// --- validation ---

#[test]
fn validation_reports_every_missing_field_at_once() {
    let schema = schema("storage-records");
    let payload = as_map(json!({"storage_date": "2026-01-10"}));
    let issues = validate(&payload, schema);

    let missing: Vec<&str> = issues
        .iter()
        .filter(|i| i.kind == IssueKind::Missing)
        .map(|i| i.field)
        .collect();
    assert_eq!(
        missing,
        vec![
            "storage_method",
            "storage_conditions",
            "storage_duration",
            "planned_utilization",
        ]
    );
}

#[test]
fn blank_and_null_required_values_count_as_missing() {
    let schema = schema("hatchery/cleaning");
    let payload = as_map(json!({
        "cleaning_date": "2026-01-10",
        "areas_cleaned": "   ",
        "cleaning_materials": null,
        "cleaning_personnel": "Amina",
    }));
    let issues = validate(&payload, schema);
    let fields: Vec<&str> = issues.iter().map(|i| i.field).collect();
    assert_eq!(fields, vec!["areas_cleaned", "cleaning_materials"]);
}

#[test]
fn numeric_strings_are_accepted_but_garbage_is_not() {
    let schema = schema("waste-sourcing");
    let mut payload = as_map(json!({
        "collection_date": "2026-01-10",
        "collection_time": "08:30",
        "source_type": "market",
        "source_name": "Central Market",
        "waste_type": "fruit",
        "waste_weight": "12.5",
        "segregation_status": "segregated",
        "collection_personnel": "Joseph",
        "recorded_by": "joseph",
    }));
    assert!(validate(&payload, schema).is_empty());

    payload.insert("waste_weight".to_string(), json!("heavy"));
    let issues = validate(&payload, schema);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, "waste_weight");
    assert_eq!(issues[0].kind, IssueKind::NotNumeric);
}

#[test]
fn issue_message_keeps_missing_and_invalid_in_separate_clauses() {
    let schema = schema("processing-records");
    let payload = as_map(json!({
        "processing_date": "2026-01-10",
        "processing_type": "composting",
        "waste_processed": "many",
    }));
    let message = to_message(&validate(&payload, schema));
    assert_eq!(
        message,
        "Missing required fields: processing_method; Invalid numeric values for: waste_processed"
    );
}

#[test]
fn missing_optional_fields_raise_no_issue() {
    let schema = schema("hatchery/monitoring");
    let payload = as_map(json!({
        "monitoring_date": "2026-01-10",
        "temperature_c": 29.5,
        "humidity_percent": 70,
    }));
    assert!(validate(&payload, schema).is_empty());
}

// --- insert building ---

#[test]
fn insert_sql_casts_each_placeholder_by_kind() {
    let schema = schema("hatchery/monitoring");
    let sql = insert_sql(schema, &[]);
    assert_eq!(
        sql,
        "INSERT INTO hatchery_monitoring (monitoring_date, temperature_c, humidity_percent, \
         adjustments_made) VALUES ($1::date, $2::double precision, $3::double precision, $4) \
         RETURNING id"
    );
}

#[test]
fn insert_sql_appends_extra_columns_last() {
    let schema = schema("storage-records");
    let sql = insert_sql(schema, &[("recorded_by", FieldKind::Text)]);
    assert!(sql.contains("storage_observations, recorded_by)"));
    assert!(sql.ends_with("$7) RETURNING id"));
}

#[test]
fn param_values_substitute_defaults_for_absent_optionals() {
    let schema = schema("waste-sourcing");
    let payload = as_map(json!({
        "collection_date": "2026-01-10",
        "collection_time": "08:30",
        "source_type": "market",
        "source_name": "Central Market",
        "waste_type": "fruit",
        "waste_weight": 12.5,
        "segregation_status": "segregated",
        "collection_personnel": "Joseph",
        "recorded_by": "joseph",
    }));
    let params = param_values(schema, &payload);
    // contaminants_found and collection_notes default to empty strings
    assert_eq!(params[7], Some(String::new()));
    assert_eq!(params[8], Some(String::new()));
}

#[test]
fn param_values_bind_null_for_defaultless_optionals() {
    let schema = schema("processing-records");
    let payload = as_map(json!({
        "processing_date": "2026-01-10",
        "processing_type": "composting",
        "processing_method": "windrow",
        "waste_processed": 100,
    }));
    let params = param_values(schema, &payload);
    assert_eq!(params[4], None); // by_products
    assert_eq!(params[5], None); // waste_reduction
}

#[test]
fn multi_select_arrays_are_stored_comma_joined() {
    let schema = schema("waste-sourcing");
    let payload = as_map(json!({
        "collection_date": "2026-01-10",
        "contaminants_found": ["plastic", "glass"],
    }));
    let params = param_values(schema, &payload);
    assert_eq!(params[7], Some("plastic,glass".to_string()));
}

#[test]
fn numeric_string_params_are_trimmed() {
    let schema = schema("hatchery/monitoring");
    let payload = as_map(json!({
        "monitoring_date": "2026-01-10",
        "temperature_c": " 29.5 ",
        "humidity_percent": 70,
    }));
    let params = param_values(schema, &payload);
    assert_eq!(params[1], Some("29.5".to_string()));
}

// --- derived drying metrics ---

#[test]
fn drying_ratio_uses_plain_weights() {
    let (ratio, yield_pct) = drying_ratio_and_yield(300.0, 100.0);
    assert_eq!(ratio, "300:100");
    assert!((yield_pct - 33.333).abs() < 0.01);
}

#[test]
fn drying_ratio_is_na_when_nothing_was_produced() {
    let (ratio, yield_pct) = drying_ratio_and_yield(250.0, 0.0);
    assert_eq!(ratio, "N/A");
    assert_eq!(yield_pct, 0.0);
}

#[test]
fn drying_yield_is_zero_without_input_weight() {
    let (ratio, yield_pct) = drying_ratio_and_yield(0.0, 40.0);
    assert_eq!(ratio, "0:40");
    assert_eq!(yield_pct, 0.0);
}

#[test]
fn fractional_weights_keep_their_decimals() {
    let (ratio, _) = drying_ratio_and_yield(10.5, 3.5);
    assert_eq!(ratio, "10.5:3.5");
}

// --- statistics arithmetic ---

#[test]
fn system_efficiency_guards_division_by_zero() {
    assert_eq!(overall_efficiency(0.0, 50.0, 20.0), 0.0);
    assert!((overall_efficiency(1000.0, 150.0, 250.0) - 0.4).abs() < 1e-9);
}

#[test]
fn batch_efficiency_against_target_ratio() {
    let (ratio, efficiency) = batch_efficiency(Some(300.0), Some(100.0));
    assert_eq!(ratio, "3.00:1");
    assert!((efficiency - 100.0).abs() < 1e-9);

    let (ratio, efficiency) = batch_efficiency(Some(400.0), Some(100.0));
    assert_eq!(ratio, "4.00:1");
    assert!((efficiency - 75.0).abs() < 1e-9);
}

#[test]
fn batch_efficiency_handles_missing_output() {
    assert_eq!(batch_efficiency(Some(300.0), None), ("N/A".to_string(), 0.0));
    assert_eq!(batch_efficiency(Some(300.0), Some(0.0)), ("N/A".to_string(), 0.0));
}

// --- delivery notification rules ---

fn delivery(status: &str) -> DeliveryInput {
    DeliveryInput {
        date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        customer_id: Some(1),
        product: Some("dried larvae".to_string()),
        quantity: Some(25.0),
        status: status.to_string(),
        notes: None,
    }
}

fn acme() -> CustomerContact {
    CustomerContact {
        name: "Acme Feeds".to_string(),
        email: Some("orders@acme.test".to_string()),
        address: Some("12 Mill Road".to_string()),
    }
}

#[test]
fn delivery_update_notifies_only_on_transition_into_delivered() {
    assert!(should_notify_delivery("Pending", "Delivered"));
    assert!(should_notify_delivery("In Transit", "delivered"));
    assert!(should_notify_delivery("Pending", "  DELIVERED  "));
    assert!(!should_notify_delivery("Delivered", "Delivered"));
    assert!(!should_notify_delivery("delivered", "Delivered"));
    assert!(!should_notify_delivery("Pending", "In Transit"));
}

#[test]
fn delivery_creation_announces_any_status() {
    for status in ["Pending", "In Transit", "Delivered"] {
        let (subject, body) = delivery_notification(&acme(), &delivery(status), None)
            .unwrap_or_else(|| panic!("creation with status {} should notify", status));
        assert_eq!(subject, "Delivery Update for Acme Feeds");
        assert!(body.contains(&format!("Your delivery status is now: {}", status)));
    }
}

#[test]
fn delivery_completion_mail_fires_exactly_once() {
    // Pending creation announces the status, the transition confirms
    // completion, and a repeated Delivered update stays silent.
    let created = delivery_notification(&acme(), &delivery("Pending"), None);
    assert!(created.is_some());

    let (subject, body) =
        delivery_notification(&acme(), &delivery("Delivered"), Some("Pending"))
            .expect("transition into Delivered should notify");
    assert_eq!(subject, "Delivery Confirmation for Acme Feeds");
    assert!(body.contains("Your delivery has been completed"));

    assert!(delivery_notification(&acme(), &delivery("Delivered"), Some("Delivered")).is_none());
    assert!(delivery_notification(&acme(), &delivery("In Transit"), Some("Pending")).is_none());
}

// --- registry sanity ---

#[test]
fn routes_and_aliases_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for schema in registry::SCHEMAS {
        assert!(seen.insert(schema.route), "duplicate route {}", schema.route);
        for alias in schema.aliases {
            assert!(seen.insert(alias), "duplicate alias {}", alias);
        }
    }
}

#[test]
fn report_labels_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for schema in registry::SCHEMAS {
        assert!(seen.insert(schema.label), "duplicate label {}", schema.label);
    }
}

#[test]
fn every_schema_has_a_date_column_and_fields() {
    for schema in registry::SCHEMAS {
        assert!(!schema.fields.is_empty(), "{} has no fields", schema.route);
        assert!(!schema.date_column.is_empty(), "{} has no date column", schema.route);
        assert!(
            schema.fields.iter().any(|f| f.required),
            "{} has no required fields",
            schema.route
        );
    }
}

#[test]
fn find_resolves_aliases() {
    let by_route = schema("drying/qc");
    let by_alias = schema("drying/quality-control");
    assert_eq!(by_route.table, by_alias.table);

    let harvest = schema("feeding/harvest");
    assert_eq!(harvest.table, "feeding_harvest_yield");
}
