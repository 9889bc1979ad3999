//! End-to-end fetch invariants over a scripted catalog.
//!
//! Every test drives `QueryService::fetch` and inspects the one statement
//! handed to the catalog plus the diagnostics logged along the way.

use std::sync::Arc;

use serde_json::{json, Value};

use tablefetch::catalog::MemoryCatalog;
use tablefetch::observability::{Event, Logger, MemorySink};
use tablefetch::query::{FetchRequest, QueryError, QueryService, MAX_LIMIT};

fn service() -> (QueryService<MemoryCatalog>, Arc<MemorySink>) {
    let catalog = MemoryCatalog::new()
        .with_table(
            "Patient",
            "tabPatient",
            &["name", "patient_name", "age", "status", "modified"],
            vec![
                json!({"name": "PAT-1", "patient_name": "Ada", "age": 36, "status": "Active", "modified": "2024-03-01"}),
                json!({"name": "PAT-2", "patient_name": "Alan", "age": 41, "status": "Inactive", "modified": "2024-03-02"}),
            ],
        )
        .with_table(
            "Doctor",
            "tabDoctor",
            &["name", "fee"],
            vec![json!({"name": "DR-1", "fee": 40})],
        )
        .with_entity("Lab Test", "tabLab Test");

    let sink = Arc::new(MemorySink::new());
    let service = QueryService::with_logger(catalog, Logger::with_sink(sink.clone()));
    (service, sink)
}

fn executed_sql(service: &QueryService<MemoryCatalog>) -> String {
    service.catalog().last_executed().unwrap().sql
}

fn executed_params(service: &QueryService<MemoryCatalog>) -> Vec<Value> {
    service.catalog().last_executed().unwrap().params
}

// =============================================================================
// Parameter binding
// =============================================================================

#[test]
fn test_metacharacter_values_only_reach_params() {
    let (service, _) = service();
    let hostile = [
        "x' OR '1'='1",
        "PAT-1; DROP TABLE tabPatient",
        "PAT-1 -- comment",
    ];

    for value in hostile {
        let request = FetchRequest::new("Patient").filters(json!({ "name": value }));
        service.fetch(&request).unwrap();

        let sql = executed_sql(&service);
        assert!(!sql.contains(value), "raw value leaked into {}", sql);
        assert!(!sql.contains('\''));
        assert!(!sql.contains(';'));
        assert!(!sql.contains("--"));
        assert_eq!(executed_params(&service), vec![json!(value)]);
    }
}

#[test]
fn test_like_pattern_is_bound() {
    let (service, _) = service();
    let request = FetchRequest::new("Patient")
        .filters(r#"[["patient_name", "like", "A%'; --"]]"#);
    service.fetch(&request).unwrap();

    assert_eq!(
        executed_sql(&service),
        "SELECT `name` FROM `tabPatient` WHERE `patient_name` LIKE ? ORDER BY `modified` DESC LIMIT 20"
    );
    assert_eq!(executed_params(&service), vec![json!("A%'; --")]);
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_equality_filter() {
    let (service, _) = service();
    service
        .fetch(&FetchRequest::new("Patient").filters(r#"{"status": "Active"}"#))
        .unwrap();

    assert!(executed_sql(&service).contains("WHERE `status` = ?"));
    assert_eq!(executed_params(&service), vec![json!("Active")]);
}

#[test]
fn test_comparison_filter() {
    let (service, _) = service();
    service
        .fetch(&FetchRequest::new("Patient").filters(r#"{"age": [">=", 18]}"#))
        .unwrap();

    assert!(executed_sql(&service).contains("WHERE `age` >= ?"));
    assert_eq!(executed_params(&service), vec![json!(18)]);
}

#[test]
fn test_in_filter_expands_placeholders() {
    let (service, _) = service();
    service
        .fetch(
            &FetchRequest::new("Patient")
                .filters(json!({"status": ["in", ["Active", "Inactive"]], "age": ["<", 65]})),
        )
        .unwrap();

    assert!(executed_sql(&service)
        .contains("WHERE `status` IN (?, ?) AND `age` < ?"));
    assert_eq!(
        executed_params(&service),
        vec![json!("Active"), json!("Inactive"), json!(65)]
    );
}

#[test]
fn test_unparseable_filter_text_means_no_filters() {
    let (service, sink) = service();
    let rows = service
        .fetch(&FetchRequest::new("Patient").filters("{not valid json"))
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert!(!executed_sql(&service).contains("WHERE"));
    assert!(executed_params(&service).is_empty());
    assert!(sink.events(Event::FetchRejected).is_empty());
}

#[test]
fn test_bad_field_inside_parseable_filters_is_rejected() {
    let (service, sink) = service();
    let err = service
        .fetch(&FetchRequest::new("Patient").filters(r#"{"status = 1 OR 1": "x"}"#))
        .unwrap_err();

    assert!(matches!(err, QueryError::InvalidField(_)));
    assert!(service.catalog().executed().is_empty());
    assert_eq!(sink.events(Event::FetchRejected).len(), 1);
}

#[test]
fn test_unknown_operator_is_rejected() {
    let (service, _) = service();
    let err = service
        .fetch(&FetchRequest::new("Patient").filters(json!({"age": ["between", [1, 9]]})))
        .unwrap_err();
    assert_eq!(err, QueryError::UnsupportedOperator("between".to_string()));
}

#[test]
fn test_empty_in_list_is_rejected() {
    let (service, _) = service();
    let err = service
        .fetch(&FetchRequest::new("Patient").filters(json!({"status": ["in", []]})))
        .unwrap_err();
    assert_eq!(err.code(), "QUERY_INVALID_FILTER_VALUE");
    assert!(service.catalog().executed().is_empty());
}

#[test]
fn test_filter_on_missing_column_is_rejected() {
    let (service, _) = service();
    let err = service
        .fetch(&FetchRequest::new("Doctor").filters(json!({"status": "Active"})))
        .unwrap_err();
    assert_eq!(err, QueryError::UnknownField("status".to_string()));
}

// =============================================================================
// Field selection
// =============================================================================

#[test]
fn test_unknown_fields_are_dropped() {
    let (service, sink) = service();
    let rows = service
        .fetch(&FetchRequest::new("Patient").fields(json!(["patient_name", "ssn", "age"])))
        .unwrap();

    assert!(executed_sql(&service).starts_with("SELECT `patient_name`, `age` FROM"));
    for row in &rows {
        assert!(row.keys().all(|k| k == "patient_name" || k == "age"));
    }

    let dropped = sink.events(Event::FetchInvalidColumn);
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].field("field"), Some("ssn"));
}

#[test]
fn test_all_unknown_fields_fall_back_to_name() {
    let (service, _) = service();
    let rows = service
        .fetch(&FetchRequest::new("Patient").fields("ssn,blood_group"))
        .unwrap();

    assert!(executed_sql(&service).starts_with("SELECT `name` FROM"));
    assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["name"]);
}

#[test]
fn test_single_field_string() {
    let (service, _) = service();
    service
        .fetch(&FetchRequest::new("Doctor").fields("fee"))
        .unwrap();
    assert_eq!(
        executed_sql(&service),
        "SELECT `fee` FROM `tabDoctor` LIMIT 20"
    );
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_explicit_sort() {
    let (service, _) = service();
    service
        .fetch(&FetchRequest::new("Doctor").order_by("fee desc"))
        .unwrap();
    assert!(executed_sql(&service).contains("ORDER BY `fee` DESC"));
}

#[test]
fn test_default_sort_by_modified() {
    let (service, _) = service();
    service.fetch(&FetchRequest::new("Patient")).unwrap();
    assert!(executed_sql(&service).contains("ORDER BY `modified` DESC"));
}

#[test]
fn test_no_default_sort_without_modified_column() {
    let (service, _) = service();
    service.fetch(&FetchRequest::new("Doctor")).unwrap();
    assert!(!executed_sql(&service).contains("ORDER BY"));
}

#[test]
fn test_sort_injection_is_rejected() {
    let (service, _) = service();
    let err = service
        .fetch(&FetchRequest::new("Patient").order_by("(SELECT 1) desc"))
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidField(_)));
}

#[test]
fn test_unknown_sort_column_falls_back_to_default() {
    let (service, sink) = service();
    service
        .fetch(&FetchRequest::new("Patient").order_by("salary desc"))
        .unwrap();

    assert!(executed_sql(&service).contains("ORDER BY `modified` DESC"));
    assert_eq!(sink.events(Event::FetchInvalidSortColumn).len(), 1);
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn test_limit_is_always_clamped() {
    let (service, _) = service();
    let cases: Vec<(Value, String)> = vec![
        (json!(-5), "LIMIT 1".to_string()),
        (json!(0), "LIMIT 1".to_string()),
        (json!(5000), format!("LIMIT {}", MAX_LIMIT)),
        (json!("abc"), "LIMIT 20".to_string()),
        (json!(true), "LIMIT 20".to_string()),
        (Value::Null, "LIMIT 20".to_string()),
        (json!("7"), "LIMIT 7".to_string()),
    ];

    for (limit, expected) in cases {
        service
            .fetch(&FetchRequest::new("Doctor").limit(limit.clone()))
            .unwrap();
        assert!(
            executed_sql(&service).ends_with(&expected),
            "limit {} gave {}",
            limit,
            executed_sql(&service)
        );
    }
}

#[test]
fn test_offset_only_when_positive() {
    let (service, _) = service();
    service
        .fetch(&FetchRequest::new("Doctor").limit(json!(10)).start(json!(30)))
        .unwrap();
    assert!(executed_sql(&service).ends_with("LIMIT 10 OFFSET 30"));

    service
        .fetch(&FetchRequest::new("Doctor").limit(json!(10)).start(json!(-3)))
        .unwrap();
    assert!(executed_sql(&service).ends_with("LIMIT 10"));
}

// =============================================================================
// Soft failures
// =============================================================================

#[test]
fn test_empty_entity_returns_nothing_silently() {
    let (service, sink) = service();
    assert!(service.fetch(&FetchRequest::new("")).unwrap().is_empty());
    assert!(service.catalog().executed().is_empty());
    assert!(sink.diagnostics().is_empty());
}

#[test]
fn test_nonexistent_entity_logs_one_diagnostic() {
    let (service, sink) = service();
    let rows = service.fetch(&FetchRequest::new("Ward")).unwrap();

    assert!(rows.is_empty());
    assert!(service.catalog().executed().is_empty());

    let diagnostics = sink.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].event, Event::FetchMissingEntity);
    assert_eq!(diagnostics[0].field("entity"), Some("Ward"));
}

#[test]
fn test_entity_without_table_logs_one_diagnostic() {
    let (service, sink) = service();
    let rows = service.fetch(&FetchRequest::new("Lab Test")).unwrap();

    assert!(rows.is_empty());
    let diagnostics = sink.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].event, Event::FetchMissingTable);
    assert_eq!(diagnostics[0].field("table"), Some("tabLab Test"));
}

#[test]
fn test_each_fetch_executes_exactly_once() {
    let (service, _) = service();
    service
        .fetch(
            &FetchRequest::new("Patient")
                .fields("name,patient_name")
                .filters(json!([["age", ">", 30], ["status", "!=", "Inactive"]]))
                .order_by("patient_name asc, age desc")
                .limit("5"),
        )
        .unwrap();

    let executed = service.catalog().executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        executed[0].sql,
        "SELECT `name`, `patient_name` FROM `tabPatient` WHERE `age` > ? AND `status` != ? \
         ORDER BY `patient_name` ASC, `age` DESC LIMIT 5"
    );
    assert_eq!(executed[0].params, vec![json!(30), json!("Inactive")]);
}

#[test]
fn test_request_id_shared_across_log_lines() {
    let (service, sink) = service();
    service
        .fetch(&FetchRequest::new("Patient").fields("name,ssn"))
        .unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 2);
    let ids: Vec<_> = records.iter().map(|r| r.field("request_id")).collect();
    assert!(ids[0].is_some());
    assert_eq!(ids[0], ids[1]);
    assert_eq!(records[1].event, Event::FetchComplete);
}
