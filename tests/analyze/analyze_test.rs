use prism::analyze::{ColumnAnalyzer, SemanticType};
use prism::config::AnalyzeSettings;
use prism::engine::{ColumnMeta, ResultSet};
use prism::schema::DataTable;
use serde_json::{json, Value};

fn meta(name: &str, type_name: &str) -> ColumnMeta {
    ColumnMeta {
        name: name.to_string(),
        type_name: type_name.to_string(),
    }
}

fn sales_result() -> ResultSet {
    ResultSet {
        columns: vec![
            meta("category", "VARCHAR"),
            meta("revenue", "DOUBLE"),
            meta("created_at", "TIMESTAMP"),
            meta("customer_email", "VARCHAR"),
        ],
        rows: (0..60)
            .map(|i| {
                vec![
                    json!(["hardware", "software", "services"][i % 3]),
                    json!(i as f64 * 12.5),
                    json!(format!("2024-01-{:02} 09:00:00", (i % 28) + 1)),
                    json!(format!("user{i}@example.com")),
                ]
            })
            .collect(),
        error: None,
    }
}

fn sales_table() -> DataTable {
    serde_json::from_value(json!({
        "id": "t1",
        "name": "Sales",
        "data_source_id": "ds1",
        "source_table": "sales",
        "fields": [
            {"id": "f1", "table_id": "t1", "name": "Category",
             "column_name": "category", "type": "string"},
            {"id": "f2", "table_id": "t1", "name": "Revenue",
             "column_name": "revenue", "type": "number"},
            {"id": "f3", "table_id": "t1", "name": "Created At",
             "column_name": "created_at", "type": "date"},
            {"id": "f4", "table_id": "t1", "name": "Customer Email",
             "column_name": "customer_email", "type": "string"}
        ],
        "metrics": [],
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}

#[test]
fn test_full_result_classification() {
    let analyzer = ColumnAnalyzer::default();
    let analyses = analyzer.analyze_result(&sales_result(), Some(&sales_table()));

    assert_eq!(analyses.len(), 4);
    assert_eq!(analyses[0].semantic, SemanticType::Categorical);
    assert_eq!(analyses[1].semantic, SemanticType::Numerical);
    assert_eq!(analyses[2].semantic, SemanticType::Temporal);
    assert_eq!(analyses[3].semantic, SemanticType::Email);
}

#[test]
fn test_classification_without_schema_falls_back_to_engine_types() {
    let analyzer = ColumnAnalyzer::default();
    let analyses = analyzer.analyze_result(&sales_result(), None);

    assert_eq!(analyses[0].semantic, SemanticType::Categorical);
    assert_eq!(analyses[1].semantic, SemanticType::Numerical);
    assert_eq!(analyses[2].semantic, SemanticType::Temporal);
}

#[test]
fn test_cardinality_statistics() {
    let analyzer = ColumnAnalyzer::default();
    let analyses = analyzer.analyze_result(&sales_result(), Some(&sales_table()));

    let category = &analyses[0];
    assert_eq!(category.distinct_count, 3);
    assert_eq!(category.null_count, 0);
    assert_eq!(category.sample_size, 60);
    assert!(category.unique_ratio < 0.1);

    let email = &analyses[3];
    assert_eq!(email.distinct_count, 60);
    assert!((email.unique_ratio - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_sample_size_setting_caps_rows_scanned() {
    let analyzer = ColumnAnalyzer::new(AnalyzeSettings {
        sample_size: 10,
        ..Default::default()
    });
    let analyses = analyzer.analyze_result(&sales_result(), None);
    assert_eq!(analyses[0].sample_size, 10);
}

#[test]
fn test_empty_result_set_yields_unknown_columns() {
    let analyzer = ColumnAnalyzer::default();
    let result = ResultSet {
        columns: vec![meta("mystery", "BLOB")],
        rows: vec![],
        error: None,
    };
    let analyses = analyzer.analyze_result(&result, None);
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].semantic, SemanticType::Unknown);
    assert_eq!(analyses[0].sample_size, 0);
}

#[test]
fn test_failed_result_set_analyzes_to_nothing() {
    let analyzer = ColumnAnalyzer::default();
    let analyses = analyzer.analyze_result(&ResultSet::failed("boom"), None);
    assert!(analyses.is_empty());
}

#[test]
fn test_uuid_values_classified_by_shape() {
    let analyzer = ColumnAnalyzer::default();
    let result = ResultSet {
        columns: vec![meta("token", "VARCHAR")],
        rows: vec![
            vec![json!("550e8400-e29b-41d4-a716-446655440000")],
            vec![json!("6fa459ea-ee8a-3ca4-894e-db77e160355e")],
            vec![json!("16fd2706-8baf-433b-82eb-8c7fada847da")],
        ],
        error: None,
    };
    let analyses = analyzer.analyze_result(&result, None);
    assert_eq!(analyses[0].semantic, SemanticType::Uuid);
}

#[test]
fn test_reference_named_numeric_column() {
    let analyzer = ColumnAnalyzer::default();
    let result = ResultSet {
        columns: vec![meta("customer_id", "BIGINT")],
        rows: (0..40).map(|i| vec![Value::from(i % 12)]).collect(),
        error: None,
    };
    let analyses = analyzer.analyze_result(&result, None);
    assert_eq!(analyses[0].semantic, SemanticType::Reference);
}

#[test]
fn test_categorical_threshold_is_configurable() {
    let result = ResultSet {
        columns: vec![meta("bucket", "INTEGER")],
        rows: (0..100).map(|i| vec![Value::from(i % 30)]).collect(),
        error: None,
    };

    // 30 distinct values exceed the default cap of 20
    let analyses = ColumnAnalyzer::default().analyze_result(&result, None);
    assert_eq!(analyses[0].semantic, SemanticType::Numerical);

    let relaxed = ColumnAnalyzer::new(AnalyzeSettings {
        categorical_max_distinct: 50,
        ..Default::default()
    });
    let analyses = relaxed.analyze_result(&result, None);
    assert_eq!(analyses[0].semantic, SemanticType::Categorical);
}

#[test]
fn test_nulls_do_not_poison_classification() {
    let analyzer = ColumnAnalyzer::default();
    let result = ResultSet {
        columns: vec![meta("amount", "DOUBLE")],
        rows: (0..50)
            .map(|i| {
                if i % 5 == 0 {
                    vec![Value::Null]
                } else {
                    vec![json!(i as f64 * 1.1)]
                }
            })
            .collect(),
        error: None,
    };
    let analyses = analyzer.analyze_result(&result, None);
    assert_eq!(analyses[0].semantic, SemanticType::Numerical);
    assert_eq!(analyses[0].null_count, 10);
}
