use std::collections::HashMap;

use prism::compile::{
    alias_display_map, compile_count, compile_insight, compile_page, CompileMode,
    CompileOptions, PageRequest,
};
use prism::insight::{
    FilterOp, FilterPredicate, Insight, InsightMetric, JoinConfig, JoinKind, OrderSpec,
    SortDirection,
};
use prism::schema::{Aggregation, DataTable, TableId};
use prism::sql::Dialect;
use serde_json::json;

fn orders_table() -> DataTable {
    serde_json::from_value(json!({
        "id": "t_orders",
        "name": "Orders",
        "data_source_id": "ds1",
        "source_table": "orders",
        "fields": [
            {"id": "f_cat", "table_id": "t_orders", "name": "Category",
             "column_name": "category", "type": "string"},
            {"id": "f_rev", "table_id": "t_orders", "name": "Revenue",
             "column_name": "revenue", "type": "number"},
            {"id": "f_cust", "table_id": "t_orders", "name": "Customer Id",
             "column_name": "customer_id", "type": "number"}
        ],
        "metrics": [],
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}

fn customers_table() -> DataTable {
    serde_json::from_value(json!({
        "id": "t_customers",
        "name": "Customers",
        "data_source_id": "ds1",
        "source_table": "customers",
        "fields": [
            {"id": "f_cname", "table_id": "t_customers", "name": "Customer Name",
             "column_name": "name", "type": "string"}
        ],
        "metrics": [],
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}

fn revenue_metric() -> InsightMetric {
    InsightMetric {
        id: "m1".to_string(),
        name: "Total Revenue".to_string(),
        column_name: Some("revenue".to_string()),
        aggregation: Aggregation::Sum,
        source_table: "t_orders".to_string(),
    }
}

fn no_joins() -> HashMap<TableId, DataTable> {
    HashMap::new()
}

#[test]
fn test_grouped_aggregation_sql() {
    let insight = Insight::new("i1", "Revenue by Category", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string()])
        .with_metrics(vec![revenue_metric()]);

    let sql = compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
    )
    .unwrap();
    insta::assert_snapshot!(sql, @r###"
    SELECT
      "category" AS "field_f_cat",
      SUM("revenue") AS "metric_m1"
    FROM "orders"
    GROUP BY "category"
    "###);
}

#[test]
fn test_compilation_is_deterministic() {
    let insight = Insight::new("i1", "Test", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string(), "f_rev".to_string()])
        .with_metrics(vec![revenue_metric()])
        .with_filters(vec![FilterPredicate::new(
            "category",
            FilterOp::Ne,
            json!("misc"),
        )])
        .with_limit(Some(500));

    let options = CompileOptions::default();
    let first = compile_insight(&orders_table(), &no_joins(), &insight, &options).unwrap();
    for _ in 0..10 {
        let again =
            compile_insight(&orders_table(), &no_joins(), &insight, &options).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_model_mode_is_select_star_over_joins() {
    let insight = Insight::new("i1", "Preview", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string()])
        .with_metrics(vec![revenue_metric()])
        .with_filters(vec![FilterPredicate::new(
            "category",
            FilterOp::Eq,
            json!("x"),
        )])
        .with_limit(Some(100));

    let sql = compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::model(),
    )
    .unwrap();

    // Raw preview ignores selection, metrics, and filters
    assert!(sql.contains("*"));
    assert!(!sql.contains("WHERE"));
    assert!(!sql.contains("GROUP BY"));
    assert!(!sql.contains("SUM"));
    assert!(sql.contains("LIMIT 100"));
}

#[test]
fn test_no_metric_means_no_group_by() {
    let insight = Insight::new("i1", "Plain", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string(), "f_rev".to_string()]);

    let sql = compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
    )
    .unwrap();
    assert!(!sql.contains("GROUP BY"));
    assert!(sql.contains("\"category\" AS \"field_f_cat\""));
    assert!(sql.contains("\"revenue\" AS \"field_f_rev\""));
}

#[test]
fn test_empty_selection_compiles_to_select_star() {
    let insight = Insight::new("i1", "Empty", &orders_table());
    let sql = compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
    )
    .unwrap();
    assert!(sql.contains("*"));
    assert!(sql.contains("FROM \"orders\""));
}

#[test]
fn test_join_qualifies_columns() {
    let insight = Insight::new("i1", "Joined", &orders_table())
        .with_joins(vec![JoinConfig {
            kind: JoinKind::Left,
            right_table_id: "t_customers".to_string(),
            left_key: "customer_id".to_string(),
            right_key: "id".to_string(),
        }])
        .with_selected_fields(vec!["f_cat".to_string(), "f_cname".to_string()])
        .with_metrics(vec![revenue_metric()]);

    let mut joined = HashMap::new();
    joined.insert("t_customers".to_string(), customers_table());

    let sql = compile_insight(
        &orders_table(),
        &joined,
        &insight,
        &CompileOptions::default(),
    )
    .unwrap();

    assert!(sql.contains("LEFT JOIN \"customers\""));
    assert!(sql.contains("ON \"orders\".\"customer_id\" = \"customers\".\"id\""));
    assert!(sql.contains("\"orders\".\"category\""));
    assert!(sql.contains("\"customers\".\"name\" AS \"field_f_cname\""));
    assert!(sql.contains("SUM(\"orders\".\"revenue\")"));
}

#[test]
fn test_missing_join_target_fails_compilation() {
    let insight = Insight::new("i1", "Broken", &orders_table()).with_joins(vec![JoinConfig {
        kind: JoinKind::Inner,
        right_table_id: "t_missing".to_string(),
        left_key: "customer_id".to_string(),
        right_key: "id".to_string(),
    }]);

    let sql = compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
    );
    assert!(sql.is_none());
}

#[test]
fn test_unknown_field_fails_compilation() {
    let insight = Insight::new("i1", "Broken", &orders_table())
        .with_selected_fields(vec!["f_ghost".to_string()]);
    assert!(compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default()
    )
    .is_none());
}

#[test]
fn test_wrong_base_table_fails_compilation() {
    let insight = Insight::new("i1", "Mismatch", &customers_table());
    assert!(compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default()
    )
    .is_none());
}

#[test]
fn test_count_query_wraps_and_strips_ordering() {
    let insight = Insight::new("i1", "Paged", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string()])
        .with_order_by(vec![OrderSpec::desc("category")])
        .with_limit(Some(25));

    let sql = compile_count(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
    )
    .unwrap();

    // The declared limit caps what the insight returns, so it caps the
    // count too; only the sort is dropped.
    insta::assert_snapshot!(sql, @r###"
    SELECT
      COUNT(*) AS "count"
    FROM (
    SELECT
      "category" AS "field_f_cat"
    FROM "orders"
    LIMIT 25
    ) AS "q"
    "###);
}

#[test]
fn test_count_query_without_limit_counts_all_rows() {
    let insight = Insight::new("i1", "Unpaged", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string()]);

    let sql = compile_count(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
    )
    .unwrap();

    assert!(!sql.contains("LIMIT"));
    assert!(sql.contains("COUNT(*) AS \"count\""));
}

#[test]
fn test_page_request_overrides_sort_and_paging() {
    let insight = Insight::new("i1", "Paged", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string()])
        .with_order_by(vec![OrderSpec::asc("category")])
        .with_limit(Some(1000));

    let page = PageRequest {
        limit: Some(50),
        offset: Some(100),
        sort_column: Some("field_f_cat".to_string()),
        sort_direction: Some(SortDirection::Desc),
    };

    let sql = compile_page(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
        &page,
    )
    .unwrap();

    assert!(sql.contains("\"field_f_cat\" DESC"));
    assert!(sql.contains("LIMIT 50 OFFSET 100"));
    assert!(!sql.contains("LIMIT 1000"));
    assert!(!sql.contains("ASC"));

    // The insight itself is untouched by the override
    assert_eq!(insight.limit, Some(1000));
    assert_eq!(insight.order_by[0].direction, SortDirection::Asc);
}

#[test]
fn test_incomplete_filter_is_dropped_not_fatal() {
    let incomplete = FilterPredicate {
        column_name: "category".to_string(),
        operator: FilterOp::Eq,
        value: None,
        values: None,
    };
    let insight = Insight::new("i1", "Half-built", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string()])
        .with_filters(vec![
            incomplete,
            FilterPredicate::new("revenue", FilterOp::Gte, json!(10)),
        ]);

    let sql = compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
    )
    .unwrap();
    assert!(sql.contains("WHERE \"revenue\" >= 10"));
    assert!(!sql.contains("AND"));
}

#[test]
fn test_compile_mode_default_is_query() {
    assert_eq!(CompileOptions::default().mode, CompileMode::Query);
    assert_eq!(CompileOptions::model().mode, CompileMode::Model);
}

#[test]
fn test_dialect_selection_changes_quoting_only_where_needed() {
    let insight = Insight::new("i1", "Test", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string()]);
    let duckdb = compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default(),
    )
    .unwrap();
    let postgres = compile_insight(
        &orders_table(),
        &no_joins(),
        &insight,
        &CompileOptions::default().with_dialect(Dialect::Postgres),
    )
    .unwrap();
    // Both dialects double-quote identifiers; this query is portable
    assert_eq!(duckdb, postgres);
}

#[test]
fn test_alias_display_map_matches_compiled_aliases() {
    let insight = Insight::new("i1", "Labelled", &orders_table())
        .with_selected_fields(vec!["f_cat".to_string()])
        .with_metrics(vec![revenue_metric()]);

    let map = alias_display_map(&orders_table(), &no_joins(), &insight);
    assert_eq!(map.get("field_f_cat").map(String::as_str), Some("Category"));
    assert_eq!(
        map.get("metric_m1").map(String::as_str),
        Some("Total Revenue")
    );

    // Unresolvable ids stay out of the map
    let broken = insight.with_selected_fields(vec!["f_ghost".to_string()]);
    let map = alias_display_map(&orders_table(), &no_joins(), &broken);
    assert!(!map.contains_key("field_f_ghost"));
}
