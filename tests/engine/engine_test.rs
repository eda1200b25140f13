use std::sync::Mutex;

use async_trait::async_trait;
use prism::engine::{
    load_tables, load_tables_for, run_insight, ColumnMeta, EngineError, EngineResult,
    ExecutionEngine, ResultSet,
};
use prism::insight::{Insight, JoinConfig, JoinKind};
use prism::schema::DataTable;
use serde_json::json;

/// In-memory engine double that records submitted SQL and loaded tables.
#[derive(Default)]
struct RecordingEngine {
    sql_log: Mutex<Vec<String>>,
    loaded: Mutex<Vec<String>>,
    fail_load: Option<String>,
    fail_sql: bool,
}

#[async_trait]
impl ExecutionEngine for RecordingEngine {
    async fn run_sql(&self, sql: &str) -> EngineResult<ResultSet> {
        self.sql_log.lock().unwrap().push(sql.to_string());
        if self.fail_sql {
            return Err(EngineError::QueryFailed(format!(
                "Parser Error: near \"{}\"",
                &sql[..sql.len().min(10)]
            )));
        }
        Ok(ResultSet {
            columns: vec![ColumnMeta {
                name: "count".to_string(),
                type_name: "BIGINT".to_string(),
            }],
            rows: vec![vec![json!(42)]],
            error: None,
        })
    }

    async fn load_table(&self, table: &DataTable) -> EngineResult<()> {
        if self.fail_load.as_deref() == Some(table.id.as_str()) {
            return Err(EngineError::LoadFailed {
                table: table.id.clone(),
                message: "file missing".to_string(),
            });
        }
        self.loaded.lock().unwrap().push(table.id.clone());
        Ok(())
    }
}

fn table(id: &str) -> DataTable {
    serde_json::from_value(json!({
        "id": id,
        "name": id,
        "data_source_id": "ds1",
        "source_table": id,
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_run_insight_passes_sql_through() {
    let engine = RecordingEngine::default();
    let result = run_insight(&engine, "SELECT 1").await;

    assert!(result.error.is_none());
    assert_eq!(result.row_count(), 1);
    assert_eq!(engine.sql_log.lock().unwrap().as_slice(), ["SELECT 1"]);
}

#[tokio::test]
async fn test_run_insight_degrades_instead_of_erroring() {
    let engine = RecordingEngine {
        fail_sql: true,
        ..Default::default()
    };
    let result = run_insight(&engine, "SELEKT oops").await;

    assert_eq!(result.row_count(), 0);
    assert!(result.columns.is_empty());
    let message = result.error.unwrap();
    assert!(message.contains("query failed"));
    assert!(message.contains("Parser Error"));
}

#[tokio::test]
async fn test_load_tables_loads_every_table() {
    let engine = RecordingEngine::default();
    let a = table("t_a");
    let b = table("t_b");
    let c = table("t_c");

    load_tables(&engine, &[&a, &b, &c]).await.unwrap();

    let mut loaded = engine.loaded.lock().unwrap().clone();
    loaded.sort();
    assert_eq!(loaded, ["t_a", "t_b", "t_c"]);
}

#[tokio::test]
async fn test_load_tables_for_picks_base_and_join_targets() {
    let engine = RecordingEngine::default();
    let orders = table("t_orders");
    let customers = table("t_customers");
    let unrelated = table("t_unrelated");
    let insight = Insight::new("i1", "Orders", &orders).with_joins(vec![JoinConfig::new(
        JoinKind::Left,
        "t_customers",
        "customer_id",
        "id",
    )]);

    load_tables_for(&engine, &insight, &[orders, customers, unrelated])
        .await
        .unwrap();

    let mut loaded = engine.loaded.lock().unwrap().clone();
    loaded.sort();
    assert_eq!(loaded, ["t_customers", "t_orders"]);
}

#[tokio::test]
async fn test_load_tables_fails_the_batch_on_one_failure() {
    let engine = RecordingEngine {
        fail_load: Some("t_b".to_string()),
        ..Default::default()
    };
    let a = table("t_a");
    let b = table("t_b");

    let err = load_tables(&engine, &[&a, &b]).await.unwrap_err();
    assert!(matches!(err, EngineError::LoadFailed { ref table, .. } if table == "t_b"));
}

#[tokio::test]
async fn test_load_tables_with_empty_batch_is_a_no_op() {
    let engine = RecordingEngine::default();
    load_tables(&engine, &[]).await.unwrap();
    assert!(engine.loaded.lock().unwrap().is_empty());
}

#[test]
fn test_result_set_serde_round_trip() {
    let result = ResultSet {
        columns: vec![ColumnMeta {
            name: "region".to_string(),
            type_name: "VARCHAR".to_string(),
        }],
        rows: vec![vec![json!("north")], vec![json!("south")]],
        error: None,
    };
    let raw = serde_json::to_string(&result).unwrap();
    let back: ResultSet = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_error_display_formats() {
    let err = EngineError::TableNotLoaded("t_orders".to_string());
    assert_eq!(err.to_string(), "table not loaded: t_orders");

    let err = EngineError::LoadFailed {
        table: "t_a".to_string(),
        message: "file missing".to_string(),
    };
    assert_eq!(err.to_string(), "failed to load table t_a: file missing");
}
