//! Async boundary to the external execution engine.
//!
//! The core never runs SQL itself: it hands compiled text to an
//! [`ExecutionEngine`] implementation (an embedded columnar engine, a
//! warehouse connection, a remote worker) and gets back rows plus column
//! metadata. Everything on this side of the trait stays synchronous and
//! side-effect free.
//!
//! # Example
//!
//! ```ignore
//! use prism::engine::{run_insight, ExecutionEngine};
//!
//! async fn preview(engine: &dyn ExecutionEngine, sql: &str) {
//!     let outcome = run_insight(engine, sql).await;
//!     // outcome.rows is empty and outcome.error set when the engine failed
//! }
//! ```

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::insight::Insight;
use crate::schema::DataTable;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by an execution engine implementation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine rejected or failed to run a statement.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A referenced table/result set is not loaded in the engine.
    #[error("table not loaded: {0}")]
    TableNotLoaded(String),

    /// Loading a table's backing data into the engine failed.
    #[error("failed to load table {table}: {message}")]
    LoadFailed { table: String, message: String },

    /// The engine connection is gone.
    #[error("engine connection lost: {0}")]
    ConnectionLost(String),

    /// Engine response could not be decoded.
    #[error("failed to decode engine response: {0}")]
    DecodeFailed(#[from] serde_json::Error),
}

/// Metadata for one result column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    /// Engine-reported type name (e.g. `VARCHAR`, `DOUBLE`, `DATE`).
    pub type_name: String,
}

/// Rows plus column metadata returned by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub columns: Vec<ColumnMeta>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    /// Set when execution failed and the result degraded to empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultSet {
    /// An empty result carrying an execution error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column by name, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }
}

/// The execution collaborator: runs compiled SQL, loads table data.
///
/// Implementations own their connection handling, cancellation, and
/// timeouts; a compiled SQL string is inert until handed over here.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Run a compiled SQL statement and return rows + column metadata.
    async fn run_sql(&self, sql: &str) -> EngineResult<ResultSet>;

    /// Make a table's backing data queryable in the engine.
    async fn load_table(&self, table: &DataTable) -> EngineResult<()>;
}

/// Load every table a joined query needs, in parallel.
///
/// All loads must complete before the compiled SQL is submitted; a single
/// failure aborts the batch.
pub async fn load_tables(
    engine: &dyn ExecutionEngine,
    tables: &[&DataTable],
) -> EngineResult<()> {
    try_join_all(tables.iter().map(|t| engine.load_table(t))).await?;
    Ok(())
}

/// Load the tables an insight references: its base table plus every join
/// target found in `tables`. Loads run in parallel like [`load_tables`].
pub async fn load_tables_for(
    engine: &dyn ExecutionEngine,
    insight: &Insight,
    tables: &[DataTable],
) -> EngineResult<()> {
    let needed: Vec<&DataTable> = tables
        .iter()
        .filter(|t| {
            t.id == insight.base_table_id
                || insight.joins.iter().any(|j| j.right_table_id == t.id)
        })
        .collect();
    load_tables(engine, &needed).await
}

/// Run compiled SQL, degrading engine failures to an empty result set with
/// an error message. Callers of this function never see an `Err`.
pub async fn run_insight(engine: &dyn ExecutionEngine, sql: &str) -> ResultSet {
    match engine.run_sql(sql).await {
        Ok(result) => result,
        Err(err) => ResultSet::failed(err.to_string()),
    }
}
