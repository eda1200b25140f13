//! Schema model: tables, fields, and metrics.
//!
//! These are read-only inputs supplied by the persistence collaborator.
//! The compiler and analyzers never mutate them; edits happen upstream and
//! arrive here as fresh snapshots.

use serde::{Deserialize, Serialize};

/// Identifier of a [`DataTable`].
pub type TableId = String;
/// Identifier of a [`Field`].
pub type FieldId = String;
/// Identifier of a [`Metric`].
pub type MetricId = String;

/// Declared primitive type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Boolean,
}

/// A column-level schema fact. Immutable once created; edits replace the
/// whole record upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub table_id: TableId,
    pub name: String,
    pub column_name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub is_identifier: bool,
    #[serde(default)]
    pub is_reference: bool,
}

/// Aggregation function for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    CountDistinct,
}

impl Aggregation {
    /// SQL function name for this aggregation.
    pub fn function_name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Count | Aggregation::CountDistinct => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }
}

/// A named aggregation over a column, or a bare row count.
///
/// `column_name` is `None` only for a bare `count(*)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: MetricId,
    pub table_id: TableId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    pub aggregation: Aggregation,
}

impl Metric {
    /// Plain aggregate SQL text for this metric.
    ///
    /// - bare `Count` with no column → `count(*)`
    /// - `CountDistinct` → `count(distinct <col>)`
    /// - everything else → `<fn>(<col>)`
    pub fn sql_text(&self) -> Option<String> {
        match (&self.column_name, self.aggregation) {
            (None, Aggregation::Count) => Some("count(*)".to_string()),
            (None, _) => None,
            (Some(col), Aggregation::CountDistinct) => Some(format!("count(distinct {col})")),
            (Some(col), agg) => Some(format!("{}({col})", agg.function_name())),
        }
    }
}

/// Schema description of a queryable table: fields plus metrics.
///
/// Owned by a data source; never shares identity across tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub id: TableId,
    pub name: String,
    pub data_source_id: String,
    /// Physical table (or loaded result set) name in the engine.
    pub source_table: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    /// Reference to a loaded result set, when the table is file-backed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_set_ref: Option<String>,
    pub created_at: String,
}

impl DataTable {
    /// Look up a field by id.
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Look up a field by its physical column name.
    pub fn field_by_column(&self, column_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.column_name == column_name)
    }

    /// Look up a metric by id.
    pub fn metric(&self, id: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.id == id)
    }
}
