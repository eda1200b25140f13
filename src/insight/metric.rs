//! Metrics scoped to an insight.

use serde::{Deserialize, Serialize};

use crate::schema::{Aggregation, Metric, MetricId, TableId};
use crate::sql::expr::{self, Expr};

/// A metric selected into an insight.
///
/// Mirrors [`Metric`] but carries the table it is computed over, so metrics
/// can aggregate columns of joined tables, not just the base table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMetric {
    pub id: MetricId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    pub aggregation: Aggregation,
    /// Table the aggregated column lives on.
    pub source_table: TableId,
}

impl InsightMetric {
    /// Adopt a schema metric into an insight.
    pub fn from_metric(metric: &Metric) -> Self {
        Self {
            id: metric.id.clone(),
            name: metric.name.clone(),
            column_name: metric.column_name.clone(),
            aggregation: metric.aggregation,
            source_table: metric.table_id.clone(),
        }
    }

    /// Plain aggregate SQL text, `None` when the metric shape is invalid
    /// (a non-count aggregation with no column).
    pub fn sql_text(&self) -> Option<String> {
        Metric {
            id: self.id.clone(),
            table_id: self.source_table.clone(),
            name: self.name.clone(),
            column_name: self.column_name.clone(),
            aggregation: self.aggregation,
        }
        .sql_text()
    }

    /// Aggregate expression for SQL compilation, optionally table-qualified.
    pub fn expr(&self, table: Option<&str>) -> Option<Expr> {
        let column = |name: &str| match table {
            Some(t) => expr::table_col(t, name),
            None => expr::col(name),
        };
        Some(match (&self.column_name, self.aggregation) {
            (None, Aggregation::Count) => expr::count_star(),
            (None, _) => return None,
            (Some(c), Aggregation::Sum) => expr::sum(column(c)),
            (Some(c), Aggregation::Avg) => expr::avg(column(c)),
            (Some(c), Aggregation::Count) => expr::count(column(c)),
            (Some(c), Aggregation::Min) => expr::min(column(c)),
            (Some(c), Aggregation::Max) => expr::max(column(c)),
            (Some(c), Aggregation::CountDistinct) => expr::count_distinct(column(c)),
        })
    }
}
