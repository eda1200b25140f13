//! The insight configuration: an immutable, declarative query intent.
//!
//! An [`Insight`] describes what a user wants answered - base table, selected
//! fields, metrics, filters, grouping, ordering, joins - without being SQL
//! yet. Every mutation method returns a fresh value; the receiver is never
//! touched, so UI state can safely hold stale references to prior versions.
//!
//! Validation against the schema is deliberately deferred to compilation
//! ([`crate::compile`]): references go stale transiently while a user edits,
//! and that must not be an error here.

pub mod filter;
pub mod join;
pub mod metric;
pub mod order;

pub use filter::{FilterOp, FilterPredicate};
pub use join::{JoinConfig, JoinKind};
pub use metric::InsightMetric;
pub use order::{OrderSpec, SortDirection};

use serde::{Deserialize, Serialize};

use crate::schema::{DataTable, FieldId, TableId};

/// A declarative query configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub name: String,
    pub base_table_id: TableId,
    #[serde(default)]
    pub selected_fields: Vec<FieldId>,
    #[serde(default)]
    pub metrics: Vec<InsightMetric>,
    #[serde(default)]
    pub filters: Vec<FilterPredicate>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub order_by: Vec<OrderSpec>,
    #[serde(default)]
    pub joins: Vec<JoinConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// A partial update applied by [`Insight::with`]. Unset pieces are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_fields: Option<Vec<FieldId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<InsightMetric>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<FilterPredicate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joins: Option<Vec<JoinConfig>>,
    /// `Some(None)` clears the limit; `None` leaves it unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Option<u64>>,
}

impl Insight {
    /// Create an insight over a base table with everything else empty.
    pub fn new(id: &str, name: &str, base_table: &DataTable) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_table_id: base_table.id.clone(),
            selected_fields: Vec::new(),
            metrics: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            joins: Vec::new(),
            limit: None,
        }
    }

    /// Apply a partial update, replacing only the pieces the patch sets.
    pub fn with(&self, patch: InsightPatch) -> Self {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name;
        }
        if let Some(fields) = patch.selected_fields {
            next.selected_fields = fields;
        }
        if let Some(metrics) = patch.metrics {
            next.metrics = metrics;
        }
        if let Some(filters) = patch.filters {
            next.filters = filters;
        }
        if let Some(group_by) = patch.group_by {
            next.group_by = group_by;
        }
        if let Some(order_by) = patch.order_by {
            next.order_by = order_by;
        }
        if let Some(joins) = patch.joins {
            next.joins = joins;
        }
        if let Some(limit) = patch.limit {
            next.limit = limit;
        }
        next
    }

    /// Replace the selected fields.
    pub fn with_selected_fields(&self, fields: Vec<FieldId>) -> Self {
        let mut next = self.clone();
        next.selected_fields = fields;
        next
    }

    /// Replace the metrics.
    pub fn with_metrics(&self, metrics: Vec<InsightMetric>) -> Self {
        let mut next = self.clone();
        next.metrics = metrics;
        next
    }

    /// Replace the filters.
    pub fn with_filters(&self, filters: Vec<FilterPredicate>) -> Self {
        let mut next = self.clone();
        next.filters = filters;
        next
    }

    /// Replace the group-by columns.
    pub fn with_group_by(&self, group_by: Vec<String>) -> Self {
        let mut next = self.clone();
        next.group_by = group_by;
        next
    }

    /// Replace the sort specs.
    pub fn with_order_by(&self, order_by: Vec<OrderSpec>) -> Self {
        let mut next = self.clone();
        next.order_by = order_by;
        next
    }

    /// Replace the joins.
    pub fn with_joins(&self, joins: Vec<JoinConfig>) -> Self {
        let mut next = self.clone();
        next.joins = joins;
        next
    }

    /// Set or clear the row limit.
    pub fn with_limit(&self, limit: Option<u64>) -> Self {
        let mut next = self.clone();
        next.limit = limit;
        next
    }

    /// Rename the insight.
    pub fn with_name(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.name = name.into();
        next
    }

    /// Whether any metric is present (drives GROUP BY emission).
    pub fn has_metrics(&self) -> bool {
        !self.metrics.is_empty()
    }
}
