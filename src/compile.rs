//! Compilation from an insight configuration to SQL text.
//!
//! ```text
//! Insight + resolved tables → Query → SQL string
//! ```
//!
//! Compilation is a pure function: identical inputs produce byte-identical
//! SQL, which makes the output safe to cache (see [`crate::cache`]) and
//! trivial to test. Unresolvable references - a missing base table, a field
//! or metric id that no supplied table knows, a join target absent from the
//! resolved table map - yield `None` rather than an error, because callers
//! routinely probe compilability while the user is still editing.
//!
//! # Example
//!
//! ```ignore
//! use prism::compile::{compile_insight, CompileOptions};
//!
//! let sql = compile_insight(&base, &joined, &insight, &CompileOptions::default());
//! ```

use std::collections::HashMap;

use crate::insight::{Insight, SortDirection};
use crate::schema::{DataTable, Field, TableId};
use crate::sql::expr::{col, star, table_col, Expr, ExprExt};
use crate::sql::query::{LimitOffset, OrderByExpr, Query, SelectExpr, TableRef};
use crate::sql::Dialect;

// ============================================================================
// Options
// ============================================================================

/// What the compiled statement is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Raw preview of the joined base data: `SELECT *` over the join graph,
    /// no filters, no metrics, no grouping.
    Model,
    /// The fully aggregated, filtered, sorted result.
    #[default]
    Query,
}

/// Compilation options.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub mode: CompileMode,
    pub dialect: Dialect,
}

impl CompileOptions {
    pub fn model() -> Self {
        Self {
            mode: CompileMode::Model,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: CompileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

/// Ad hoc pagination and sort override for a compiled insight.
///
/// Lets a UI page through results and sort by a clicked column header
/// without mutating the insight itself.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub sort_column: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

// ============================================================================
// Alias scheme
// ============================================================================

/// Stable select-list alias for a field id.
///
/// Aliases derive from ids, not display names, so two joined tables with
/// same-named columns can never collide in the result set.
pub fn field_alias(field_id: &str) -> String {
    format!("field_{field_id}")
}

/// Stable select-list alias for a metric id.
pub fn metric_alias(metric_id: &str) -> String {
    format!("metric_{metric_id}")
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile an insight into a single SQL statement.
///
/// `joined` must contain every table referenced by `insight.joins`;
/// returns `None` when anything the insight references cannot be resolved.
pub fn compile_insight(
    base: &DataTable,
    joined: &HashMap<TableId, DataTable>,
    insight: &Insight,
    options: &CompileOptions,
) -> Option<String> {
    let query = build_query(base, joined, insight, options)?;
    Some(query.to_sql(options.dialect))
}

/// Compile the row-count companion query:
/// `SELECT COUNT(*) FROM (<compiled insight, unsorted>) AS q`.
///
/// The insight's own declared limit stays in the inner query: it caps what
/// the insight returns, so it caps the count too. Only ordering is stripped,
/// since it cannot change the count and the engine can skip the sort.
pub fn compile_count(
    base: &DataTable,
    joined: &HashMap<TableId, DataTable>,
    insight: &Insight,
    options: &CompileOptions,
) -> Option<String> {
    let mut inner = build_query(base, joined, insight, options)?;
    inner.order_by = Vec::new();

    let count = Query::new()
        .select(vec![crate::sql::expr::count_star().alias("count")])
        .from_subquery(inner, "q");
    Some(count.to_sql(options.dialect))
}

/// Compile with an ad hoc pagination/sort override applied on top of the
/// insight's declared configuration. The insight is not modified.
pub fn compile_page(
    base: &DataTable,
    joined: &HashMap<TableId, DataTable>,
    insight: &Insight,
    options: &CompileOptions,
    page: &PageRequest,
) -> Option<String> {
    let mut query = build_query(base, joined, insight, options)?;

    if let Some(sort_column) = &page.sort_column {
        let dir = page.sort_direction.unwrap_or_default().sql_dir();
        query.order_by = vec![OrderByExpr {
            expr: col(sort_column),
            dir: Some(dir),
        }];
    }
    if page.limit.is_some() || page.offset.is_some() {
        query.limit_offset = Some(LimitOffset {
            limit: page.limit,
            offset: page.offset,
        });
    }

    Some(query.to_sql(options.dialect))
}

/// Map select-list aliases to display names for presentation layers.
///
/// Only resolvable fields and metrics appear; the map is derived from the
/// same ids the compiler aliases with, so it always matches compiled output.
pub fn alias_display_map(
    base: &DataTable,
    joined: &HashMap<TableId, DataTable>,
    insight: &Insight,
) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for field_id in &insight.selected_fields {
        if let Some((field, _)) = resolve_field(base, joined, insight, field_id) {
            map.insert(field_alias(field_id), field.name.clone());
        }
    }
    for metric in &insight.metrics {
        map.insert(metric_alias(&metric.id), metric.name.clone());
    }
    map
}

// ============================================================================
// Query assembly
// ============================================================================

fn build_query(
    base: &DataTable,
    joined: &HashMap<TableId, DataTable>,
    insight: &Insight,
    options: &CompileOptions,
) -> Option<Query> {
    if insight.base_table_id != base.id {
        return None;
    }

    // Joins first: a missing join target fails compilation outright, before
    // any select resolution. Emission order is declaration order.
    let mut query = Query::new().from(TableRef::new(&base.source_table));
    let qualify = !insight.joins.is_empty();

    for join in &insight.joins {
        let right = joined.get(&join.right_table_id)?;
        let on = table_col(&base.source_table, &join.left_key)
            .eq(table_col(&right.source_table, &join.right_key));
        query = query.join(
            join.kind.sql_join_type(),
            TableRef::new(&right.source_table),
            on,
        );
    }

    match options.mode {
        CompileMode::Model => {
            query = query.select(vec![star()]);
            if let Some(limit) = insight.limit {
                query = query.limit(limit);
            }
            Some(query)
        }
        CompileMode::Query => build_query_mode(base, joined, insight, query, qualify),
    }
}

fn build_query_mode(
    base: &DataTable,
    joined: &HashMap<TableId, DataTable>,
    insight: &Insight,
    mut query: Query,
    qualify: bool,
) -> Option<Query> {
    let mut select: Vec<SelectExpr> = Vec::new();
    let mut group_exprs: Vec<Expr> = Vec::new();

    for field_id in &insight.selected_fields {
        let (field, table) = resolve_field(base, joined, insight, field_id)?;
        let expr = field_expr(field, table, qualify);
        group_exprs.push(expr.clone());
        select.push(SelectExpr {
            expr,
            alias: Some(field_alias(field_id)),
        });
    }

    for metric in &insight.metrics {
        let table = metric_table(base, joined, &metric.source_table)?;
        let qualifier = qualify.then_some(table.source_table.as_str());
        let expr = metric.expr(qualifier)?;
        select.push(SelectExpr {
            expr,
            alias: Some(metric_alias(&metric.id)),
        });
    }

    if select.is_empty() {
        // Nothing selected yet still previews as SELECT *
        query = query.select(vec![star()]);
    } else {
        query.select = select;
    }

    for predicate in &insight.filters {
        if let Some(expr) = predicate.to_expr() {
            query = query.filter(expr);
        }
    }

    // Aggregation requires grouping the non-metric selections; a purely
    // field-based query stays ungrouped even when categorical fields are
    // selected.
    if insight.has_metrics() && !group_exprs.is_empty() {
        query = query.group_by(group_exprs);
    }

    if !insight.order_by.is_empty() {
        let order = insight
            .order_by
            .iter()
            .map(|spec| OrderByExpr {
                expr: col(&spec.column),
                dir: Some(spec.direction.sql_dir()),
            })
            .collect();
        query = query.order_by(order);
    }

    if let Some(limit) = insight.limit {
        query = query.limit(limit);
    }

    Some(query)
}

/// Find a selected field on the base table or any joined table.
///
/// The base table is searched first, then the joins in the order the
/// insight declares them, so resolution is deterministic.
fn resolve_field<'a>(
    base: &'a DataTable,
    joined: &'a HashMap<TableId, DataTable>,
    insight: &Insight,
    field_id: &str,
) -> Option<(&'a Field, &'a DataTable)> {
    if let Some(field) = base.field(field_id) {
        return Some((field, base));
    }
    for join in &insight.joins {
        if let Some(table) = joined.get(&join.right_table_id) {
            if let Some(field) = table.field(field_id) {
                return Some((field, table));
            }
        }
    }
    None
}

fn metric_table<'a>(
    base: &'a DataTable,
    joined: &'a HashMap<TableId, DataTable>,
    table_id: &str,
) -> Option<&'a DataTable> {
    if base.id == table_id {
        return Some(base);
    }
    joined.get(table_id)
}

fn field_expr(field: &Field, table: &DataTable, qualify: bool) -> Expr {
    if qualify {
        table_col(&table.source_table, &field.column_name)
    } else {
        col(&field.column_name)
    }
}
