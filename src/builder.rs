//! Ad hoc query builder over a loaded table.
//!
//! Lower-level companion to the insight compiler: programmatic callers
//! chain operations against a table reference and an execution engine
//! without constructing an [`crate::insight::Insight`]. The builder only
//! accumulates an operation plan; no I/O happens until [`QueryBuilder::execute`].
//!
//! Accumulation rules, observable through the emitted SQL:
//! - `filter` accumulates; all predicates are ANDed
//! - `join` and `group_by` accumulate in call order
//! - `select`, `sort`, `limit`, `offset` override; last call wins

use std::sync::Arc;

use crate::engine::{ExecutionEngine, ResultSet};
use crate::insight::{FilterPredicate, JoinKind, OrderSpec};
use crate::schema::Aggregation;
use crate::sql::expr::{col, table_col, ExprExt};
use crate::sql::query::{OrderByExpr, Query, SelectExpr, TableRef};
use crate::sql::Dialect;

/// Join target and keys for [`QueryBuilder::join`].
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub left_key: String,
    pub right_key: String,
}

impl JoinSpec {
    pub fn inner(left_key: &str, right_key: &str) -> Self {
        Self {
            kind: JoinKind::Inner,
            left_key: left_key.into(),
            right_key: right_key.into(),
        }
    }

    pub fn left(left_key: &str, right_key: &str) -> Self {
        Self {
            kind: JoinKind::Left,
            left_key: left_key.into(),
            right_key: right_key.into(),
        }
    }
}

/// One accumulated operation.
#[derive(Debug, Clone, PartialEq)]
enum PlanOp {
    Select(Vec<String>),
    Filter(Vec<FilterPredicate>),
    Sort(Vec<OrderSpec>),
    GroupBy {
        columns: Vec<String>,
        aggregations: Vec<(String, Aggregation)>,
    },
    Join {
        table: String,
        spec: JoinSpec,
    },
    Limit(u64),
    Offset(u64),
}

/// A chainable, operation-accumulating query builder.
#[derive(Clone)]
pub struct QueryBuilder {
    table: String,
    engine: Arc<dyn ExecutionEngine>,
    ops: Vec<PlanOp>,
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("table", &self.table)
            .field("ops", &self.ops)
            .finish()
    }
}

impl QueryBuilder {
    /// Start a builder over a loaded table.
    pub fn new(table: &str, engine: Arc<dyn ExecutionEngine>) -> Self {
        Self {
            table: table.into(),
            engine,
            ops: Vec::new(),
        }
    }

    fn push(mut self, op: PlanOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Set the projected columns. Last call wins.
    pub fn select(self, columns: Vec<&str>) -> Self {
        self.push(PlanOp::Select(
            columns.into_iter().map(String::from).collect(),
        ))
    }

    /// Add filter predicates. Repeated calls accumulate; everything is ANDed.
    pub fn filter(self, predicates: Vec<FilterPredicate>) -> Self {
        self.push(PlanOp::Filter(predicates))
    }

    /// Set the sort order. Last call wins.
    pub fn sort(self, specs: Vec<OrderSpec>) -> Self {
        self.push(PlanOp::Sort(specs))
    }

    /// Alias for [`QueryBuilder::sort`].
    pub fn order_by(self, specs: Vec<OrderSpec>) -> Self {
        self.sort(specs)
    }

    /// Add a grouping pass. Repeated calls accumulate in call order.
    pub fn group_by(self, columns: Vec<&str>, aggregations: Vec<(&str, Aggregation)>) -> Self {
        self.push(PlanOp::GroupBy {
            columns: columns.into_iter().map(String::from).collect(),
            aggregations: aggregations
                .into_iter()
                .map(|(c, a)| (c.to_string(), a))
                .collect(),
        })
    }

    /// Join another loaded table. Repeated calls accumulate in call order.
    pub fn join(self, table: &str, spec: JoinSpec) -> Self {
        self.push(PlanOp::Join {
            table: table.into(),
            spec,
        })
    }

    /// Cap the result rows. Last call wins.
    pub fn limit(self, n: u64) -> Self {
        self.push(PlanOp::Limit(n))
    }

    /// Skip leading rows. Last call wins.
    pub fn offset(self, n: u64) -> Self {
        self.push(PlanOp::Offset(n))
    }

    /// Render the accumulated plan as SQL (default dialect).
    pub fn to_sql(&self) -> String {
        self.to_sql_for_dialect(Dialect::default())
    }

    /// Render the accumulated plan as SQL for a dialect.
    pub fn to_sql_for_dialect(&self, dialect: Dialect) -> String {
        self.assemble().to_sql(dialect)
    }

    /// Submit the plan to the execution engine.
    ///
    /// Engine failures degrade to an empty result set with an error
    /// message; this never panics on a bad plan.
    pub async fn execute(&self) -> ResultSet {
        crate::engine::run_insight(self.engine.as_ref(), &self.to_sql()).await
    }

    /// Fold the operation list into a `Query` value.
    fn assemble(&self) -> Query {
        let mut query = Query::new().from(TableRef::new(&self.table));

        let mut selected: Option<&[String]> = None;
        let mut sort: Option<&[OrderSpec]> = None;
        let mut limit: Option<u64> = None;
        let mut offset: Option<u64> = None;
        let mut group_columns: Vec<&str> = Vec::new();
        let mut aggregations: Vec<(&str, Aggregation)> = Vec::new();

        for op in &self.ops {
            match op {
                PlanOp::Select(cols) => selected = Some(cols),
                PlanOp::Sort(specs) => sort = Some(specs),
                PlanOp::Limit(n) => limit = Some(*n),
                PlanOp::Offset(n) => offset = Some(*n),
                PlanOp::Filter(predicates) => {
                    for predicate in predicates {
                        if let Some(expr) = predicate.to_expr() {
                            query = query.filter(expr);
                        }
                    }
                }
                PlanOp::GroupBy {
                    columns,
                    aggregations: aggs,
                } => {
                    group_columns.extend(columns.iter().map(String::as_str));
                    aggregations.extend(aggs.iter().map(|(c, a)| (c.as_str(), *a)));
                }
                PlanOp::Join { table, spec } => {
                    let on = table_col(&self.table, &spec.left_key)
                        .eq(table_col(table, &spec.right_key));
                    query = query.join(spec.kind.sql_join_type(), TableRef::new(table), on);
                }
            }
        }

        let mut select: Vec<SelectExpr> = Vec::new();
        if !group_columns.is_empty() || !aggregations.is_empty() {
            // Grouping plans project group columns + aggregates; an explicit
            // select() is ignored because the engine would reject ungrouped
            // columns anyway.
            for column in &group_columns {
                select.push(SelectExpr::new(col(column)));
            }
            for (column, aggregation) in &aggregations {
                select.push(
                    aggregate_expr(column, *aggregation)
                        .alias(&format!("{}_{column}", aggregation.function_name())),
                );
            }
            query = query.group_by(group_columns.iter().map(|c| col(c)).collect());
        } else if let Some(columns) = selected {
            for column in columns {
                select.push(SelectExpr::new(col(column)));
            }
        }

        if select.is_empty() {
            query = query.select_star();
        } else {
            query.select = select;
        }
        if let Some(specs) = sort {
            query = query.order_by(
                specs
                    .iter()
                    .map(|s| OrderByExpr {
                        expr: col(&s.column),
                        dir: Some(s.direction.sql_dir()),
                    })
                    .collect(),
            );
        }
        if let Some(n) = limit {
            query = query.limit(n);
        }
        if let Some(n) = offset {
            query = query.offset(n);
        }

        query
    }
}

fn aggregate_expr(column: &str, aggregation: Aggregation) -> crate::sql::expr::Expr {
    use crate::sql::expr;
    match aggregation {
        Aggregation::Sum => expr::sum(col(column)),
        Aggregation::Avg => expr::avg(col(column)),
        Aggregation::Count => expr::count(col(column)),
        Aggregation::Min => expr::min(col(column)),
        Aggregation::Max => expr::max(col(column)),
        Aggregation::CountDistinct => expr::count_distinct(col(column)),
    }
}
