//! Filter predicates over result columns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sql::expr::{col, lit_bool, lit_float, lit_int, lit_null, lit_str, Expr, ExprExt};

/// Comparison operator for a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

/// A single filter condition. Predicates on an insight are ANDed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub column_name: String,
    pub operator: FilterOp,
    /// Comparison value for scalar operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Value list for `In` / `NotIn`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl FilterPredicate {
    pub fn new(column_name: &str, operator: FilterOp, value: Value) -> Self {
        Self {
            column_name: column_name.into(),
            operator,
            value: Some(value),
            values: None,
        }
    }

    /// Build a predicate with a value list (for `In` / `NotIn`).
    pub fn with_values(column_name: &str, operator: FilterOp, values: Vec<Value>) -> Self {
        Self {
            column_name: column_name.into(),
            operator,
            value: None,
            values: Some(values),
        }
    }

    /// Null-check predicate (no comparison value).
    pub fn null_check(column_name: &str, negated: bool) -> Self {
        Self {
            column_name: column_name.into(),
            operator: if negated {
                FilterOp::IsNotNull
            } else {
                FilterOp::IsNull
            },
            value: None,
            values: None,
        }
    }

    /// Convert this predicate to a SQL expression.
    ///
    /// Returns `None` when the predicate is incomplete (e.g. a scalar
    /// operator with no value); incomplete predicates come from in-progress
    /// UI edits and are skipped, not reported.
    pub fn to_expr(&self) -> Option<Expr> {
        let column = col(&self.column_name);

        match self.operator {
            FilterOp::IsNull => return Some(column.is_null()),
            FilterOp::IsNotNull => return Some(column.is_not_null()),
            FilterOp::In => {
                let values = self.values.as_ref()?;
                if values.is_empty() {
                    return None;
                }
                return Some(column.in_list(values.iter().map(value_to_expr).collect()));
            }
            FilterOp::NotIn => {
                let values = self.values.as_ref()?;
                if values.is_empty() {
                    return None;
                }
                return Some(column.not_in_list(values.iter().map(value_to_expr).collect()));
            }
            _ => {}
        }

        let value = self.value.as_ref()?;
        Some(match self.operator {
            FilterOp::Eq => column.eq(value_to_expr(value)),
            FilterOp::Ne => column.ne(value_to_expr(value)),
            FilterOp::Gt => column.gt(value_to_expr(value)),
            FilterOp::Gte => column.gte(value_to_expr(value)),
            FilterOp::Lt => column.lt(value_to_expr(value)),
            FilterOp::Lte => column.lte(value_to_expr(value)),
            FilterOp::Contains => {
                let text = value.as_str().map(String::from).unwrap_or_else(|| value.to_string());
                column.like(lit_str(&format!("%{text}%")))
            }
            // Handled above
            FilterOp::In | FilterOp::NotIn | FilterOp::IsNull | FilterOp::IsNotNull => {
                unreachable!()
            }
        })
    }
}

/// Map a JSON value from UI state to a SQL literal.
fn value_to_expr(value: &Value) -> Expr {
    match value {
        Value::Null => lit_null(),
        Value::Bool(b) => lit_bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                lit_int(i)
            } else {
                lit_float(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => lit_str(s),
        // Arrays and objects have no literal form; compare textually
        other => lit_str(&other.to_string()),
    }
}
