//! Join configuration between the base table and other tables.

use serde::{Deserialize, Serialize};

use crate::schema::TableId;
use crate::sql::query::JoinType;

/// Kind of join declared on an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    /// Map to the SQL join type.
    pub fn sql_join_type(&self) -> JoinType {
        match self {
            JoinKind::Inner => JoinType::Inner,
            JoinKind::Left => JoinType::Left,
            JoinKind::Right => JoinType::Right,
            JoinKind::Full => JoinType::Full,
        }
    }
}

/// A declared join: base-table key matched against a key on another table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinConfig {
    #[serde(rename = "type")]
    pub kind: JoinKind,
    pub right_table_id: TableId,
    /// Join key column on the base (left) table.
    pub left_key: String,
    /// Join key column on the joined (right) table.
    pub right_key: String,
}

impl JoinConfig {
    pub fn new(kind: JoinKind, right_table_id: &str, left_key: &str, right_key: &str) -> Self {
        Self {
            kind,
            right_table_id: right_table_id.into(),
            left_key: left_key.into(),
            right_key: right_key.into(),
        }
    }
}
