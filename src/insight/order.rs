//! Sort specifications.

use serde::{Deserialize, Serialize};

use crate::sql::query::SortDir;

/// Sort direction on an insight or page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql_dir(&self) -> SortDir {
        match self {
            SortDirection::Asc => SortDir::Asc,
            SortDirection::Desc => SortDir::Desc,
        }
    }
}

/// One ORDER BY entry: a result column (alias or physical name) + direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderSpec {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}
