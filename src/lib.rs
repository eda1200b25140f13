//! # Prism
//!
//! The query core of a self-serve analytics tool: declarative insight
//! configurations compiled to SQL for a columnar engine, plus the
//! heuristics that turn query results into chart suggestions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Insight (declarative configuration)           │
//! │   (base table, joins, fields, metrics, filters, order)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    SQL text                              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [engine - external executor]
//! ┌─────────────────────────────────────────────────────────┐
//! │             ResultSet (rows + column metadata)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [analyze]
//! ┌─────────────────────────────────────────────────────────┐
//! │          ColumnAnalysis (semantic classification)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [suggest]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ChartSuggestion (encoding + title per type)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Accepting a suggestion loops back to the top: the caller appends the
//! suggested fields and metrics through the insight's `with_*` methods.

pub mod analyze;
pub mod builder;
pub mod cache;
pub mod compile;
pub mod config;
pub mod encoding;
pub mod engine;
pub mod insight;
pub mod schema;
pub mod sql;
pub mod suggest;

// Re-export SQL submodules at crate level for convenience
pub use sql::dialect;
pub use sql::expr;
pub use sql::query;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::analyze::{ColumnAnalysis, ColumnAnalyzer, SemanticType};
    pub use crate::builder::{JoinSpec, QueryBuilder};
    pub use crate::compile::{
        compile_count, compile_insight, compile_page, CompileMode, CompileOptions, PageRequest,
    };
    pub use crate::config::Settings;
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::encoding::{resolve_channels, resolve_sql, ChannelEncodings, Encoding};
    pub use crate::engine::{EngineError, ExecutionEngine, ResultSet};
    pub use crate::insight::{
        FilterOp, FilterPredicate, Insight, InsightMetric, InsightPatch, JoinConfig, JoinKind,
        OrderSpec, SortDirection,
    };
    pub use crate::schema::{Aggregation, DataTable, Field, FieldType, Metric};
    pub use crate::suggest::{
        suggest_all, unavailable_reason, ChartSuggester, ChartSuggestion, ChartType,
    };
}
