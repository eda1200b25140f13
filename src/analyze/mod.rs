//! Column analysis over query results.
//!
//! Classifies each result column into a semantic type by combining three
//! signal sources, strongest first:
//!
//! 1. Value shape probes on sampled string values (UUID, email, URL, date)
//! 2. Naming convention rules (`_id`, `_at`, `is_` and friends)
//! 3. Cardinality statistics (distinct and null counts over the sample)
//!
//! Analysis is a pure function of the sample plus the declared column type.
//! It holds no state between result sets and never consults the engine.

pub mod patterns;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AnalyzeSettings;
use crate::engine::ResultSet;
use crate::schema::{DataTable, FieldType};

use patterns::{default_naming_rules, name_hint, value_shape, NamingRule};

/// The semantic reading of a column, as opposed to its storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// Continuous numeric measure.
    Numerical,
    /// Date or timestamp.
    Temporal,
    /// True/false flag.
    Boolean,
    /// Low-cardinality dimension.
    Categorical,
    /// Row key, unique or nearly so.
    Identifier,
    /// Foreign key into another table.
    Reference,
    Uuid,
    Url,
    Email,
    /// High-cardinality free text.
    Text,
    Unknown,
}

impl SemanticType {
    /// Whether this type can serve as a quantitative chart axis.
    pub fn is_measure(&self) -> bool {
        matches!(self, SemanticType::Numerical)
    }

    /// Whether this type can serve as a discrete grouping axis.
    pub fn is_dimension(&self) -> bool {
        matches!(
            self,
            SemanticType::Categorical | SemanticType::Boolean | SemanticType::Temporal
        )
    }

    /// The serialized (lowercase) name, for chart channel metadata.
    pub fn label(&self) -> &'static str {
        match self {
            SemanticType::Numerical => "numerical",
            SemanticType::Temporal => "temporal",
            SemanticType::Boolean => "boolean",
            SemanticType::Categorical => "categorical",
            SemanticType::Identifier => "identifier",
            SemanticType::Reference => "reference",
            SemanticType::Uuid => "uuid",
            SemanticType::Url => "url",
            SemanticType::Email => "email",
            SemanticType::Text => "text",
            SemanticType::Unknown => "unknown",
        }
    }
}

/// Per-column analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnalysis {
    pub column_name: String,
    pub semantic: SemanticType,
    pub distinct_count: usize,
    pub null_count: usize,
    pub sample_size: usize,
    /// distinct / non-null, in [0, 1]. Zero for an all-null sample.
    pub unique_ratio: f64,
}

impl ColumnAnalysis {
    pub fn is_measure(&self) -> bool {
        self.semantic.is_measure()
    }

    pub fn is_dimension(&self) -> bool {
        self.semantic.is_dimension()
    }
}

/// Classifier with tunable thresholds. `Default` uses the stock settings
/// and rule table.
#[derive(Debug)]
pub struct ColumnAnalyzer {
    settings: AnalyzeSettings,
    rules: Vec<NamingRule>,
}

impl Default for ColumnAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzeSettings::default())
    }
}

impl ColumnAnalyzer {
    pub fn new(settings: AnalyzeSettings) -> Self {
        Self {
            settings,
            rules: default_naming_rules(),
        }
    }

    /// Analyze every column of a result set. Declared field types are taken
    /// from the table schema when a column name matches.
    pub fn analyze_result(
        &self,
        result: &ResultSet,
        table: Option<&DataTable>,
    ) -> Vec<ColumnAnalysis> {
        result
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let declared = table
                    .and_then(|t| t.field_by_column(&col.name))
                    .map(|f| f.field_type)
                    .or_else(|| declared_from_type_name(&col.type_name));
                let sample: Vec<&Value> = result
                    .rows
                    .iter()
                    .take(self.settings.sample_size)
                    .filter_map(|row| row.get(idx))
                    .collect();
                self.analyze_column(&col.name, declared, &sample)
            })
            .collect()
    }

    /// Classify a single column from its name, declared type, and sampled
    /// values.
    pub fn analyze_column(
        &self,
        column_name: &str,
        declared: Option<FieldType>,
        sample: &[&Value],
    ) -> ColumnAnalysis {
        let sample_size = sample.len();
        let null_count = sample.iter().filter(|v| v.is_null()).count();
        let non_null: Vec<&Value> = sample
            .iter()
            .filter(|v| !v.is_null())
            .copied()
            .collect();

        let mut distinct = HashSet::new();
        for value in &non_null {
            distinct.insert(value.to_string());
        }
        let distinct_count = distinct.len();
        let unique_ratio = if non_null.is_empty() {
            0.0
        } else {
            distinct_count as f64 / non_null.len() as f64
        };

        let semantic = self.classify(
            column_name,
            declared,
            &non_null,
            distinct_count,
            unique_ratio,
        );

        ColumnAnalysis {
            column_name: column_name.to_string(),
            semantic,
            distinct_count,
            null_count,
            sample_size,
            unique_ratio,
        }
    }

    fn classify(
        &self,
        column_name: &str,
        declared: Option<FieldType>,
        non_null: &[&Value],
        distinct_count: usize,
        unique_ratio: f64,
    ) -> SemanticType {
        let hint = name_hint(&self.rules, column_name);
        let primitive = declared.or_else(|| primitive_from_values(non_null));

        // Value shapes are the strongest evidence for string columns.
        if matches!(primitive, Some(FieldType::String)) {
            let strings: Vec<&str> = non_null.iter().filter_map(|v| v.as_str()).collect();
            if let Some(shape) = value_shape(&strings) {
                return shape;
            }
        }

        match primitive {
            Some(FieldType::Boolean) => SemanticType::Boolean,
            Some(FieldType::Date) => SemanticType::Temporal,
            Some(FieldType::Number) => match hint {
                Some(SemanticType::Identifier) => SemanticType::Identifier,
                Some(SemanticType::Reference) => SemanticType::Reference,
                Some(SemanticType::Boolean) => SemanticType::Boolean,
                _ => {
                    if distinct_count > 0
                        && distinct_count <= self.settings.categorical_max_distinct
                    {
                        SemanticType::Categorical
                    } else {
                        SemanticType::Numerical
                    }
                }
            },
            Some(FieldType::String) => {
                if let Some(hinted) = hint {
                    return hinted;
                }
                if non_null.is_empty() {
                    return SemanticType::Unknown;
                }
                if distinct_count <= self.settings.categorical_max_distinct {
                    return SemanticType::Categorical;
                }
                if unique_ratio >= self.settings.identifier_unique_ratio
                    && mean_len(non_null) <= self.settings.identifier_max_token_len
                {
                    return SemanticType::Identifier;
                }
                SemanticType::Text
            }
            None => hint.unwrap_or(SemanticType::Unknown),
        }
    }
}

/// Infer a primitive type from sampled values when the schema is silent.
fn primitive_from_values(non_null: &[&Value]) -> Option<FieldType> {
    if non_null.is_empty() {
        return None;
    }
    if non_null.iter().all(|v| v.is_boolean()) {
        return Some(FieldType::Boolean);
    }
    if non_null.iter().all(|v| v.is_number()) {
        return Some(FieldType::Number);
    }
    if non_null.iter().all(|v| v.is_string()) {
        return Some(FieldType::String);
    }
    None
}

/// Map an engine column type name to a schema primitive.
fn declared_from_type_name(type_name: &str) -> Option<FieldType> {
    let upper = type_name.to_uppercase();
    if upper.contains("BOOL") {
        Some(FieldType::Boolean)
    } else if upper.contains("DATE") || upper.contains("TIME") {
        Some(FieldType::Date)
    } else if upper.contains("INT")
        || upper.contains("DOUBLE")
        || upper.contains("FLOAT")
        || upper.contains("DECIMAL")
        || upper.contains("NUMERIC")
        || upper.contains("REAL")
    {
        Some(FieldType::Number)
    } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("STRING") {
        Some(FieldType::String)
    } else {
        None
    }
}

fn mean_len(values: &[&Value]) -> usize {
    let total: usize = values
        .iter()
        .map(|v| v.as_str().map(str::len).unwrap_or(0))
        .sum();
    if values.is_empty() {
        0
    } else {
        total / values.len()
    }
}
