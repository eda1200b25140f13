//! Chart suggestion engine.
//!
//! A state-free scoring pass: given the current insight, the column
//! analyses of its latest result, and the row count, propose the best
//! encoding per chart type or explain why none exists. The channel
//! requirements live in a declarative rule table ([`rules`]); matching is
//! one generic pass over that table, so each chart type is testable on its
//! own.
//!
//! Suggestions are ephemeral. Accepting one is the caller's job: it turns
//! the encoding tags back into `with_selected_fields` / `with_metrics`
//! calls on the insight, appending any metric named in `new_fields` first.

pub mod rules;

use std::collections::BTreeMap;

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::analyze::{ColumnAnalysis, SemanticType};
use crate::config::SuggestSettings;
use crate::encoding::{ChannelEncodings, Encoding};
use crate::insight::Insight;
use crate::schema::{Aggregation, DataTable, Field};

use rules::{default_channel_rules, describe_x_axis, ChannelRule, YAxis};

/// The chart types the engine knows how to score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Area,
    Scatter,
    Pie,
}

impl ChartType {
    pub fn tag(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Scatter => "scatter",
            ChartType::Pie => "pie",
        }
    }

    pub fn all() -> &'static [ChartType] {
        &[
            ChartType::Bar,
            ChartType::Line,
            ChartType::Area,
            ChartType::Scatter,
            ChartType::Pie,
        ]
    }
}

/// A concrete chart proposal. Not persisted; the caller materializes it
/// into the insight on acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSuggestion {
    /// Deterministic id, `<type>-<x>-<y>`.
    pub id: String,
    pub title: String,
    pub chart_type: ChartType,
    pub encoding: ChannelEncodings,
    /// Ids of metrics this suggestion needs that the insight does not yet
    /// carry. Accepting the suggestion appends them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_fields: Vec<String>,
}

/// The engine. `Default` uses stock settings.
#[derive(Debug)]
pub struct ChartSuggester {
    rules: Vec<ChannelRule>,
}

impl Default for ChartSuggester {
    fn default() -> Self {
        Self::new(SuggestSettings::default())
    }
}

impl ChartSuggester {
    pub fn new(settings: SuggestSettings) -> Self {
        Self {
            rules: default_channel_rules(&settings),
        }
    }

    /// Score every chart type. Types whose requirements cannot be met map
    /// to `None` rather than being dropped, so the caller sees the full
    /// palette.
    pub fn suggest_all(
        &self,
        insight: &Insight,
        analyses: &[ColumnAnalysis],
        row_count: usize,
        table: &DataTable,
    ) -> BTreeMap<ChartType, Option<ChartSuggestion>> {
        self.suggest_for(insight, analyses, row_count, table, ChartType::all())
    }

    /// Score only the candidate chart types; every candidate appears in
    /// the result, unmet ones as `None`.
    pub fn suggest_for(
        &self,
        insight: &Insight,
        analyses: &[ColumnAnalysis],
        row_count: usize,
        table: &DataTable,
        candidates: &[ChartType],
    ) -> BTreeMap<ChartType, Option<ChartSuggestion>> {
        self.rules
            .iter()
            .filter(|rule| candidates.contains(&rule.chart_type))
            .map(|rule| {
                (
                    rule.chart_type,
                    self.best_for_rule(rule, insight, analyses, row_count, table),
                )
            })
            .collect()
    }

    /// Explain why a chart type yields no suggestion, without scoring.
    /// `None` means the type is not structurally ruled out by the columns.
    pub fn unavailable_reason(
        &self,
        chart_type: ChartType,
        analyses: &[ColumnAnalysis],
    ) -> Option<String> {
        let rule = self.rules.iter().find(|r| r.chart_type == chart_type)?;

        let x_candidates: Vec<&ColumnAnalysis> = analyses
            .iter()
            .filter(|a| rule.x.contains(&a.semantic))
            .collect();
        if x_candidates.is_empty() {
            return Some(format!("no {} column available", describe_x_axis(rule)));
        }

        if let Some(cap) = rule.x_max_distinct {
            if x_candidates.iter().all(|a| a.distinct_count > cap) {
                return Some(format!(
                    "every {} column has more than {} distinct values",
                    describe_x_axis(rule),
                    cap
                ));
            }
        }

        if rule.y == YAxis::NumericColumn {
            let numeric = analyses
                .iter()
                .filter(|a| a.semantic == SemanticType::Numerical)
                .count();
            let x_is_numeric = rule.x.contains(&SemanticType::Numerical);
            let needed = if x_is_numeric { 2 } else { 1 };
            if numeric < needed {
                return Some("needs two numerical columns".to_string());
            }
        }

        None
    }

    fn best_for_rule(
        &self,
        rule: &ChannelRule,
        insight: &Insight,
        analyses: &[ColumnAnalysis],
        row_count: usize,
        table: &DataTable,
    ) -> Option<ChartSuggestion> {
        if row_count < rule.min_rows {
            return None;
        }

        let x_field = self.pick_x(rule, insight, analyses, table)?;
        let x_analysis = analyses
            .iter()
            .find(|a| a.column_name == x_field.column_name)?;

        match rule.y {
            YAxis::Measure => {
                let (metric_id, metric_name, synthesized) =
                    pick_measure(insight, table, &x_field.column_name, analyses)?;
                let joiner = match rule.chart_type {
                    ChartType::Line | ChartType::Area => "over",
                    _ => "by",
                };
                Some(build_suggestion(
                    rule.chart_type,
                    &x_field,
                    x_analysis.semantic,
                    Encoding::metric(&metric_id),
                    &metric_id,
                    "numerical",
                    &format!("{} {} {}", metric_name, joiner, x_field.name),
                    synthesized,
                ))
            }
            YAxis::NumericColumn => {
                let y_field = self.pick_numeric_partner(insight, analyses, table, &x_field)?;
                Some(build_suggestion(
                    rule.chart_type,
                    &x_field,
                    x_analysis.semantic,
                    Encoding::field(&y_field.id),
                    &y_field.column_name,
                    "numerical",
                    &format!("{} vs {}", y_field.name, x_field.name),
                    Vec::new(),
                ))
            }
        }
    }

    /// Pick the x column: already-selected fields first, then the table's
    /// declaration order.
    fn pick_x(
        &self,
        rule: &ChannelRule,
        insight: &Insight,
        analyses: &[ColumnAnalysis],
        table: &DataTable,
    ) -> Option<Field> {
        let candidates = ranked_fields(insight, analyses, table, |a| {
            let semantic_ok = rule.x.contains(&a.semantic);
            let cardinality_ok = rule
                .x_max_distinct
                .map(|cap| a.distinct_count <= cap)
                .unwrap_or(true);
            semantic_ok && cardinality_ok
        });
        candidates.into_iter().next()
    }

    fn pick_numeric_partner(
        &self,
        insight: &Insight,
        analyses: &[ColumnAnalysis],
        table: &DataTable,
        x_field: &Field,
    ) -> Option<Field> {
        let candidates = ranked_fields(insight, analyses, table, |a| {
            a.semantic == SemanticType::Numerical && a.column_name != x_field.column_name
        });
        candidates.into_iter().next()
    }
}

/// Fields of `table` whose analysis passes `accept`, ordered by the
/// tie-break rule: fields the insight already selects come first, then
/// schema declaration order.
fn ranked_fields(
    insight: &Insight,
    analyses: &[ColumnAnalysis],
    table: &DataTable,
    accept: impl Fn(&ColumnAnalysis) -> bool,
) -> Vec<Field> {
    let mut selected = Vec::new();
    let mut rest = Vec::new();
    for field in &table.fields {
        let Some(analysis) = analyses.iter().find(|a| a.column_name == field.column_name)
        else {
            continue;
        };
        if !accept(analysis) {
            continue;
        }
        if insight.selected_fields.contains(&field.id) {
            selected.push(field.clone());
        } else {
            rest.push(field.clone());
        }
    }
    selected.extend(rest);
    selected
}

/// Pick the y-axis measure: the insight's own metrics first, then the
/// table's metric catalog, otherwise synthesize a sum (or count) and report
/// it through `new_fields`.
fn pick_measure(
    insight: &Insight,
    table: &DataTable,
    x_column: &str,
    analyses: &[ColumnAnalysis],
) -> Option<(String, String, Vec<String>)> {
    if let Some(metric) = insight.metrics.first() {
        return Some((metric.id.clone(), metric.name.clone(), Vec::new()));
    }
    if let Some(metric) = table.metrics.first() {
        return Some((metric.id.clone(), metric.name.clone(), Vec::new()));
    }

    // No metric anywhere: synthesize one over the first numerical column
    // off the x axis, falling back to a row count.
    let numeric = table.fields.iter().find(|f| {
        f.column_name != x_column
            && analyses
                .iter()
                .any(|a| a.column_name == f.column_name && a.semantic == SemanticType::Numerical)
    });
    match numeric {
        Some(field) => {
            let id = format!("sum_{}", field.column_name);
            let name = format!("sum of {}", field.name).to_title_case();
            Some((id.clone(), name, vec![id]))
        }
        None => {
            let id = "count".to_string();
            Some((id.clone(), "Count".to_string(), vec![id]))
        }
    }
}

/// Materialize the synthesized metric named by `pick_measure` for a table,
/// so an accepting caller can append it via `with_metrics`.
pub fn synthesized_metric(
    table: &DataTable,
    metric_id: &str,
) -> Option<crate::insight::InsightMetric> {
    if metric_id == "count" {
        return Some(crate::insight::InsightMetric {
            id: metric_id.to_string(),
            name: "Count".to_string(),
            column_name: None,
            aggregation: Aggregation::Count,
            source_table: table.id.clone(),
        });
    }
    let column = metric_id.strip_prefix("sum_")?;
    let field = table.field_by_column(column)?;
    Some(crate::insight::InsightMetric {
        id: metric_id.to_string(),
        name: format!("sum of {}", field.name).to_title_case(),
        column_name: Some(field.column_name.clone()),
        aggregation: Aggregation::Sum,
        source_table: table.id.clone(),
    })
}

#[allow(clippy::too_many_arguments)]
fn build_suggestion(
    chart_type: ChartType,
    x_field: &Field,
    x_semantic: SemanticType,
    y_encoding: Encoding,
    y_key: &str,
    y_type: &str,
    raw_title: &str,
    new_fields: Vec<String>,
) -> ChartSuggestion {
    ChartSuggestion {
        id: format!("{}-{}-{}", chart_type.tag(), x_field.column_name, y_key),
        title: raw_title.to_title_case(),
        chart_type,
        encoding: ChannelEncodings {
            x: Some(Encoding::field(&x_field.id).to_tag()),
            y: Some(y_encoding.to_tag()),
            color: None,
            size: None,
            x_type: Some(x_semantic.label().to_string()),
            y_type: Some(y_type.to_string()),
        },
        new_fields,
    }
}

/// Convenience wrapper over a default-configured [`ChartSuggester`].
pub fn suggest_all(
    insight: &Insight,
    analyses: &[ColumnAnalysis],
    row_count: usize,
    table: &DataTable,
) -> BTreeMap<ChartType, Option<ChartSuggestion>> {
    ChartSuggester::default().suggest_all(insight, analyses, row_count, table)
}

/// Convenience wrapper over a default-configured [`ChartSuggester`].
pub fn unavailable_reason(
    chart_type: ChartType,
    analyses: &[ColumnAnalysis],
) -> Option<String> {
    ChartSuggester::default().unavailable_reason(chart_type, analyses)
}
