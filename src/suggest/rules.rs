//! Declarative channel requirements per chart type.

use crate::analyze::SemanticType;
use crate::config::SuggestSettings;

use super::ChartType;

/// What the y axis of a chart must be fed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAxis {
    /// An aggregate metric. May be synthesized when the table has none.
    Measure,
    /// A raw numerical column distinct from the x column.
    NumericColumn,
}

/// Channel requirements for one chart type.
#[derive(Debug, Clone)]
pub struct ChannelRule {
    pub chart_type: ChartType,
    /// Semantic types accepted on the x axis.
    pub x: &'static [SemanticType],
    pub y: YAxis,
    /// Result sets smaller than this cannot support the chart.
    pub min_rows: usize,
    /// Cap on x-axis cardinality, when the chart has one.
    pub x_max_distinct: Option<usize>,
}

const DISCRETE_X: &[SemanticType] = &[
    SemanticType::Categorical,
    SemanticType::Boolean,
    SemanticType::Identifier,
];

const TEMPORAL_X: &[SemanticType] = &[SemanticType::Temporal];

const NUMERIC_X: &[SemanticType] = &[SemanticType::Numerical];

const PIE_X: &[SemanticType] = &[SemanticType::Categorical, SemanticType::Boolean];

/// Build the rule table. Settings feed the thresholds so the table stays
/// pure data afterwards.
pub fn default_channel_rules(settings: &SuggestSettings) -> Vec<ChannelRule> {
    vec![
        ChannelRule {
            chart_type: ChartType::Bar,
            x: DISCRETE_X,
            y: YAxis::Measure,
            min_rows: 1,
            x_max_distinct: None,
        },
        ChannelRule {
            chart_type: ChartType::Line,
            x: TEMPORAL_X,
            y: YAxis::Measure,
            min_rows: 2,
            x_max_distinct: None,
        },
        ChannelRule {
            chart_type: ChartType::Area,
            x: TEMPORAL_X,
            y: YAxis::Measure,
            min_rows: 2,
            x_max_distinct: None,
        },
        ChannelRule {
            chart_type: ChartType::Scatter,
            x: NUMERIC_X,
            y: YAxis::NumericColumn,
            min_rows: settings.scatter_min_rows,
            x_max_distinct: None,
        },
        ChannelRule {
            chart_type: ChartType::Pie,
            x: PIE_X,
            y: YAxis::Measure,
            min_rows: 1,
            x_max_distinct: Some(settings.pie_max_slices),
        },
    ]
}

/// Describe the accepted x axis types as prose, for explain messages.
pub fn describe_x_axis(rule: &ChannelRule) -> String {
    let labels: Vec<&str> = rule.x.iter().map(|t| t.label()).collect();
    labels.join(" or ")
}
