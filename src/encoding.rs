//! Encoding references: fields or metrics bound to visual/query channels.
//!
//! Raw encoding values come from user-editable UI state as tagged strings
//! (`"field:<id>"` / `"metric:<id>"`). They are parsed into a proper sum
//! type at the boundary; everything downstream works with [`Encoding`] and
//! malformed input simply fails to parse instead of being re-checked at
//! every resolution site.

use serde::{Deserialize, Serialize};

use crate::schema::{Field, FieldId, Metric, MetricId};

/// Tag prefix for field references.
const FIELD_TAG: &str = "field:";
/// Tag prefix for metric references.
const METRIC_TAG: &str = "metric:";

/// A reference to either a field or a metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Encoding {
    Field(FieldId),
    Metric(MetricId),
}

impl Encoding {
    /// Parse a tagged encoding string. Anything that does not match the
    /// `field:<id>` / `metric:<id>` shape (including empty ids) is `None`.
    pub fn parse(raw: &str) -> Option<Encoding> {
        if let Some(id) = raw.strip_prefix(FIELD_TAG) {
            if !id.is_empty() {
                return Some(Encoding::Field(id.to_string()));
            }
        }
        if let Some(id) = raw.strip_prefix(METRIC_TAG) {
            if !id.is_empty() {
                return Some(Encoding::Metric(id.to_string()));
            }
        }
        None
    }

    /// Render back to the tagged string form.
    pub fn to_tag(&self) -> String {
        match self {
            Encoding::Field(id) => format!("{FIELD_TAG}{id}"),
            Encoding::Metric(id) => format!("{METRIC_TAG}{id}"),
        }
    }

    pub fn field(id: &str) -> Self {
        Encoding::Field(id.into())
    }

    pub fn metric(id: &str) -> Self {
        Encoding::Metric(id.into())
    }
}

/// Schema snapshot an encoding resolves against.
#[derive(Debug, Clone, Copy)]
pub struct EncodingContext<'a> {
    pub fields: &'a [Field],
    pub metrics: &'a [Metric],
}

impl<'a> EncodingContext<'a> {
    pub fn new(fields: &'a [Field], metrics: &'a [Metric]) -> Self {
        Self { fields, metrics }
    }

    fn field(&self, id: &str) -> Option<&'a Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn metric(&self, id: &str) -> Option<&'a Metric> {
        self.metrics.iter().find(|m| m.id == id)
    }
}

/// Resolution result for analysis consumers (the chart engine), which need
/// the underlying raw column independent of any aggregate wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEncoding {
    /// Underlying physical column; `None` for a bare `count(*)` metric.
    pub column_name: Option<String>,
    pub is_metric: bool,
    /// Compiled SQL expression text, when the reference resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    pub valid: bool,
}

impl ResolvedEncoding {
    fn invalid() -> Self {
        Self {
            column_name: None,
            is_metric: false,
            sql: None,
            valid: false,
        }
    }
}

/// Resolve a raw encoding string to a SQL expression.
///
/// `None` in, `None` out; garbage in, `None` out. A valid field reference
/// yields the bare column name, a valid metric reference its aggregate text.
pub fn resolve_sql(raw: Option<&str>, ctx: &EncodingContext<'_>) -> Option<String> {
    encoding_sql(&Encoding::parse(raw?)?, ctx)
}

/// Resolve a parsed encoding to its SQL expression text.
pub fn encoding_sql(encoding: &Encoding, ctx: &EncodingContext<'_>) -> Option<String> {
    match encoding {
        Encoding::Field(id) => ctx.field(id).map(|f| f.column_name.clone()),
        Encoding::Metric(id) => ctx.metric(id).and_then(|m| m.sql_text()),
    }
}

/// Resolve a raw encoding string for analysis.
///
/// Never fails hard: unknown and malformed references come back with
/// `valid: false` because encoding values are user-editable UI state.
pub fn resolve_for_analysis(raw: Option<&str>, ctx: &EncodingContext<'_>) -> ResolvedEncoding {
    let Some(encoding) = raw.and_then(Encoding::parse) else {
        return ResolvedEncoding::invalid();
    };

    match &encoding {
        Encoding::Field(id) => match ctx.field(id) {
            Some(field) => ResolvedEncoding {
                column_name: Some(field.column_name.clone()),
                is_metric: false,
                sql: Some(field.column_name.clone()),
                valid: true,
            },
            None => ResolvedEncoding::invalid(),
        },
        Encoding::Metric(id) => match ctx.metric(id) {
            Some(metric) => ResolvedEncoding {
                column_name: metric.column_name.clone(),
                is_metric: true,
                sql: metric.sql_text(),
                valid: metric.sql_text().is_some(),
            },
            None => ResolvedEncoding::invalid(),
        },
    }
}

/// Channel assignments of a visualization encoding.
///
/// `x_type` / `y_type` are axis-type hints owned by the presentation layer;
/// resolution passes them through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelEncodings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_type: Option<String>,
}

/// All channels of an encoding resolved at once.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChannels {
    pub x: Option<ResolvedEncoding>,
    pub y: Option<ResolvedEncoding>,
    pub color: Option<ResolvedEncoding>,
    pub size: Option<ResolvedEncoding>,
    pub x_type: Option<String>,
    pub y_type: Option<String>,
}

/// Resolve every channel of an encoding object in one pass.
pub fn resolve_channels(
    channels: &ChannelEncodings,
    ctx: &EncodingContext<'_>,
) -> ResolvedChannels {
    let resolve = |raw: &Option<String>| {
        raw.as_ref()
            .map(|r| resolve_for_analysis(Some(r.as_str()), ctx))
    };
    ResolvedChannels {
        x: resolve(&channels.x),
        y: resolve(&channels.y),
        color: resolve(&channels.color),
        size: resolve(&channels.size),
        x_type: channels.x_type.clone(),
        y_type: channels.y_type.clone(),
    }
}
