use prism::encoding::{
    resolve_channels, resolve_for_analysis, resolve_sql, ChannelEncodings, Encoding,
    EncodingContext,
};
use prism::schema::{Field, Metric};
use serde_json::json;

fn fields() -> Vec<Field> {
    vec![
        serde_json::from_value(json!({
            "id": "f_cat", "table_id": "t1", "name": "Category",
            "column_name": "category", "type": "string"
        }))
        .unwrap(),
        serde_json::from_value(json!({
            "id": "f_rev", "table_id": "t1", "name": "Revenue",
            "column_name": "revenue", "type": "number"
        }))
        .unwrap(),
    ]
}

fn metrics() -> Vec<Metric> {
    vec![
        serde_json::from_value(json!({
            "id": "m_rev", "table_id": "t1", "name": "Total Revenue",
            "column_name": "revenue", "aggregation": "sum"
        }))
        .unwrap(),
        serde_json::from_value(json!({
            "id": "m_count", "table_id": "t1", "name": "Order Count",
            "aggregation": "count"
        }))
        .unwrap(),
    ]
}

#[test]
fn test_parse_field_and_metric_tags() {
    assert_eq!(Encoding::parse("field:f_cat"), Some(Encoding::field("f_cat")));
    assert_eq!(Encoding::parse("metric:m_rev"), Some(Encoding::metric("m_rev")));
}

#[test]
fn test_parse_rejects_garbage() {
    assert_eq!(Encoding::parse(""), None);
    assert_eq!(Encoding::parse("field:"), None);
    assert_eq!(Encoding::parse("metric:"), None);
    assert_eq!(Encoding::parse("category"), None);
    assert_eq!(Encoding::parse("column:category"), None);
}

#[test]
fn test_tag_round_trip() {
    let tag = Encoding::field("f_cat").to_tag();
    assert_eq!(tag, "field:f_cat");
    assert_eq!(Encoding::parse(&tag), Some(Encoding::field("f_cat")));
}

#[test]
fn test_resolve_field_yields_column_name() {
    let fields = fields();
    let metrics = metrics();
    let ctx = EncodingContext::new(&fields, &metrics);
    assert_eq!(
        resolve_sql(Some("field:f_cat"), &ctx).as_deref(),
        Some("category")
    );
}

#[test]
fn test_resolve_metric_yields_aggregate_text() {
    let fields = fields();
    let metrics = metrics();
    let ctx = EncodingContext::new(&fields, &metrics);
    assert_eq!(
        resolve_sql(Some("metric:m_rev"), &ctx).as_deref(),
        Some("sum(revenue)")
    );
    assert_eq!(
        resolve_sql(Some("metric:m_count"), &ctx).as_deref(),
        Some("count(*)")
    );
}

#[test]
fn test_resolve_none_and_unknown_ids() {
    let fields = fields();
    let metrics = metrics();
    let ctx = EncodingContext::new(&fields, &metrics);
    assert_eq!(resolve_sql(None, &ctx), None);
    assert_eq!(resolve_sql(Some("field:nope"), &ctx), None);
    assert_eq!(resolve_sql(Some("metric:nope"), &ctx), None);
    assert_eq!(resolve_sql(Some("garbage"), &ctx), None);
}

#[test]
fn test_resolve_for_analysis_exposes_raw_column() {
    let fields = fields();
    let metrics = metrics();
    let ctx = EncodingContext::new(&fields, &metrics);

    let resolved = resolve_for_analysis(Some("metric:m_rev"), &ctx);
    assert!(resolved.valid);
    assert!(resolved.is_metric);
    // The analyzer needs the bare column, not the aggregate wrapper
    assert_eq!(resolved.column_name.as_deref(), Some("revenue"));
    assert_eq!(resolved.sql.as_deref(), Some("sum(revenue)"));

    let resolved = resolve_for_analysis(Some("metric:m_count"), &ctx);
    assert!(resolved.valid);
    assert!(resolved.column_name.is_none());
}

#[test]
fn test_resolve_for_analysis_flags_invalid_without_failing() {
    let fields = fields();
    let metrics = metrics();
    let ctx = EncodingContext::new(&fields, &metrics);

    let resolved = resolve_for_analysis(Some("field:nope"), &ctx);
    assert!(!resolved.valid);
    assert!(resolved.sql.is_none());

    let resolved = resolve_for_analysis(None, &ctx);
    assert!(!resolved.valid);
}

#[test]
fn test_resolve_channels_passes_axis_types_through() {
    let fields = fields();
    let metrics = metrics();
    let ctx = EncodingContext::new(&fields, &metrics);

    let channels = ChannelEncodings {
        x: Some("field:f_cat".to_string()),
        y: Some("metric:m_rev".to_string()),
        color: None,
        size: None,
        x_type: Some("categorical".to_string()),
        y_type: Some("numerical".to_string()),
    };

    let resolved = resolve_channels(&channels, &ctx);
    assert!(resolved.x.as_ref().unwrap().valid);
    assert!(resolved.y.as_ref().unwrap().valid);
    assert!(resolved.color.is_none());
    assert_eq!(resolved.x_type.as_deref(), Some("categorical"));
    assert_eq!(resolved.y_type.as_deref(), Some("numerical"));
}

#[test]
fn test_channel_encodings_serde_shape() {
    let channels = ChannelEncodings {
        x: Some("field:f_cat".to_string()),
        y: Some("metric:m_rev".to_string()),
        color: None,
        size: None,
        x_type: None,
        y_type: None,
    };
    let value = serde_json::to_value(&channels).unwrap();
    // Unset channels are omitted entirely
    assert_eq!(value, json!({"x": "field:f_cat", "y": "metric:m_rev"}));
}
