//! Post-processing of the chart tool payload.
//!
//! Only `chartType` and `data` are required. Everything else the model
//! sent is carried through; pie rows are reshaped and series colors set.

use serde_json::{Map, Value};
use tracing::warn;

use crate::chart::{series_color, ChartSpec, ChartType};
use crate::{Error, Result};

const SEGMENT: &str = "segment";

/// Validate the tool input and apply pie reshaping and color assignment.
pub fn normalize_chart(input: &Value) -> Result<ChartSpec> {
    let fields = input
        .as_object()
        .ok_or_else(|| Error::ChartValidation("tool input is not an object".to_string()))?;

    if !fields.get("chartType").is_some_and(Value::is_string) {
        return Err(Error::ChartValidation("chartType is missing".to_string()));
    }
    if !fields.get("data").is_some_and(Value::is_array) {
        return Err(Error::ChartValidation("data must be an array".to_string()));
    }

    let mut spec = ChartSpec::from(fields.clone());
    normalize_spec(&mut spec);
    Ok(spec)
}

/// Apply both transformations in place. Running it twice is a no-op.
pub fn normalize_spec(spec: &mut ChartSpec) {
    let is_pie = spec.chart_type() == Some(ChartType::Pie);
    let fields = spec.fields_mut();

    ensure_config(fields);
    if is_pie {
        reshape_pie(fields);
    }
    assign_colors(fields);
}

/// `config` defaults to an empty title and description.
fn ensure_config(fields: &mut Map<String, Value>) {
    if !fields.get("config").is_some_and(Value::is_object) {
        let mut defaults = Map::new();
        defaults.insert("title".to_string(), Value::String(String::new()));
        defaults.insert("description".to_string(), Value::String(String::new()));
        fields.insert("config".to_string(), Value::Object(defaults));
    }
}

fn reshape_pie(fields: &mut Map<String, Value>) {
    let segment_key = fields
        .get("config")
        .and_then(|config| config.get("xAxisKey"))
        .and_then(Value::as_str)
        .unwrap_or(SEGMENT)
        .to_string();
    let value_key = fields
        .get("chartConfig")
        .and_then(Value::as_object)
        .and_then(|series| series.keys().next().cloned());

    if let Some(Value::Array(rows)) = fields.get_mut("data") {
        let empty = Map::new();
        for row in rows.iter_mut() {
            let source = row.as_object().unwrap_or(&empty);
            let segment = first_truthy(source, &[segment_key.as_str(), SEGMENT, "category", "name"]);
            let value = match &value_key {
                Some(key) => first_truthy(source, &[key.as_str(), "value"]),
                None => first_truthy(source, &["value"]),
            };

            let mut reshaped = Map::new();
            reshaped.insert(SEGMENT.to_string(), segment);
            reshaped.insert("value".to_string(), value);
            *row = Value::Object(reshaped);
        }
    }

    if let Some(config) = fields.get_mut("config").and_then(Value::as_object_mut) {
        config.insert("xAxisKey".to_string(), Value::String(SEGMENT.to_string()));
    }
}

fn assign_colors(fields: &mut Map<String, Value>) {
    let chart_config = fields
        .entry("chartConfig")
        .or_insert_with(|| Value::Object(Map::new()));
    if !chart_config.is_object() {
        warn!(chart_config = %chart_config, "chartConfig is not an object, dropping it");
        *chart_config = Value::Object(Map::new());
    }

    let Value::Object(series) = chart_config else {
        return;
    };
    for (index, settings) in series.values_mut().enumerate() {
        if !settings.is_object() {
            // a bare label such as "price": "Price"
            let mut wrapped = Map::new();
            if settings.is_string() {
                wrapped.insert("label".to_string(), settings.take());
            }
            *settings = Value::Object(wrapped);
        }
        if let Value::Object(settings) = settings {
            settings.insert("color".to_string(), Value::String(series_color(index)));
        }
    }
}

/// First value under `keys` that JavaScript would consider truthy, else null.
fn first_truthy(row: &Map<String, Value>, keys: &[&str]) -> Value {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find(|value| is_truthy(value))
        .cloned()
        .unwrap_or(Value::Null)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_chart_type_or_data() {
        let no_type = json!({"data": [], "chartConfig": {}});
        assert!(matches!(normalize_chart(&no_type), Err(Error::ChartValidation(_))));

        let null_type = json!({"chartType": null, "data": []});
        assert!(matches!(normalize_chart(&null_type), Err(Error::ChartValidation(_))));

        let no_data = json!({"chartType": "bar", "chartConfig": {}});
        assert!(matches!(normalize_chart(&no_data), Err(Error::ChartValidation(_))));

        let data_not_array = json!({"chartType": "bar", "data": {"a": 1}});
        assert!(matches!(normalize_chart(&data_not_array), Err(Error::ChartValidation(_))));

        assert!(matches!(normalize_chart(&json!("chart")), Err(Error::ChartValidation(_))));
    }

    #[test]
    fn test_colors_follow_declaration_order() {
        let spec = normalize_chart(&json!({
            "chartType": "multiBar",
            "config": {"title": "Volume vs cap", "description": "d", "xAxisKey": "coin"},
            "data": [{"coin": "BTC", "volume": 10, "cap": 20}],
            "chartConfig": {
                "volume": {"label": "Volume", "color": "red"},
                "cap": {"label": "Market cap", "stacked": true}
            }
        }))
        .unwrap();

        assert_eq!(
            spec.to_value()["chartConfig"],
            json!({
                "volume": {"label": "Volume", "color": "hsl(var(--chart-1))"},
                "cap": {"label": "Market cap", "stacked": true, "color": "hsl(var(--chart-2))"}
            })
        );
        // non-pie rows are untouched
        assert_eq!(spec.data()[0]["coin"], "BTC");
        assert_eq!(spec.x_axis_key(), Some("coin"));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let spec = normalize_chart(&json!({
            "chartType": "line",
            "config": {
                "title": "t",
                "description": "d",
                "xAxisKey": "date",
                "yAxisLabel": "USD",
                "trend": {"percentage": "4.2", "direction": "sideways"}
            },
            "data": [{"date": "2024-08-19", "price": 60400}, "stray", 7],
            "chartConfig": {"price": {"label": "Price", "unit": "$"}},
            "summary": "kept"
        }))
        .unwrap();

        assert_eq!(
            spec.to_value(),
            json!({
                "chartType": "line",
                "config": {
                    "title": "t",
                    "description": "d",
                    "xAxisKey": "date",
                    "yAxisLabel": "USD",
                    "trend": {"percentage": "4.2", "direction": "sideways"}
                },
                "data": [{"date": "2024-08-19", "price": 60400}, "stray", 7],
                "chartConfig": {"price": {"label": "Price", "unit": "$", "color": "hsl(var(--chart-1))"}},
                "summary": "kept"
            })
        );
    }

    #[test]
    fn test_unknown_chart_type_is_not_reshaped() {
        let spec = normalize_chart(&json!({
            "chartType": "radar",
            "data": [{"axis": "speed", "score": 3}],
            "chartConfig": {"score": {"label": "Score"}}
        }))
        .unwrap();
        assert_eq!(spec.chart_type(), None);
        assert_eq!(spec.chart_type_name(), Some("radar"));
        assert_eq!(spec.data()[0], json!({"axis": "speed", "score": 3}));
        assert_eq!(spec.config(), json!({"title": "", "description": ""}).as_object());
    }

    #[test]
    fn test_pie_rows_reshaped() {
        let spec = normalize_chart(&json!({
            "chartType": "pie",
            "config": {"title": "Dominance", "description": "d", "xAxisKey": "coin"},
            "data": [
                {"coin": "Bitcoin", "share": 54.1},
                {"category": "Ethereum", "share": 0, "value": 17.3},
                {"name": "Other", "extra": true},
                "not a row"
            ],
            "chartConfig": {"share": {"label": "Share (%)"}}
        }))
        .unwrap();

        assert_eq!(spec.x_axis_key(), Some("segment"));
        assert_eq!(
            spec.data(),
            &[
                json!({"segment": "Bitcoin", "value": 54.1}),
                json!({"segment": "Ethereum", "value": 17.3}),
                json!({"segment": "Other", "value": null}),
                json!({"segment": null, "value": null}),
            ]
        );
    }

    #[test]
    fn test_pie_without_config_or_chart_config() {
        let spec = normalize_chart(&json!({
            "chartType": "pie",
            "data": [{"segment": "A", "value": 1}]
        }))
        .unwrap();
        assert_eq!(spec.data()[0]["segment"], "A");
        assert_eq!(spec.data()[0]["value"], 1);
        assert_eq!(spec.x_axis_key(), Some("segment"));
        assert_eq!(spec.config().unwrap()["title"], "");
        assert!(spec.chart_config().unwrap().is_empty());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut spec = normalize_chart(&json!({
            "chartType": "pie",
            "config": {"title": "t", "description": "d", "xAxisKey": "asset"},
            "data": [{"asset": "Equities", "equities": 5500000}],
            "chartConfig": {"equities": {"label": "Equities"}, "bonds": "Bonds"}
        }))
        .unwrap();
        let once = spec.clone();

        normalize_spec(&mut spec);
        assert_eq!(spec, once);
    }

    #[test]
    fn test_loose_series_settings_are_wrapped() {
        let spec = normalize_chart(&json!({
            "chartType": "line",
            "data": [],
            "chartConfig": {"price": "Price", "volume": 3}
        }))
        .unwrap();
        assert_eq!(
            spec.to_value()["chartConfig"],
            json!({
                "price": {"label": "Price", "color": "hsl(var(--chart-1))"},
                "volume": {"color": "hsl(var(--chart-2))"}
            })
        );

        let spec = normalize_chart(&json!({"chartType": "bar", "data": [], "chartConfig": ["x"]})).unwrap();
        assert!(spec.chart_config().unwrap().is_empty());
    }
}
