//! Renderer-ready chart specification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chart kinds the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Bar,
    MultiBar,
    Line,
    Pie,
    Area,
    StackedArea,
}

impl ChartType {
    /// Parse the wire name used in `chartType`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bar" => Some(ChartType::Bar),
            "multiBar" => Some(ChartType::MultiBar),
            "line" => Some(ChartType::Line),
            "pie" => Some(ChartType::Pie),
            "area" => Some(ChartType::Area),
            "stackedArea" => Some(ChartType::StackedArea),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::MultiBar => "multiBar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Area => "area",
            ChartType::StackedArea => "stackedArea",
        }
    }
}

/// `{ chartType, config, data, chartConfig }` plus anything else the model sent.
///
/// Kept as the tool payload's own object so fields the renderer may use
/// (extra `config` keys, a `summary`, loosely typed `trend`) pass through
/// untouched. `chartConfig` keeps declaration order, which drives color
/// assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSpec(Map<String, Value>);

impl ChartSpec {
    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Known chart kind; `None` for names the renderer has no preset for.
    pub fn chart_type(&self) -> Option<ChartType> {
        self.chart_type_name().and_then(ChartType::from_name)
    }

    pub fn chart_type_name(&self) -> Option<&str> {
        self.0.get("chartType").and_then(Value::as_str)
    }

    pub fn config(&self) -> Option<&Map<String, Value>> {
        self.0.get("config").and_then(Value::as_object)
    }

    pub fn x_axis_key(&self) -> Option<&str> {
        self.config()
            .and_then(|config| config.get("xAxisKey"))
            .and_then(Value::as_str)
    }

    pub fn data(&self) -> &[Value] {
        self.0
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn chart_config(&self) -> Option<&Map<String, Value>> {
        self.0.get("chartConfig").and_then(Value::as_object)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for ChartSpec {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Color reference for the series at `index` (zero-based).
pub fn series_color(index: usize) -> String {
    format!("hsl(var(--chart-{}))", index + 1)
}
