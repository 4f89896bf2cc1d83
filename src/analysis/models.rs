use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::convert::TryFrom;

/// Metadata the service returns for an uploaded CSV
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetInfo {
    pub rows: u64,
    pub columns: u64,
    pub column_names: Vec<String>,
    #[serde(default)]
    pub data_types: BTreeMap<String, String>,
    #[serde(default)]
    pub missing_values: BTreeMap<String, u64>,
    #[serde(default)]
    pub sample_data: Vec<Map<String, Value>>,
}

impl DatasetInfo {
    pub fn total_missing(&self) -> u64 {
        self.missing_values.values().sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub info: DatasetInfo,
}

#[derive(Debug, Deserialize)]
struct RawStatistics {
    #[serde(default)]
    is_numeric: bool,
    count: u64,
    mean: Option<f64>,
    median: Option<f64>,
    std: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    unique: Option<u64>,
    most_frequent: Option<Value>,
}

/// Descriptive statistics for one column
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawStatistics")]
pub enum ColumnStatistics {
    Numeric {
        mean: Option<f64>,
        median: Option<f64>,
        std: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
        count: u64,
    },
    Categorical {
        count: u64,
        unique: u64,
        most_frequent: Option<String>,
    },
}

impl TryFrom<RawStatistics> for ColumnStatistics {
    type Error = String;

    fn try_from(raw: RawStatistics) -> Result<Self, Self::Error> {
        if raw.is_numeric {
            return Ok(ColumnStatistics::Numeric {
                mean: raw.mean,
                median: raw.median,
                std: raw.std,
                min: raw.min,
                max: raw.max,
                count: raw.count,
            });
        }

        let unique = raw
            .unique
            .ok_or_else(|| "categorical statistics without 'unique'".to_string())?;
        // a falsy mode (0, "", false) counts as absent
        let most_frequent = match raw.most_frequent {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };
        Ok(ColumnStatistics::Categorical {
            count: raw.count,
            unique,
            most_frequent,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub column: String,
    pub statistics: ColumnStatistics,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeBody<'a> {
    pub filename: &'a str,
    pub column: &'a str,
}

/// Which chart to ask the service for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlotKind {
    Bar { column: String },
    Scatter { x_column: String, y_column: String },
    Heatmap,
}

impl PlotKind {
    pub fn name(&self) -> &'static str {
        match self {
            PlotKind::Bar { .. } => "bar",
            PlotKind::Scatter { .. } => "scatter",
            PlotKind::Heatmap => "heatmap",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct VisualizeBody<'a> {
    pub filename: &'a str,
    #[serde(flatten)]
    pub kind: &'a PlotKind,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VisualizeResponse {
    pub plot: String,
}

/// A decoded PNG chart
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub kind: PlotKind,
    pub png: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FilenameBody<'a> {
    pub filename: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InsightsResponse {
    pub insights: Vec<String>,
}
