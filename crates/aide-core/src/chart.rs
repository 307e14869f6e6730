//! Chart dataset model and the numeric summaries sent along with insights
//! requests.
//!
//! A [`ChartControl`] is what a host registers for a chart element whose data
//! it knows: the visualization type, title, the dataset's declared fields and
//! where its rows come from (a binding or a JSON model + path). The free
//! functions here turn rows into the text sample and per-field statistics.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use winnow::ascii::{digit0, digit1, float};
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::one_of;

/// Maximum number of rows sampled from any data source.
pub const MAX_SAMPLE_ROWS: usize = 20;

pub const NO_DATA: &str = "(no data)";
pub const NO_DATA_FOR_STATS: &str = "(no data for statistics)";
pub const NO_NUMERIC_FIELDS: &str = "(no numeric fields)";

// ─── Bound control ───────────────────────────────────────────────────────

/// A data-visualization control bound to a chart element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartControl {
    /// Visualization type, e.g. `line`, `pie`.
    pub viz_type: Option<String>,
    pub title: Option<String>,
    pub dataset: Option<Dataset>,
    #[serde(default)]
    pub feeds: Vec<Feed>,
}

/// Declared fields plus the source of the rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub dimensions: Vec<Field>,
    #[serde(default)]
    pub measures: Vec<Field>,
    /// Row binding; preferred over the model when present.
    pub binding: Option<Binding>,
    /// JSON model the rows can be looked up in.
    pub model: Option<Value>,
    /// JSON pointer into `model`, e.g. `/revenue`.
    pub data_path: Option<String>,
}

/// A dimension or measure. Unnamed fields fall back to their role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: Option<String>,
}

impl Field {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }
}

/// Rows delivered by a data binding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Binding {
    pub rows: Vec<Value>,
    /// Total length reported by the binding, when it knows more rows than
    /// it delivered.
    pub length: Option<usize>,
}

impl Binding {
    /// Rows `start..start + len`, clamped to what is available.
    pub fn contexts(&self, start: usize, len: usize) -> &[Value] {
        let start = start.min(self.rows.len());
        let end = start.saturating_add(len).min(self.rows.len());
        &self.rows[start..end]
    }
}

/// A feed (axis assignment) listing the fields it shows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feed {
    pub uid: String,
    #[serde(default)]
    pub values: Vec<String>,
}

// ─── Extraction result ───────────────────────────────────────────────────

/// Everything known about a chart, ready to be put into a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub chart_id: String,
    pub chart_type: String,
    pub title: String,
    pub language: String,
    /// Ordered, unique.
    pub field_names: Vec<String>,
    pub data_sample: String,
    pub aggregated_stats: String,
    pub row_count: usize,
    /// Set whenever the extraction had to degrade.
    pub data_gaps_present: bool,
}

impl ChartData {
    pub fn empty(chart_id: Option<&str>, language: &str) -> Self {
        Self {
            chart_id: chart_id.unwrap_or("unknown-chart").to_string(),
            chart_type: "unknown".to_string(),
            title: String::new(),
            language: language.to_string(),
            field_names: Vec::new(),
            data_sample: String::new(),
            aggregated_stats: String::new(),
            row_count: 0,
            data_gaps_present: false,
        }
    }

    /// Append a field name unless it is already present.
    pub fn push_field(&mut self, name: &str) {
        if !self.field_names.iter().any(|f| f == name) {
            self.field_names.push(name.to_string());
        }
    }
}

// ─── Statistics ──────────────────────────────────────────────────────────

/// Summary statistics over a non-empty set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub count: usize,
}

/// Compute min/max/mean/median. Returns `None` for an empty slice.
pub fn compute_stats(values: &[f64]) -> Option<Stats> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    Some(Stats {
        min,
        max,
        mean,
        median,
        count,
    })
}

/// `"<field>: min=X.XX, max=X.XX, mean=X.XX, median=X.XX, count=N"`, or
/// `None` when no row holds a number for the field.
pub fn field_stats(rows: &[Value], field: &str) -> Option<String> {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.get(field).and_then(leading_number))
        .collect();
    let s = compute_stats(&values)?;
    Some(format!(
        "{field}: min={:.2}, max={:.2}, mean={:.2}, median={:.2}, count={}",
        s.min, s.max, s.mean, s.median, s.count
    ))
}

/// Statistics for every numeric field, joined with `"; "`.
///
/// Uses the declared measure names; without any, numeric fields are
/// inferred from the first row.
pub fn aggregated_stats(rows: &[Value], measures: &[Field]) -> String {
    if rows.is_empty() {
        return NO_DATA_FOR_STATS.to_string();
    }
    let stats: Vec<String> = measure_names(measures, rows)
        .iter()
        .filter_map(|field| field_stats(rows, field))
        .collect();
    if stats.is_empty() {
        NO_NUMERIC_FIELDS.to_string()
    } else {
        stats.join("; ")
    }
}

/// Declared measure names, or the first row's numeric fields.
pub fn measure_names(measures: &[Field], rows: &[Value]) -> Vec<String> {
    let declared: Vec<String> = measures.iter().filter_map(|m| m.name.clone()).collect();
    if !declared.is_empty() {
        return declared;
    }
    match rows.first().and_then(Value::as_object) {
        Some(first) => first
            .iter()
            .filter(|(_, v)| is_numeric(v))
            .map(|(k, _)| k.clone())
            .collect(),
        None => Vec::new(),
    }
}

/// Text table of up to [`MAX_SAMPLE_ROWS`] rows: a `a | b` header line then
/// one line per row, `-` for missing values.
pub fn data_sample(rows: &[Value], field_names: &[String]) -> String {
    if rows.is_empty() {
        return NO_DATA.to_string();
    }
    let headers: Vec<String> = if field_names.is_empty() {
        rows[0]
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        field_names.to_vec()
    };

    let mut lines = vec![headers.join(" | ")];
    for row in rows.iter().take(MAX_SAMPLE_ROWS) {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| match row.get(h) {
                None | Some(Value::Null) => "-".to_string(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        lines.push(cells.join(" | "));
    }
    lines.join("\n")
}

/// A number, or a string that is entirely a finite number.
fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}

/// Numeric reading of a cell: numbers as-is, strings by their leading
/// numeric prefix (`"12.5 EUR"` → 12.5).
fn leading_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_prefix
            .parse_peek(s.trim_start())
            .ok()
            .map(|(_, n)| n)
            .filter(|n| n.is_finite()),
        _ => None,
    }
}

fn numeric_prefix(input: &mut &str) -> ModalResult<f64> {
    alt((
        float,
        // `12EUR`: an `e` without exponent digits ends the number
        (opt(one_of(['+', '-'])), digit1, opt(('.', digit0)))
            .take()
            .parse_to(),
    ))
    .parse_next(input)
}
