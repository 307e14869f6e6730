//! Content extraction from resolved targets.
//!
//! Text targets yield a plain string. Chart targets yield a [`ChartData`]:
//! read from the chart control registered for the element when there is
//! one, otherwise scraped from the chart's markup. Extraction never fails;
//! whatever cannot be read is logged and flagged as a data gap.

use aide_core::chart::{self, ChartControl, ChartData, MAX_SAMPLE_ROWS};
use aide_core::{Document, NodeIndex, Selector};
use serde_json::Value;
use std::sync::LazyLock;

pub const DOM_SAMPLE_UNAVAILABLE: &str =
    "(data extraction unavailable - no chart control bound to this element)";
pub const DOM_STATS_UNAVAILABLE: &str =
    "(statistics unavailable - no chart control bound to this element)";

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".v-m-title, .v-title, [class*='title']").expect("valid selector")
});
static LEGEND_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".v-legend-item, [class*='legend']").expect("valid selector")
});

/// Text of a generic target: raw value for form controls, raw text for
/// editable regions, whitespace-collapsed text otherwise.
pub fn extract_text(doc: &Document, target: NodeIndex) -> String {
    let Some(element) = doc.get(target) else {
        return String::new();
    };
    if element.is_form_control() {
        return element.value.clone().unwrap_or_default();
    }
    if doc.is_content_editable(target) {
        return doc.text_content(target);
    }
    collapse_whitespace(&doc.text_content(target))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Short display label for a chart: `Chart: <title | id | Unknown>`.
pub fn chart_label(data: &ChartData) -> String {
    let name = [data.title.as_str(), data.chart_id.as_str()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("Unknown");
    format!("Chart: {name}")
}

/// Read everything known about the chart rooted at `chart`.
pub fn extract_chart_data(doc: &Document, chart: NodeIndex, language: &str) -> ChartData {
    let chart_id = doc.get(chart).and_then(|e| e.id).map(|id| id.as_str());
    let mut data = ChartData::empty(chart_id, language);

    match doc.control_for(chart) {
        Some(control) => from_control(control, &mut data),
        None => from_markup(doc, chart, &mut data),
    }

    if data.data_gaps_present {
        log::warn!("chart `{}`: extracted with data gaps", data.chart_id);
    }
    data
}

// ─── Structured path ─────────────────────────────────────────────────────

fn from_control(control: &ChartControl, data: &mut ChartData) {
    data.chart_type = control
        .viz_type
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    if let Some(title) = &control.title {
        data.title = title.clone();
    }

    match &control.dataset {
        Some(dataset) => {
            for dim in &dataset.dimensions {
                data.push_field(dim.name.as_deref().unwrap_or("Dimension"));
            }
            for measure in &dataset.measures {
                data.push_field(measure.name.as_deref().unwrap_or("Measure"));
            }
            if let Some(binding) = &dataset.binding {
                let rows = binding.contexts(0, MAX_SAMPLE_ROWS);
                data.row_count = binding.length.filter(|&n| n > 0).unwrap_or(rows.len());
                fill_rows(rows, &dataset.measures, data);
            } else {
                from_model(dataset.model.as_ref(), dataset.data_path.as_deref(), &dataset.measures, data);
            }
        }
        None => {
            log::warn!("chart `{}`: control has no dataset", data.chart_id);
            data.data_gaps_present = true;
        }
    }

    if data.field_names.is_empty() {
        for feed in &control.feeds {
            for value in &feed.values {
                data.push_field(value);
            }
        }
    }
}

fn from_model(
    model: Option<&Value>,
    path: Option<&str>,
    measures: &[chart::Field],
    data: &mut ChartData,
) {
    let (Some(model), Some(path)) = (model, path.filter(|p| !p.is_empty())) else {
        log::warn!("chart `{}`: dataset is neither bound nor backed by a model path", data.chart_id);
        data.data_gaps_present = true;
        return;
    };

    let pointer = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    match model.pointer(&pointer) {
        Some(Value::Array(rows)) => {
            data.row_count = rows.len();
            let sample = &rows[..rows.len().min(MAX_SAMPLE_ROWS)];
            fill_rows(sample, measures, data);
        }
        _ => {
            log::warn!("chart `{}`: model path `{path}` is not an array", data.chart_id);
            data.data_gaps_present = true;
        }
    }
}

fn fill_rows(rows: &[Value], measures: &[chart::Field], data: &mut ChartData) {
    if rows.is_empty() {
        data.data_gaps_present = true;
        return;
    }
    data.data_sample = chart::data_sample(rows, &data.field_names);
    data.aggregated_stats = chart::aggregated_stats(rows, measures);
}

// ─── Markup fallback ─────────────────────────────────────────────────────

fn from_markup(doc: &Document, chart: NodeIndex, data: &mut ChartData) {
    data.data_gaps_present = true;

    if let Some(title) = doc.query_selector(chart, &TITLE_SELECTOR) {
        data.title = doc.text_content(title).trim().to_string();
    }

    let classes = doc.get(chart).map(|e| e.class_string()).unwrap_or_default();
    data.chart_type = detect_chart_type(&classes).to_string();

    for idx in doc.descendants(chart) {
        if doc.matches(idx, &LEGEND_SELECTOR) {
            let text = doc.text_content(idx);
            let text = text.trim();
            if !text.is_empty() {
                data.push_field(text);
            }
        }
    }

    data.data_sample = DOM_SAMPLE_UNAVAILABLE.to_string();
    data.aggregated_stats = DOM_STATS_UNAVAILABLE.to_string();
}

fn detect_chart_type(classes: &str) -> &'static str {
    if classes.contains("line") {
        "line"
    } else if classes.contains("bar") {
        "bar"
    } else if classes.contains("pie") || classes.contains("donut") {
        "pie/donut"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_core::chart::{Binding, Dataset, Feed, Field};
    use aide_core::Element;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn text_is_collapsed_and_trimmed() {
        let mut doc = Document::new();
        let div = doc.append(doc.root, Element::new("div").with_text("  a\n\t b  "));
        assert_eq!(extract_text(&doc, div), "a b");
    }

    #[test]
    fn form_controls_return_raw_value() {
        let mut doc = Document::new();
        let input = doc.append(doc.root, Element::new("input").with_value("  raw  "));
        assert_eq!(extract_text(&doc, input), "  raw  ");
    }

    #[test]
    fn editable_regions_return_raw_text() {
        let mut doc = Document::new();
        let editor = doc.append(
            doc.root,
            Element::new("div")
                .with_attr("contenteditable", "true")
                .with_text(" keep  spaces "),
        );
        assert_eq!(extract_text(&doc, editor), " keep  spaces ");
    }

    #[test]
    fn whitespace_only_div_is_empty() {
        let mut doc = Document::new();
        let div = doc.append(doc.root, Element::new("div"));
        doc.append(div, Element::new("span").with_text("   \n  "));
        assert_eq!(extract_text(&doc, div), "");
    }

    #[test]
    fn binding_path_fills_sample_and_stats() {
        let mut doc = Document::new();
        let chart = doc.append(doc.root, Element::new("div").with_id("salesChart").with_class("viz-frame"));
        doc.register_control(
            "salesChart",
            ChartControl {
                viz_type: Some("column".into()),
                title: Some("Sales".into()),
                dataset: Some(Dataset {
                    dimensions: vec![Field::named("month")],
                    measures: vec![Field::named("sales")],
                    binding: Some(Binding {
                        rows: vec![
                            json!({"month": "Jan", "sales": 10}),
                            json!({"month": "Feb", "sales": 20}),
                        ],
                        length: Some(48),
                    }),
                    ..Dataset::default()
                }),
                feeds: vec![],
            },
        );

        let data = extract_chart_data(&doc, chart, "en");
        assert_eq!(data.chart_type, "column");
        assert_eq!(data.field_names, vec!["month", "sales"]);
        assert_eq!(data.row_count, 48);
        assert_eq!(data.data_sample, "month | sales\nJan | 10\nFeb | 20");
        assert!(!data.data_gaps_present);
    }

    #[test]
    fn model_path_caps_sample_rows() {
        let rows: Vec<Value> = (0..30).map(|i| json!({"v": i})).collect();
        let mut doc = Document::new();
        let chart = doc.append(doc.root, Element::new("div").with_id("bigChart"));
        doc.register_control(
            "bigChart",
            ChartControl {
                dataset: Some(Dataset {
                    model: Some(json!({"points": rows})),
                    data_path: Some("/points".into()),
                    ..Dataset::default()
                }),
                ..ChartControl::default()
            },
        );

        let data = extract_chart_data(&doc, chart, "en");
        assert_eq!(data.row_count, 30);
        // header + capped rows
        assert_eq!(data.data_sample.lines().count(), MAX_SAMPLE_ROWS + 1);
        assert_eq!(data.aggregated_stats, "v: min=0.00, max=19.00, mean=9.50, median=9.50, count=20");
    }

    #[test]
    fn unbound_dataset_flags_gaps_and_uses_feeds() {
        let mut doc = Document::new();
        let chart = doc.append(doc.root, Element::new("div").with_id("feedChart"));
        doc.register_control(
            "feedChart",
            ChartControl {
                dataset: Some(Dataset::default()),
                feeds: vec![Feed {
                    uid: "valueAxis".into(),
                    values: vec!["Revenue".into(), "Revenue".into()],
                }],
                ..ChartControl::default()
            },
        );

        let data = extract_chart_data(&doc, chart, "en");
        assert!(data.data_gaps_present);
        assert_eq!(data.field_names, vec!["Revenue"]);
        assert_eq!(data.chart_type, "unknown");
    }

    #[test]
    fn markup_fallback_reads_title_type_and_legend() {
        let mut doc = Document::new();
        let chart = doc.append(doc.root, Element::new("div").with_class("viz-frame pie-chart"));
        doc.append(chart, Element::new("div").with_class("v-title").with_text(" Share "));
        let legend = doc.append(chart, Element::new("ul").with_class("chart-legend"));
        doc.append(legend, Element::new("li").with_class("v-legend-item").with_text("EMEA"));

        let data = extract_chart_data(&doc, chart, "de");
        assert!(data.data_gaps_present);
        assert_eq!(data.chart_id, "unknown-chart");
        assert_eq!(data.title, "Share");
        assert_eq!(data.chart_type, "pie/donut");
        assert_eq!(data.field_names, vec!["EMEA"]);
        assert_eq!(data.data_sample, DOM_SAMPLE_UNAVAILABLE);
        assert_eq!(chart_label(&data), "Chart: Share");
    }
}
