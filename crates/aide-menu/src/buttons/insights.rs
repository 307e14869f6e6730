//! Insights button: drop it on a chart to get an AI summary of the data.
//!
//! The drop extracts [`ChartData`], builds the analysis prompt and emits
//! an `InsightsRequest`. The answer comes back through
//! [`InsightsButton::set_insights_result`], which parses the three
//! delimited sections of the response into the popover.

use crate::button::{ActionContext, ButtonBehavior, ButtonKind, HighlightStyle, Transient};
use crate::event::AssistantEvent;
use crate::extract::extract_chart_data;
use crate::target::{ChartTargeting, Targeting};
use aide_core::chart::MAX_SAMPLE_ROWS;
use aide_core::{ChartData, NodeIndex};
use regex::Regex;
use std::any::Any;
use std::sync::LazyLock;

pub const INSIGHTS_ICON: &str = "e11f";
pub const INSIGHTS_ACTION: &str = "insights";
pub const INSIGHTS_TOOLTIP: &str =
    "AI Insights - Click to highlight charts, drag onto a chart to analyze";

pub const ANALYZING_TEXT: &str = "Analyzing chart data...";
pub const INSIGHTS_ERROR_TEXT: &str = "Insights could not be loaded. Please try again.";
pub const NO_INSIGHTS_TEXT: &str = "No insights received from the AI service.";

pub const RECOMMENDED_MAX_TOKENS: usize = 400;

pub const CONFIDENCE_HIGH_COLOR: &str = "#107E3E";
pub const CONFIDENCE_MEDIUM_COLOR: &str = "#E9730C";
pub const CONFIDENCE_LOW_COLOR: &str = "#B00";
pub const CONFIDENCE_NEUTRAL_COLOR: &str = "#5E696E";

pub const INSIGHTS_HIGHLIGHT: HighlightStyle = HighlightStyle {
    id: "aiInsightsChartStyles",
    css: r#"
.viz-frame.ai-highlight-target,
[class*='VizFrame'].ai-highlight-target {
  outline: 3px dashed #FFB400 !important;
  outline-offset: 4px;
  background-color: rgba(255, 180, 0, 0.08) !important;
  cursor: crosshair !important;
  transition: all 0.2s ease;
}
.viz-frame.ai-highlight-target:hover,
[class*='VizFrame'].ai-highlight-target:hover {
  background-color: rgba(255, 180, 0, 0.15) !important;
  box-shadow: 0 0 20px rgba(255, 180, 0, 0.4);
}
.viz-frame.ai-highlight-active,
[class*='VizFrame'].ai-highlight-active {
  background-color: rgba(255, 180, 0, 0.25) !important;
  outline-style: solid !important;
  box-shadow: 0 0 25px rgba(255, 180, 0, 0.5);
}
"#,
};

// ─── Prompt ──────────────────────────────────────────────────────────────

/// The analysis prompt for one chart.
pub fn build_prompt(data: &ChartData) -> String {
    let gaps_note = if data.data_gaps_present {
        " (Note: data gaps present - confidence may be reduced)"
    } else {
        ""
    };
    let rows_note = if data.row_count > MAX_SAMPLE_ROWS {
        format!(" (showing first {MAX_SAMPLE_ROWS} of {} rows)", data.row_count)
    } else {
        String::new()
    };
    let title = if data.title.is_empty() {
        "(no title)"
    } else {
        data.title.as_str()
    };
    let fields = if data.field_names.is_empty() {
        "(unknown)".to_string()
    } else {
        data.field_names.join(", ")
    };
    let language = &data.language;

    format!(
        "Context:
You are a factual data analyst. Language: {language}.
Chart ID: {chart_id}.
Chart type: {chart_type}.
Chart title: {title}.{gaps_note}

Data:
Fields: {fields}
Data sample{rows_note}:
{sample}

Aggregated metrics (per numeric field): {stats}

Task:
Provide your analysis in THREE distinct sections with EXACTLY these delimiters:

[SUMMARY]
Write 2-3 sentences describing the main trend or pattern visible in the chart. Keep it concise and business-friendly.
[/SUMMARY]

[INSIGHTS]
Provide up to 3 bullet points (use • character) about notable observations:
• First insight about increases, decreases, or outliers (1-2 sentences)
• Second insight about comparisons or patterns (1-2 sentences)
• Third insight or hypothesis about causes, if applicable (1-2 sentences)
[/INSIGHTS]

[CONFIDENCE]
Provide a percentage (e.g., 85%) based on data completeness and pattern clarity. Then add one sentence explaining the confidence level.
[/CONFIDENCE]

Constraints:
- Use {language} for the response
- Use plain text only, no tables or JSON
- Keep tone non-technical and business-friendly
- Keep total response under ~{RECOMMENDED_MAX_TOKENS} tokens
- MUST use the exact section delimiters shown above",
        chart_id = data.chart_id,
        chart_type = data.chart_type,
        sample = data.data_sample,
        stats = data.aggregated_stats,
    )
}

// ─── Response parsing ────────────────────────────────────────────────────

static SUMMARY_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[SUMMARY\]").expect("valid regex"));
static INSIGHTS_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[INSIGHTS\]").expect("valid regex"));
static CONFIDENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[CONFIDENCE\]").expect("valid regex"));
static LEADING_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-*]\s+").expect("valid regex"));
static BULLET_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*[•\-*]\s+").expect("valid regex"));
static PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)%").expect("valid regex"));
static DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[/?(SUMMARY|INSIGHTS|CONFIDENCE)\]").expect("valid regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInsights {
    pub summary: String,
    pub insights: Vec<String>,
    pub confidence: String,
    pub confidence_value: Option<u32>,
}

/// Body of the section opened by `open`: everything up to the next `[`.
fn section<'a>(response: &'a str, open: &Regex) -> Option<&'a str> {
    let start = open.find(response)?.end();
    let rest = &response[start..];
    let end = rest.find('[').unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Split the delimited sections of an insights response. Responses with
/// neither a summary nor insights become one summary, delimiters removed.
pub fn parse_insights(response: &str) -> ParsedInsights {
    let mut parsed = ParsedInsights::default();

    if let Some(summary) = section(response, &SUMMARY_OPEN) {
        parsed.summary = summary.to_string();
    }

    if let Some(body) = section(response, &INSIGHTS_OPEN) {
        let body = LEADING_BULLET.replace(body, "");
        parsed.insights = BULLET_SPLIT
            .split(&body)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Some(confidence) = section(response, &CONFIDENCE_OPEN) {
        parsed.confidence = confidence.to_string();
        parsed.confidence_value = PERCENT
            .captures(confidence)
            .and_then(|c| c[1].parse().ok());
    }

    if parsed.summary.is_empty() && parsed.insights.is_empty() {
        parsed.summary = DELIMITER.replace_all(response, "").trim().to_string();
    }
    parsed
}

/// Indicator color for a confidence percentage.
pub fn confidence_color(value: Option<u32>) -> &'static str {
    match value {
        None => CONFIDENCE_NEUTRAL_COLOR,
        Some(v) if v >= 80 => CONFIDENCE_HIGH_COLOR,
        Some(v) if v >= 60 => CONFIDENCE_MEDIUM_COLOR,
        Some(_) => CONFIDENCE_LOW_COLOR,
    }
}

// ─── Popover ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InsightsPopover {
    pub open: bool,
    pub anchor: Option<NodeIndex>,
    pub summary: String,
    pub insights: Vec<String>,
    pub confidence: String,
    pub confidence_value: Option<u32>,
    busy: bool,
}

impl InsightsPopover {
    fn show_loading(&mut self, anchor: NodeIndex) {
        self.summary = ANALYZING_TEXT.to_string();
        self.insights.clear();
        self.confidence = "...".to_string();
        self.confidence_value = None;
        self.busy = true;
        self.anchor = Some(anchor);
        self.open = true;
    }

    pub fn confidence_color(&self) -> &'static str {
        confidence_color(self.confidence_value)
    }
}

#[derive(Debug)]
pub struct InsightsButton {
    targeting: Targeting,
    popover: Transient<InsightsPopover>,
    last_prompt: Option<String>,
}

impl Default for InsightsButton {
    fn default() -> Self {
        Self::new(ChartTargeting::default())
    }
}

impl InsightsButton {
    pub fn new(targeting: ChartTargeting) -> Self {
        Self {
            targeting: Targeting::Chart(targeting),
            popover: Transient::default(),
            last_prompt: None,
        }
    }

    pub fn popover(&self) -> Option<&InsightsPopover> {
        self.popover.get()
    }

    /// Prompt of the most recent drop.
    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.popover.get().is_some_and(|p| p.busy)
    }

    /// Apply an AI response. Sections missing from the response keep their
    /// current content.
    pub fn set_insights_result(&mut self, response: &str) {
        let Some(popover) = self.popover.get_mut() else {
            return;
        };
        let parsed = parse_insights(response);
        if !parsed.summary.is_empty() {
            popover.summary = parsed.summary;
        }
        if !parsed.insights.is_empty() {
            popover.insights = parsed.insights;
        }
        if !parsed.confidence.is_empty() {
            popover.confidence = parsed.confidence;
            popover.confidence_value = Some(parsed.confidence_value.unwrap_or(0));
        }
        popover.busy = false;
    }

    pub fn set_insights_error(&mut self, message: Option<&str>) {
        let Some(popover) = self.popover.get_mut() else {
            return;
        };
        popover.summary = message
            .filter(|m| !m.is_empty())
            .unwrap_or(INSIGHTS_ERROR_TEXT)
            .to_string();
        popover.insights.clear();
        popover.confidence = "Error".to_string();
        popover.busy = false;
    }

    pub fn close_insights(&mut self) {
        if let Some(popover) = self.popover.get_mut() {
            popover.open = false;
        }
    }
}

impl ButtonBehavior for InsightsButton {
    fn kind(&self) -> ButtonKind {
        ButtonKind::Insights
    }

    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn handle_action(&mut self, ctx: &mut ActionContext<'_>, _content: &str, target: NodeIndex) {
        let data = extract_chart_data(ctx.doc, target, ctx.locale);
        let prompt = build_prompt(&data);
        self.popover
            .get_or_build(InsightsPopover::default)
            .show_loading(target);
        self.last_prompt = Some(prompt.clone());

        log::debug!("insights requested for chart `{}`", data.chart_id);
        let button = ctx.button;
        ctx.emit(AssistantEvent::InsightsRequest {
            button,
            chart_id: data.chart_id.clone(),
            chart_type: data.chart_type.clone(),
            chart_title: data.title.clone(),
            prompt,
            payload: Box::new(data),
            target,
        });
    }

    fn highlight_style(&self) -> HighlightStyle {
        INSIGHTS_HIGHLIGHT
    }

    fn teardown(&mut self) {
        self.popover.teardown();
        self.last_prompt = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL: &str = "[SUMMARY]\nSales grew steadily.\n[/SUMMARY]\n\
[INSIGHTS]\n• March peaked.\n• Q2 was flat.\n- Returns fell.\n[/INSIGHTS]\n\
[CONFIDENCE]\n85% - data is complete.\n[/CONFIDENCE]";

    #[test]
    fn parses_all_three_sections() {
        let parsed = parse_insights(FULL);
        assert_eq!(
            parsed,
            ParsedInsights {
                summary: "Sales grew steadily.".into(),
                insights: vec!["March peaked.".into(), "Q2 was flat.".into(), "Returns fell.".into()],
                confidence: "85% - data is complete.".into(),
                confidence_value: Some(85),
            }
        );
        assert_eq!(confidence_color(parsed.confidence_value), CONFIDENCE_HIGH_COLOR);
    }

    #[test]
    fn lowercase_delimiters_are_accepted() {
        let parsed = parse_insights("[summary] ok [confidence] 65%");
        assert_eq!(parsed.summary, "ok");
        assert_eq!(parsed.confidence_value, Some(65));
        assert_eq!(confidence_color(parsed.confidence_value), CONFIDENCE_MEDIUM_COLOR);
    }

    #[test]
    fn unstructured_response_becomes_summary() {
        let parsed = parse_insights("Revenue doubled. [/SUMMARY]");
        assert_eq!(parsed.summary, "Revenue doubled.");
        assert!(parsed.insights.is_empty());
        assert_eq!(parsed.confidence_value, None);
    }

    #[test]
    fn confidence_colors() {
        assert_eq!(confidence_color(None), CONFIDENCE_NEUTRAL_COLOR);
        assert_eq!(confidence_color(Some(80)), CONFIDENCE_HIGH_COLOR);
        assert_eq!(confidence_color(Some(60)), CONFIDENCE_MEDIUM_COLOR);
        assert_eq!(confidence_color(Some(59)), CONFIDENCE_LOW_COLOR);
    }

    #[test]
    fn prompt_carries_notes_and_placeholders() {
        let mut data = ChartData::empty(Some("c1"), "de");
        data.row_count = 48;
        data.data_gaps_present = true;
        let prompt = build_prompt(&data);

        assert!(prompt.contains("Chart title: (no title). (Note: data gaps present - confidence may be reduced)"));
        assert!(prompt.contains("Fields: (unknown)"));
        assert!(prompt.contains("Data sample (showing first 20 of 48 rows):"));
        assert!(prompt.contains("- Use de for the response"));
        assert!(prompt.contains("under ~400 tokens"));
    }

    #[test]
    fn confidence_only_response_becomes_summary() {
        let mut insights = InsightsButton::default();
        insights
            .popover
            .get_or_build(InsightsPopover::default)
            .show_loading(NodeIndex::new(0));
        assert!(insights.is_loading());

        insights.set_insights_result("[CONFIDENCE] 40% [/CONFIDENCE]");
        let popover = insights.popover().unwrap();
        // no summary and no insights: whole text becomes the summary
        assert_eq!(popover.summary, "40%");
        assert_eq!(popover.confidence_color(), CONFIDENCE_LOW_COLOR);
        assert!(!insights.is_loading());

        insights.set_insights_error(None);
        assert_eq!(insights.popover().unwrap().summary, INSIGHTS_ERROR_TEXT);
        assert_eq!(insights.popover().unwrap().confidence, "Error");

        insights.close_insights();
        assert!(!insights.popover().unwrap().open);
    }
}
