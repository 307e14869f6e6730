//! Drop-target resolution: which element a dragged button would act on.
//!
//! Given the element under the pointer, [`Targeting::resolve`] walks up the
//! ancestor chain and classifies each element until one qualifies. The
//! result separates the element content is read from (`target`) and the
//! element that gets highlighted (`visual`), e.g. an input and its styled
//! wrapper.

use crate::extract;
use aide_core::{Document, NodeIndex, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Maximum ancestor hops while resolving.
pub const MAX_DEPTH: usize = 20;

/// Maximum hops (self included) when looking for an input's wrapper.
pub const VISUAL_WRAPPER_DEPTH: usize = 5;

static EDITABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input, textarea").expect("valid selector"));

/// A resolved drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    /// Element content is extracted from.
    pub target: NodeIndex,
    /// Element that receives highlight styling.
    pub visual: NodeIndex,
}

impl DropTarget {
    pub const fn same(idx: NodeIndex) -> Self {
        Self {
            target: idx,
            visual: idx,
        }
    }
}

// ─── Generic text targets ────────────────────────────────────────────────

/// Class names that identify text-bearing page structures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetClasses {
    /// Feed / list item containers.
    pub feed_items: Vec<String>,
    /// Styled wrappers around a native input or textarea.
    pub input_wrappers: Vec<String>,
    /// Text, label, status and title leaves.
    pub text_leaves: Vec<String>,
    /// List and table rows.
    pub rows: Vec<String>,
}

impl Default for TargetClasses {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            feed_items: owned(&["sapMFeedListItem"]),
            input_wrappers: owned(&["sapMInput", "sapMTextArea", "sapMInputBase"]),
            text_leaves: owned(&[
                "sapMFeedListItemText",
                "sapMText",
                "sapMLabel",
                "sapMObjectStatus",
                "sapMTitle",
            ]),
            rows: owned(&["sapMLIB", "sapMListTblRow"]),
        }
    }
}

/// Resolution rules for text content: inputs, editable regions, list and
/// table rows, and text leaves.
#[derive(Debug, Clone)]
pub struct GenericTargeting {
    classes: TargetClasses,
    /// Every element worth offering as a candidate.
    candidates: Selector,
    /// Items a text leaf defers to (`closest` lookup).
    items: Selector,
}

impl GenericTargeting {
    pub fn new(classes: TargetClasses) -> Self {
        let items = Selector::any_class(
            classes
                .feed_items
                .iter()
                .chain(&classes.rows)
                .map(String::as_str),
        );

        let class_list = classes
            .input_wrappers
            .iter()
            .chain(&classes.feed_items)
            .chain(&classes.rows)
            .chain(&classes.text_leaves)
            .map(|c| format!(".{c}"))
            .collect::<Vec<_>>();
        let mut source = String::from("input, textarea, [contenteditable='true']");
        for class in &class_list {
            source.push_str(", ");
            source.push_str(class);
        }
        let candidates = Selector::parse(&source).unwrap_or_else(|e| {
            log::warn!("{e}; falling back to native inputs only");
            EDITABLE_SELECTOR.clone()
        });

        Self {
            classes,
            candidates,
            items,
        }
    }

    pub fn classes(&self) -> &TargetClasses {
        &self.classes
    }

    fn has_any(doc: &Document, idx: NodeIndex, classes: &[String]) -> bool {
        classes.iter().any(|c| doc.has_class(idx, c))
    }

    /// Classify one element. `None` means "keep walking up".
    fn check(&self, doc: &Document, idx: NodeIndex) -> Option<DropTarget> {
        let element = doc.get(idx)?;

        if Self::has_any(doc, idx, &self.classes.feed_items) {
            return Some(DropTarget::same(idx));
        }

        if element.is_form_control() || doc.is_content_editable(idx) {
            return Some(DropTarget {
                target: idx,
                visual: self.visual_wrapper(doc, idx),
            });
        }

        if Self::has_any(doc, idx, &self.classes.input_wrappers) {
            let inner = doc.query_selector(idx, &EDITABLE_SELECTOR);
            return Some(DropTarget {
                target: inner.unwrap_or(idx),
                visual: idx,
            });
        }

        if Self::has_any(doc, idx, &self.classes.text_leaves) {
            let item = doc.closest(idx, &self.items).unwrap_or(idx);
            return Some(DropTarget::same(item));
        }

        if Self::has_any(doc, idx, &self.classes.rows) {
            return Some(DropTarget::same(idx));
        }

        None
    }

    /// Nearest input wrapper within [`VISUAL_WRAPPER_DEPTH`] hops, else the
    /// element itself.
    fn visual_wrapper(&self, doc: &Document, idx: NodeIndex) -> NodeIndex {
        doc.ancestors(idx)
            .take(VISUAL_WRAPPER_DEPTH)
            .find(|&a| Self::has_any(doc, a, &self.classes.input_wrappers))
            .unwrap_or(idx)
    }
}

// ─── Chart targets ───────────────────────────────────────────────────────

/// Resolution rules for data-visualization widgets.
#[derive(Debug, Clone)]
pub struct ChartTargeting {
    /// Marks chart roots; also the candidate selector.
    marker: Selector,
    /// Substring of an `id` that marks a chart root.
    id_pattern: String,
    /// Substring of a tag name that marks a chart root.
    tag_hint: String,
}

pub const DEFAULT_CHART_SELECTOR: &str = ".viz-frame, [class*='VizFrame']";
pub const DEFAULT_CHART_ID_PATTERN: &str = "VizFrame";
pub const DEFAULT_CHART_TAG_HINT: &str = "viz";

impl Default for ChartTargeting {
    fn default() -> Self {
        Self {
            marker: Selector::parse(DEFAULT_CHART_SELECTOR).expect("valid selector"),
            id_pattern: DEFAULT_CHART_ID_PATTERN.to_string(),
            tag_hint: DEFAULT_CHART_TAG_HINT.to_string(),
        }
    }
}

impl ChartTargeting {
    /// Chart targeting with a custom candidate selector.
    pub fn with_selector(selector: &str) -> Result<Self, String> {
        Ok(Self {
            marker: Selector::parse(selector)?,
            ..Self::default()
        })
    }

    pub fn selector(&self) -> &Selector {
        &self.marker
    }

    fn is_chart(&self, doc: &Document, idx: NodeIndex) -> bool {
        let Some(element) = doc.get(idx) else {
            return false;
        };
        self.marker.matches(element)
            || element
                .id
                .is_some_and(|id| id.as_str().contains(self.id_pattern.as_str()))
            || element.tag.contains(self.tag_hint.as_str())
    }

    fn find_chart(&self, doc: &Document, node: NodeIndex) -> Option<NodeIndex> {
        for current in doc.ancestors(node).take(MAX_DEPTH) {
            if self.is_chart(doc, current) {
                return Some(current);
            }
            if doc.get(current).is_some_and(|e| e.tag == "svg")
                && let Some(frame) = doc.closest(current, &self.marker)
            {
                return Some(frame);
            }
        }
        None
    }
}

// ─── Dispatch ────────────────────────────────────────────────────────────

/// How a button finds its targets and reads their content.
#[derive(Debug, Clone)]
pub enum Targeting {
    Generic(GenericTargeting),
    Chart(ChartTargeting),
}

impl Default for Targeting {
    fn default() -> Self {
        Self::Generic(GenericTargeting::new(TargetClasses::default()))
    }
}

impl Targeting {
    pub fn generic(classes: TargetClasses) -> Self {
        Self::Generic(GenericTargeting::new(classes))
    }

    pub fn chart() -> Self {
        Self::Chart(ChartTargeting::default())
    }

    /// Classify `node` (the element under the pointer). Pure: no highlight
    /// side effects.
    pub fn resolve(&self, doc: &Document, node: NodeIndex) -> Option<DropTarget> {
        let resolved = match self {
            Self::Generic(generic) => doc
                .ancestors(node)
                .take(MAX_DEPTH)
                .find_map(|current| generic.check(doc, current)),
            Self::Chart(chart) => chart.find_chart(doc, node).map(DropTarget::same),
        };
        log::trace!("resolve {node:?} -> {resolved:?}");
        resolved
    }

    /// Selector every candidate element matches.
    pub fn candidate_selector(&self) -> &Selector {
        match self {
            Self::Generic(generic) => &generic.candidates,
            Self::Chart(chart) => &chart.marker,
        }
    }

    /// Display text for a resolved target.
    pub fn extract(&self, doc: &Document, target: NodeIndex) -> String {
        match self {
            Self::Generic(_) => extract::extract_text(doc, target),
            Self::Chart(_) => {
                let data = extract::extract_chart_data(doc, target, "");
                extract::chart_label(&data)
            }
        }
    }

    /// Every element a click-preview should mark: candidates that are
    /// rendered, outside `own_root`, and resolve to non-empty content.
    /// Only the outermost survivors are kept.
    pub fn targetable_elements(&self, doc: &Document, own_root: Option<NodeIndex>) -> Vec<NodeIndex> {
        let survivors: Vec<NodeIndex> = doc
            .query_selector_all(self.candidate_selector())
            .into_iter()
            .filter(|&idx| doc.is_rendered(idx))
            .filter(|&idx| own_root.is_none_or(|root| !doc.contains(root, idx)))
            .filter(|&idx| {
                self.resolve(doc, idx)
                    .is_some_and(|t| !self.extract(doc, t.target).trim().is_empty())
            })
            .collect();

        remove_nested(doc, survivors)
    }
}

/// Drop every element that lies inside another element of the list.
fn remove_nested(doc: &Document, elements: Vec<NodeIndex>) -> Vec<NodeIndex> {
    elements
        .iter()
        .copied()
        .filter(|&el| {
            !elements
                .iter()
                .any(|&other| other != el && doc.contains(other, el))
        })
        .collect()
}
