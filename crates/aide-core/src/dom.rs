//! In-memory page model the assistant targets.
//!
//! The document is a tree of elements stored in a `StableDiGraph`: nodes are
//! elements, edges are parent→child containment. Indices stay valid across
//! removals, so hosts can hold on to a `NodeIndex` for as long as the element
//! lives. Besides the tree, the document carries the few process-wide pieces
//! a page has: the `<head>` style sheets, document-level listener
//! registrations and the registry of data-bound chart controls.

use crate::chart::ChartControl;
use crate::id::{ClassName, ElementId};
use crate::selector::Selector;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

// ─── Geometry ────────────────────────────────────────────────────────────

/// A layout box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// A single element of the page.
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Lower-case tag name (`div`, `input`, `svg`, ...).
    pub tag: String,

    /// Value of the `id` attribute.
    pub id: Option<ElementId>,

    /// Ordered, de-duplicated class list.
    pub classes: SmallVec<[ClassName; 4]>,

    /// Every other attribute (`title`, `contenteditable`, `draggable`, `style`, ...).
    pub attributes: HashMap<String, String>,

    /// Current value of a form control (`input`, `textarea`).
    pub value: Option<String>,

    /// The element's own text, rendered before its children.
    pub text: Option<String>,

    /// Layout box used for hit testing.
    pub bounds: Option<Rect>,

    /// `display: none`: the element and its subtree have no layout box.
    pub hidden: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(ElementId::intern(id));
        self
    }

    /// Add one or more whitespace-separated classes.
    #[must_use]
    pub fn with_class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            let class = ClassName::intern(class);
            if !self.classes.contains(&class) {
                self.classes.push(class);
            }
        }
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c.as_str() == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `class` attribute as a single space-joined string.
    pub fn class_string(&self) -> String {
        self.classes
            .iter()
            .map(ClassName::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_form_control(&self) -> bool {
        self.tag == "input" || self.tag == "textarea"
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The page: an element tree plus document-wide registries.
#[derive(Debug, Clone)]
pub struct Document {
    /// The underlying directed graph.
    pub graph: StableDiGraph<Element, ()>,

    /// The `body` element.
    pub root: NodeIndex,

    /// Index from `id` attribute → element for fast lookup.
    pub id_index: HashMap<ElementId, NodeIndex>,

    /// Data-bound chart controls, keyed by the id of their root element.
    pub controls: HashMap<ElementId, ChartControl>,

    /// Children of each parent in document order. Graph indices get reused
    /// after removals, so they cannot stand in for sibling order.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,

    /// Injected `<style>` sheets by id, in injection order.
    styles: Vec<(String, String)>,

    /// Owners that currently have document-level listeners installed.
    listeners: HashSet<String>,

    /// Number of effective class additions/removals so far.
    class_mutations: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a `body` root.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(Element::new("body"));
        Self {
            graph,
            root,
            id_index: HashMap::new(),
            controls: HashMap::new(),
            child_order: HashMap::new(),
            styles: Vec::new(),
            listeners: HashSet::new(),
            class_mutations: 0,
        }
    }

    /// Append `element` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeIndex, element: Element) -> NodeIndex {
        let id = element.id;
        let idx = self.graph.add_node(element);
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        if let Some(id) = id {
            self.id_index.insert(id, idx);
        }
        idx
    }

    /// Remove an element and its whole subtree. Returns the removed element.
    pub fn remove(&mut self, idx: NodeIndex) -> Option<Element> {
        if idx == self.root {
            return None;
        }
        let parent = self.parent(idx);
        for descendant in self.descendants(idx) {
            self.child_order.remove(&descendant);
            if let Some(removed) = self.graph.remove_node(descendant)
                && let Some(id) = removed.id
            {
                self.id_index.remove(&id);
            }
        }
        self.child_order.remove(&idx);
        if let Some(siblings) = parent.and_then(|p| self.child_order.get_mut(&p)) {
            siblings.retain(|&s| s != idx);
        }
        let removed = self.graph.remove_node(idx)?;
        if let Some(id) = removed.id {
            self.id_index.remove(&id);
        }
        Some(removed)
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Element> {
        self.graph.node_weight(idx)
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut Element> {
        self.graph.node_weight_mut(idx)
    }

    /// Look up an element by its `id` attribute.
    pub fn by_id(&self, id: &str) -> Option<NodeIndex> {
        self.id_index.get(&ElementId::lookup(id)?).copied()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children in document (insertion) order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.child_order.get(&idx).cloned().unwrap_or_default()
    }

    /// Iterate `idx` and then each of its ancestors up to the root.
    pub fn ancestors(&self, idx: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.get(idx).map(|_| idx),
        }
    }

    /// Every element below `idx`, in document order (pre-order).
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        self.collect_descendants(idx, &mut out);
        out
    }

    fn collect_descendants(&self, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
        for child in self.children(idx) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Whether `other` is `container` itself or one of its descendants.
    pub fn contains(&self, container: NodeIndex, other: NodeIndex) -> bool {
        self.ancestors(other).any(|a| a == container)
    }

    /// Concatenated text of the element and its descendants.
    pub fn text_content(&self, idx: NodeIndex) -> String {
        let mut out = String::new();
        self.collect_text(idx, &mut out);
        out
    }

    fn collect_text(&self, idx: NodeIndex, out: &mut String) {
        if let Some(text) = self.get(idx).and_then(|e| e.text.as_deref()) {
            out.push_str(text);
        }
        for child in self.children(idx) {
            self.collect_text(child, out);
        }
    }

    /// Editability inherited through `contenteditable`, like the browser's
    /// `isContentEditable`.
    pub fn is_content_editable(&self, idx: NodeIndex) -> bool {
        for ancestor in self.ancestors(idx) {
            match self.graph[ancestor].attr("contenteditable") {
                Some("false") => return false,
                Some("" | "true" | "plaintext-only") => return true,
                _ => {}
            }
        }
        false
    }

    /// Whether the element has a layout box: it exists and neither it nor
    /// any ancestor is hidden.
    pub fn is_rendered(&self, idx: NodeIndex) -> bool {
        self.get(idx).is_some() && self.ancestors(idx).all(|a| !self.graph[a].hidden)
    }

    // ─── Classes ─────────────────────────────────────────────────────────

    pub fn has_class(&self, idx: NodeIndex, class: &str) -> bool {
        self.get(idx).is_some_and(|e| e.has_class(class))
    }

    /// Add a class. Returns `false` when it was already present.
    pub fn add_class(&mut self, idx: NodeIndex, class: &str) -> bool {
        let class = ClassName::intern(class);
        let Some(element) = self.graph.node_weight_mut(idx) else {
            return false;
        };
        if element.classes.contains(&class) {
            return false;
        }
        element.classes.push(class);
        self.class_mutations += 1;
        true
    }

    /// Remove a class. Returns `false` when it was not present.
    pub fn remove_class(&mut self, idx: NodeIndex, class: &str) -> bool {
        let Some(class) = ClassName::lookup(class) else {
            return false;
        };
        let Some(element) = self.graph.node_weight_mut(idx) else {
            return false;
        };
        let Some(pos) = element.classes.iter().position(|c| *c == class) else {
            return false;
        };
        element.classes.remove(pos);
        self.class_mutations += 1;
        true
    }

    /// Count of class changes that actually touched an element.
    pub fn class_mutations(&self) -> u64 {
        self.class_mutations
    }

    /// Elements currently carrying `class`, in document order.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeIndex> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&idx| self.graph[idx].has_class(class))
            .collect()
    }

    // ─── Selectors ───────────────────────────────────────────────────────

    pub fn matches(&self, idx: NodeIndex, selector: &Selector) -> bool {
        self.get(idx).is_some_and(|e| selector.matches(e))
    }

    /// All elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeIndex> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&idx| selector.matches(&self.graph[idx]))
            .collect()
    }

    /// First descendant of `idx` (excluding itself) matching `selector`.
    pub fn query_selector(&self, idx: NodeIndex, selector: &Selector) -> Option<NodeIndex> {
        self.descendants(idx)
            .into_iter()
            .find(|&d| selector.matches(&self.graph[d]))
    }

    /// Nearest ancestor-or-self matching `selector`.
    pub fn closest(&self, idx: NodeIndex, selector: &Selector) -> Option<NodeIndex> {
        self.ancestors(idx)
            .find(|&a| selector.matches(&self.graph[a]))
    }

    // ─── Head: style sheets ──────────────────────────────────────────────

    /// Inject a style sheet unless one with the same id exists.
    /// Returns `true` when the sheet was added.
    pub fn inject_style(&mut self, id: &str, css: &str) -> bool {
        if self.has_style(id) {
            return false;
        }
        self.styles.push((id.to_string(), css.to_string()));
        true
    }

    /// Replace (or add) a style sheet by id.
    pub fn replace_style(&mut self, id: &str, css: &str) {
        self.remove_style(id);
        self.styles.push((id.to_string(), css.to_string()));
    }

    /// Remove a style sheet. Returns `true` when one was removed.
    pub fn remove_style(&mut self, id: &str) -> bool {
        let before = self.styles.len();
        self.styles.retain(|(sid, _)| sid != id);
        self.styles.len() != before
    }

    pub fn has_style(&self, id: &str) -> bool {
        self.styles.iter().any(|(sid, _)| sid == id)
    }

    pub fn style(&self, id: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(sid, _)| sid == id)
            .map(|(_, css)| css.as_str())
    }

    pub fn style_ids(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(|(id, _)| id.as_str())
    }

    // ─── Document-level listeners ────────────────────────────────────────

    /// Register document-level listeners for `owner`.
    /// Returns `false` when that owner is already registered.
    pub fn add_listeners(&mut self, owner: &str) -> bool {
        self.listeners.insert(owner.to_string())
    }

    pub fn remove_listeners(&mut self, owner: &str) -> bool {
        self.listeners.remove(owner)
    }

    pub fn has_listeners(&self, owner: &str) -> bool {
        self.listeners.contains(owner)
    }

    // ─── Controls ────────────────────────────────────────────────────────

    /// Bind a chart control to the element with id `element_id`.
    pub fn register_control(&mut self, element_id: &str, control: ChartControl) {
        self.controls.insert(ElementId::intern(element_id), control);
    }

    /// The control bound to an element, looked up through its `id`.
    pub fn control_for(&self, idx: NodeIndex) -> Option<&ChartControl> {
        let id = self.get(idx)?.id?;
        self.controls.get(&id)
    }
}

/// Iterator over an element and its ancestors. See [`Document::ancestors`].
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}
