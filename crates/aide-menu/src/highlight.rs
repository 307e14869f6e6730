//! Per-button highlight state.
//!
//! Two independent states:
//! - **broadcast**: every candidate target marked with
//!   [`HIGHLIGHT_TARGET_CLASS`] (click preview, or while dragging);
//! - **active**: the one target under the pointer during a drag, marked
//!   with [`HIGHLIGHT_ACTIVE_CLASS`].
//!
//! Every exit path goes through [`Highlighter::clear_all`], which leaves
//! no highlight class behind.

use aide_core::{Document, NodeIndex};

pub const HIGHLIGHT_TARGET_CLASS: &str = "ai-highlight-target";
pub const HIGHLIGHT_ACTIVE_CLASS: &str = "ai-highlight-active";

#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    showing: bool,
    marked: Vec<NodeIndex>,
    active: Option<NodeIndex>,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub fn marked(&self) -> &[NodeIndex] {
        &self.marked
    }

    pub fn active(&self) -> Option<NodeIndex> {
        self.active
    }

    /// Mark a freshly queried candidate set. Replaces any previous marks.
    pub fn show(&mut self, doc: &mut Document, candidates: Vec<NodeIndex>) {
        self.clear_broadcast(doc);
        for &idx in &candidates {
            doc.add_class(idx, HIGHLIGHT_TARGET_CLASS);
        }
        log::debug!("broadcast highlight on {} element(s)", candidates.len());
        self.marked = candidates;
        self.showing = true;
    }

    /// Remove the broadcast marks.
    pub fn clear_broadcast(&mut self, doc: &mut Document) {
        for idx in self.marked.drain(..) {
            doc.remove_class(idx, HIGHLIGHT_TARGET_CLASS);
        }
        self.showing = false;
    }

    /// Toggle broadcast. `candidates` is only queried when turning on.
    pub fn toggle(&mut self, doc: &mut Document, candidates: impl FnOnce(&Document) -> Vec<NodeIndex>) {
        if self.showing {
            self.clear_broadcast(doc);
        } else {
            let found = candidates(doc);
            self.show(doc, found);
        }
    }

    /// Mark `idx` as the active target. Same element again is a no-op.
    pub fn set_active(&mut self, doc: &mut Document, idx: NodeIndex) {
        if self.active == Some(idx) {
            return;
        }
        self.clear_active(doc);
        doc.add_class(idx, HIGHLIGHT_ACTIVE_CLASS);
        self.active = Some(idx);
    }

    pub fn clear_active(&mut self, doc: &mut Document) {
        if let Some(idx) = self.active.take() {
            doc.remove_class(idx, HIGHLIGHT_ACTIVE_CLASS);
        }
    }

    pub fn clear_all(&mut self, doc: &mut Document) {
        self.clear_active(doc);
        self.clear_broadcast(doc);
    }
}
