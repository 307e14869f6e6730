//! The drag session: which button is being dragged and which element it
//! currently points at.
//!
//! Owned by the assistant, one per instance. The current visual element
//! always carries [`DROP_TARGET_CLASS`] and [`DROP_TARGET_ACTIVE_CLASS`];
//! only [`DragSession::track`] and [`DragSession::clear`] touch them.

use crate::target::DropTarget;
use aide_core::{Document, ElementId};

pub const DROP_TARGET_CLASS: &str = "ai-drop-target";
pub const DROP_TARGET_ACTIVE_CLASS: &str = "ai-drop-target-active";

#[derive(Debug, Clone, Default)]
pub struct DragSession {
    dragged: Option<ElementId>,
    current: Option<DropTarget>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag for `button`. Last write wins; a previous target's
    /// marks are removed.
    pub fn register(&mut self, doc: &mut Document, button: ElementId) {
        self.unmark(doc);
        if let Some(previous) = self.dragged.replace(button)
            && previous != button
        {
            log::debug!("drag of `{previous}` superseded by `{button}`");
        }
        log::debug!("drag registered for `{button}`");
    }

    pub fn dragged(&self) -> Option<ElementId> {
        self.dragged
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    pub fn current(&self) -> Option<DropTarget> {
        self.current
    }

    /// Follow the pointer. Returns whether the marked target changed.
    pub fn track(&mut self, doc: &mut Document, target: Option<DropTarget>) -> bool {
        if self.current == target {
            return false;
        }
        self.unmark(doc);
        if let Some(t) = target {
            doc.add_class(t.visual, DROP_TARGET_CLASS);
            doc.add_class(t.visual, DROP_TARGET_ACTIVE_CLASS);
        }
        self.current = target;
        true
    }

    /// End the session and remove every mark.
    pub fn clear(&mut self, doc: &mut Document) {
        self.unmark(doc);
        self.dragged = None;
    }

    fn unmark(&mut self, doc: &mut Document) {
        if let Some(t) = self.current.take() {
            doc.remove_class(t.visual, DROP_TARGET_CLASS);
            doc.remove_class(t.visual, DROP_TARGET_ACTIVE_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_core::Element;

    #[test]
    fn moving_between_targets_never_marks_two() {
        let mut doc = Document::new();
        let a = doc.append(doc.root, Element::new("div"));
        let b = doc.append(doc.root, Element::new("div"));
        let mut session = DragSession::new();
        session.register(&mut doc, ElementId::intern("btn"));

        assert!(session.track(&mut doc, Some(DropTarget::same(a))));
        assert!(session.track(&mut doc, Some(DropTarget::same(b))));
        assert_eq!(doc.elements_with_class(DROP_TARGET_CLASS), vec![b]);
        assert!(!session.track(&mut doc, Some(DropTarget::same(b))));
    }

    #[test]
    fn register_clears_previous_marks() {
        let mut doc = Document::new();
        let a = doc.append(doc.root, Element::new("div"));
        let mut session = DragSession::new();
        session.register(&mut doc, ElementId::intern("first"));
        session.track(&mut doc, Some(DropTarget::same(a)));

        session.register(&mut doc, ElementId::intern("second"));
        assert_eq!(session.dragged(), Some(ElementId::intern("second")));
        assert!(!doc.has_class(a, DROP_TARGET_ACTIVE_CLASS));
        assert_eq!(session.current(), None);
    }

    #[test]
    fn clear_ends_the_session() {
        let mut doc = Document::new();
        let a = doc.append(doc.root, Element::new("div"));
        let mut session = DragSession::new();
        session.register(&mut doc, ElementId::intern("btn"));
        session.track(&mut doc, Some(DropTarget::same(a)));
        session.clear(&mut doc);

        assert!(!session.is_dragging());
        assert!(doc.elements_with_class(DROP_TARGET_CLASS).is_empty());
    }
}
