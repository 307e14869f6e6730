//! Menu buttons: shared settings, the behavior trait every variant
//! implements, and the drag/click/highlight plumbing common to all of them.
//!
//! A [`MenuButton`] is plain data ([`ButtonSettings`]) plus a boxed
//! [`ButtonBehavior`]. The assistant only talks to the trait; variant
//! specific APIs (chat window, translate popover, ...) are reached through
//! [`MenuButton::behavior`] / [`MenuButton::behavior_mut`].

use crate::event::AssistantEvent;
use crate::highlight::Highlighter;
use crate::target::{DropTarget, Targeting};
use aide_core::radial::Offset;
use aide_core::{Document, Element, ElementId, NodeIndex};
use std::any::Any;
use std::fmt;

/// Pointer down → up faster than this (ms) without a drag is a click.
pub const CLICK_THRESHOLD_MS: u64 = 200;

pub const MENU_BUTTON_CLASS: &str = "aiMenuButton";
pub const MENU_BUTTON_ICON_CLASS: &str = "aiMenuButtonIcon";

/// Which built-in variant a button is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    Chat,
    Translate,
    Insights,
    Custom,
}

/// Settings shared by every menu button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSettings {
    pub id: ElementId,
    /// Icon glyph code point, e.g. `e024`.
    pub icon: String,
    pub tooltip: String,
    pub action: String,
    pub draggable: bool,
    pub highlight_on_click: bool,
    /// Explicit placement; `(0, 0)` means radial auto-layout.
    pub position: Offset,
    /// Overrides the container's menu gradient.
    pub background_gradient: Option<String>,
}

impl ButtonSettings {
    pub fn new(id: &str) -> Self {
        Self {
            id: ElementId::intern(id),
            icon: "e024".to_string(),
            tooltip: String::new(),
            action: String::new(),
            draggable: true,
            highlight_on_click: true,
            position: Offset::default(),
            background_gradient: None,
        }
    }
}

/// Style sheet a variant injects for its highlight classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightStyle {
    pub id: &'static str,
    pub css: &'static str,
}

/// What the container should do after a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PressEffect {
    #[default]
    None,
    CloseMenu,
}

/// Everything a variant may touch while handling a drop.
pub struct ActionContext<'a> {
    pub button: ElementId,
    pub doc: &'a Document,
    /// Locale used for chart data and language defaults.
    pub locale: &'a str,
    events: &'a mut Vec<AssistantEvent>,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        button: ElementId,
        doc: &'a Document,
        locale: &'a str,
        events: &'a mut Vec<AssistantEvent>,
    ) -> Self {
        Self {
            button,
            doc,
            locale,
            events,
        }
    }

    pub fn emit(&mut self, event: AssistantEvent) {
        self.events.push(event);
    }
}

/// Behavior of a button variant.
pub trait ButtonBehavior: fmt::Debug + Any {
    fn kind(&self) -> ButtonKind;

    fn targeting(&self) -> &Targeting;

    fn extract_content(&self, doc: &Document, target: NodeIndex) -> String {
        self.targeting().extract(doc, target)
    }

    /// Act on a drop. `content` is the extracted display text.
    fn handle_action(&mut self, ctx: &mut ActionContext<'_>, content: &str, target: NodeIndex);

    fn highlight_style(&self) -> HighlightStyle;

    fn on_press(&mut self) -> PressEffect {
        PressEffect::None
    }

    /// Release transient UI. Called once when the button is destroyed.
    fn teardown(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ─── Transient widgets ───────────────────────────────────────────────────

/// A widget built on first use and released explicitly.
#[derive(Debug, Clone)]
pub struct Transient<T> {
    inner: Option<T>,
}

impl<T> Default for Transient<T> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<T> Transient<T> {
    pub fn get_or_build(&mut self, build: impl FnOnce() -> T) -> &mut T {
        self.inner.get_or_insert_with(build)
    }

    pub fn get(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.inner.as_mut()
    }

    pub fn is_built(&self) -> bool {
        self.inner.is_some()
    }

    pub fn teardown(&mut self) -> Option<T> {
        self.inner.take()
    }
}

// ─── Menu button ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MenuButton {
    pub settings: ButtonSettings,
    behavior: Box<dyn ButtonBehavior>,
    highlighter: Highlighter,
    dragging: bool,
    pointer_down_at: Option<u64>,
    root: Option<NodeIndex>,
}

impl MenuButton {
    pub fn new(settings: ButtonSettings, behavior: impl ButtonBehavior) -> Self {
        Self::from_boxed(settings, Box::new(behavior))
    }

    pub fn from_boxed(settings: ButtonSettings, behavior: Box<dyn ButtonBehavior>) -> Self {
        Self {
            settings,
            behavior,
            highlighter: Highlighter::new(),
            dragging: false,
            pointer_down_at: None,
            root: None,
        }
    }

    pub fn id(&self) -> ElementId {
        self.settings.id
    }

    pub fn kind(&self) -> ButtonKind {
        self.behavior.kind()
    }

    pub fn targeting(&self) -> &Targeting {
        self.behavior.targeting()
    }

    pub fn highlight_style(&self) -> HighlightStyle {
        self.behavior.highlight_style()
    }

    /// Typed access to the variant.
    pub fn behavior<T: ButtonBehavior>(&self) -> Option<&T> {
        self.behavior.as_any().downcast_ref()
    }

    pub fn behavior_mut<T: ButtonBehavior>(&mut self) -> Option<&mut T> {
        self.behavior.as_any_mut().downcast_mut()
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// The button's own element once mounted.
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    // ─── Targeting ───────────────────────────────────────────────────────

    pub fn targetable_elements(&self, doc: &Document) -> Vec<NodeIndex> {
        self.behavior.targeting().targetable_elements(doc, self.root)
    }

    /// Resolve the element under the pointer. While dragging, the active
    /// highlight follows the result.
    pub fn find_drop_target(&mut self, doc: &mut Document, node: Option<NodeIndex>) -> Option<DropTarget> {
        let resolved = node.and_then(|n| self.behavior.targeting().resolve(doc, n));
        match resolved {
            Some(target) if self.dragging => self.highlighter.set_active(doc, target.visual),
            Some(_) => {}
            None => self.highlighter.clear_active(doc),
        }
        resolved
    }

    pub fn extract_content(&self, doc: &Document, target: NodeIndex) -> String {
        self.behavior.extract_content(doc, target)
    }

    pub fn handle_action(&mut self, ctx: &mut ActionContext<'_>, content: &str, target: NodeIndex) {
        self.behavior.handle_action(ctx, content, target);
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, at_ms: u64) {
        self.pointer_down_at = Some(at_ms);
        self.dragging = false;
    }

    /// Whether the pointer-up completes a click.
    pub fn pointer_up(&mut self, at_ms: u64) -> bool {
        self.pointer_down_at
            .take()
            .is_some_and(|down| at_ms.saturating_sub(down) < CLICK_THRESHOLD_MS)
            && !self.dragging
    }

    /// A click: toggles the preview highlight (for draggable buttons that
    /// want it) and runs the variant's press handler.
    pub fn press(&mut self, doc: &mut Document) -> PressEffect {
        if self.settings.highlight_on_click && self.settings.draggable {
            let root = self.root;
            let targeting = self.behavior.targeting();
            self.highlighter
                .toggle(doc, |d| targeting.targetable_elements(d, root));
        }
        self.behavior.on_press()
    }

    /// Start dragging. Returns `false` for non-draggable buttons.
    pub fn begin_drag(&mut self, doc: &mut Document) -> bool {
        if !self.settings.draggable {
            return false;
        }
        self.dragging = true;
        if !self.highlighter.is_showing() {
            let candidates = self.targetable_elements(doc);
            self.highlighter.show(doc, candidates);
        }
        true
    }

    pub fn end_drag(&mut self, doc: &mut Document) {
        self.dragging = false;
        self.highlighter.clear_all(doc);
    }

    /// Clear highlights and release transient UI.
    pub fn destroy(&mut self, doc: &mut Document) {
        self.end_drag(doc);
        self.behavior.teardown();
        self.root = None;
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Render the button element under `parent`.
    pub fn render(&mut self, doc: &mut Document, parent: NodeIndex, menu_gradient: Option<&str>) -> NodeIndex {
        let s = &self.settings;
        let mut element = Element::new("button")
            .with_id(s.id.as_str())
            .with_class(MENU_BUTTON_CLASS)
            .with_attr("type", "button");
        if s.draggable {
            element = element.with_attr("draggable", "true");
        }
        if !s.tooltip.is_empty() {
            element = element.with_attr("title", &s.tooltip);
        }
        if let Some(gradient) = s.background_gradient.as_deref().or(menu_gradient) {
            element = element.with_attr("style", &format!("background: {gradient}"));
        }

        let idx = doc.append(parent, element);
        let icon = format!("--icon-code: \"\\{}\"", s.icon);
        doc.append(
            idx,
            Element::new("span")
                .with_class(MENU_BUTTON_ICON_CLASS)
                .with_attr("style", &icon),
        );
        self.root = Some(idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::{ChatButton, CustomButton};
    use pretty_assertions::assert_eq;

    fn custom(id: &str) -> MenuButton {
        MenuButton::new(ButtonSettings::new(id), CustomButton::default())
    }

    #[test]
    fn quick_release_is_a_click() {
        let mut button = custom("quick");
        button.pointer_down(1_000);
        assert!(button.pointer_up(1_199));

        button.pointer_down(1_000);
        assert!(!button.pointer_up(1_200));

        // up without a down
        assert!(!button.pointer_up(1_300));
    }

    #[test]
    fn drag_in_between_is_not_a_click() {
        let mut doc = Document::new();
        let mut button = custom("dragged");
        button.pointer_down(0);
        assert!(button.begin_drag(&mut doc));
        assert!(!button.pointer_up(50));
    }

    #[test]
    fn non_draggable_buttons_never_drag() {
        let mut doc = Document::new();
        let mut settings = ButtonSettings::new("still");
        settings.draggable = false;
        let mut button = MenuButton::new(settings, ChatButton::default());
        assert!(!button.begin_drag(&mut doc));
        assert!(!button.is_dragging());
    }

    #[test]
    fn behavior_downcasts_to_its_variant() {
        let button = custom("typed");
        assert_eq!(button.kind(), ButtonKind::Custom);
        assert!(button.behavior::<CustomButton>().is_some());
        assert!(button.behavior::<ChatButton>().is_none());
    }

    #[test]
    fn render_writes_icon_and_gradient() {
        let mut doc = Document::new();
        let root = doc.root;
        let mut settings = ButtonSettings::new("pin");
        settings.tooltip = "Pin it".to_string();
        settings.icon = "e0ab".to_string();
        let mut button = MenuButton::new(settings, CustomButton::default());

        let idx = button.render(&mut doc, root, Some("#123456"));
        assert_eq!(button.root(), Some(idx));
        let element = doc.get(idx).unwrap();
        assert!(element.has_class(MENU_BUTTON_CLASS));
        assert_eq!(element.attr("draggable"), Some("true"));
        assert_eq!(element.attr("title"), Some("Pin it"));
        assert_eq!(element.attr("style"), Some("background: #123456"));

        let icon = doc.children(idx)[0];
        assert_eq!(doc.get(icon).unwrap().attr("style"), Some("--icon-code: \"\\e0ab\""));
    }

    #[test]
    fn transient_builds_once() {
        let mut slot: Transient<Vec<u8>> = Transient::default();
        assert!(!slot.is_built());
        slot.get_or_build(Vec::new).push(1);
        slot.get_or_build(|| vec![9]).push(2);
        assert_eq!(slot.get(), Some(&vec![1, 2]));
        assert_eq!(slot.teardown(), Some(vec![1, 2]));
        assert!(slot.get().is_none());
    }
}
