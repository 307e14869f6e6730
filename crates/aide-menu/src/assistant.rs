//! The floating assistant: a main button that opens a radial menu of
//! [`MenuButton`]s, the drag session that routes document drag events to
//! the dragged button, and the provider registry requests go through.
//!
//! The assistant never owns the [`Document`]. Operations that touch the
//! page take it as `&mut Document`; request flows only touch the buttons'
//! own widgets.

use crate::button::{ActionContext, ButtonBehavior, MenuButton, PressEffect};
use crate::config::AssistantConfig;
use crate::error::{AssistError, Result};
use crate::event::{AssistantEvent, DragEvent, EventDisposition, PointerInfo};
use crate::provider::{
    AiProvider, ActionModel, ActionProvider, DEFAULT_PROVIDER_ID, ProviderRegistry,
};
use crate::session::DragSession;
use aide_core::radial::{self, CONTAINER_CLASS, MENU_OPEN_CLASS};
use aide_core::{Document, Element, ElementId, NodeIndex};
use std::collections::HashMap;
use std::sync::Arc;

pub const CORE_STYLE_ID: &str = "aiAssistantCoreStyles";
pub const POSITION_STYLE_ID: &str = "aiAssistantButtonPositions";

pub const MENU_BOX_CLASS: &str = "aiMenuButtons";
pub const MAIN_BUTTON_CLASS: &str = "aiFloatingButton";
pub const MAIN_BUTTON_INNER_CLASS: &str = "aiFloatingButtonInner";

const CORE_CSS: &str = r#"
.aiFloatingButtonContainer { position: fixed; bottom: 2rem; right: 2rem; z-index: 9999; }
.aiMenuButtons { position: absolute; bottom: 0; right: 0; pointer-events: none; }
.aiMenuButton {
  position: absolute; bottom: 0.5rem; right: 0.5rem;
  width: 2.5rem; height: 2.5rem; border-radius: 50%; border: none; padding: 0;
  background: linear-gradient(135deg, #00B9F2 0%, #1661BE 70%);
  box-shadow: 0 2px 10px rgba(0, 0, 0, 0.2);
  display: flex; justify-content: center; align-items: center; cursor: pointer;
  transition: all 0.3s cubic-bezier(0.68, -0.55, 0.265, 1.55);
  opacity: 0; transform: scale(0) translate(0, 0); pointer-events: none;
}
.aiMenuButtonIcon::before { content: var(--icon-code); color: #ffffff; font-size: 1.2rem; line-height: 1; }
.aiFloatingButtonContainer.menu-open .aiMenuButton { opacity: 1; transform: scale(1); pointer-events: auto; }
.aiMenuButton:hover { box-shadow: 0 4px 15px rgba(0, 0, 0, 0.3); }
.aiFloatingButton {
  position: relative; z-index: 2;
  width: 3.5rem; height: 3.5rem; border-radius: 50%; border: none; padding: 0;
  background: linear-gradient(135deg, #00B9F2 0%, #1661BE 70%);
  box-shadow: 0 4px 15px rgba(0, 0, 0, 0.3);
  display: flex; justify-content: center; align-items: center; cursor: pointer;
  transition: transform 0.2s ease;
}
.aiFloatingButton:hover { transform: scale(1.05); }
.aiFloatingButton:active { transform: scale(0.95); }
.aiFloatingButtonInner::before { content: "\e2a5"; color: #ffffff; font-size: 1.6rem; line-height: 1; }
.ai-drop-target { outline: 2px dashed #007acc; outline-offset: -4px; background-color: rgba(0, 122, 204, 0.1); }
.ai-drop-target-active { background-color: rgba(0, 122, 204, 0.2); }
"#;

/// Elements created by [`Assistant::mount`].
#[derive(Debug, Clone, Copy)]
struct Mounted {
    container: NodeIndex,
    main_button: NodeIndex,
}

#[derive(Debug)]
pub struct Assistant {
    /// Listener owner key and container id.
    owner: ElementId,
    locale: String,
    main_gradient: String,
    menu_gradient: String,
    pub(crate) buttons: Vec<MenuButton>,
    menu_open: bool,
    mounted: Option<Mounted>,
    /// Style sheets this instance injected.
    owned_styles: Vec<String>,
    session: DragSession,
    pub(crate) providers: ProviderRegistry,
    action_path: String,
    pub(crate) events: Vec<AssistantEvent>,
    /// Newest request ticket per button.
    pub(crate) tickets: HashMap<ElementId, u64>,
    pub(crate) next_ticket: u64,
}

impl Assistant {
    pub fn from_config(config: AssistantConfig) -> Result<Self> {
        let buttons = config.build_buttons()?;

        let mut providers = ProviderRegistry::new(&config.active_provider);
        providers.register(
            DEFAULT_PROVIDER_ID,
            Arc::new(ActionProvider::new(&config.action_path)),
        )?;

        Ok(Self {
            owner: ElementId::with_prefix("aiAssistant"),
            locale: config.locale.clone(),
            main_gradient: config.main_gradient(),
            menu_gradient: config.menu_gradient(),
            buttons,
            menu_open: false,
            mounted: None,
            owned_styles: Vec::new(),
            session: DragSession::new(),
            providers,
            action_path: config.action_path,
            events: Vec::new(),
            tickets: HashMap::new(),
            next_ticket: 0,
        })
    }

    pub fn id(&self) -> ElementId {
        self.owner
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn main_button_gradient(&self) -> &str {
        &self.main_gradient
    }

    pub fn menu_button_gradient(&self) -> &str {
        &self.menu_gradient
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    /// Drain queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<AssistantEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Buttons ─────────────────────────────────────────────────────────

    pub fn buttons(&self) -> &[MenuButton] {
        &self.buttons
    }

    pub fn menu_button(&self, id: ElementId) -> Option<&MenuButton> {
        self.buttons.iter().find(|b| b.id() == id)
    }

    pub(crate) fn menu_button_mut(&mut self, id: ElementId) -> Result<&mut MenuButton> {
        self.buttons
            .iter_mut()
            .find(|b| b.id() == id)
            .ok_or_else(|| AssistError::UnknownButton(id.as_str().to_string()))
    }

    /// The variant behind button `id`.
    pub fn button<T: ButtonBehavior>(&self, id: ElementId) -> Result<&T> {
        self.menu_button(id)
            .and_then(MenuButton::behavior::<T>)
            .ok_or_else(|| AssistError::UnknownButton(id.as_str().to_string()))
    }

    pub fn button_mut<T: ButtonBehavior>(&mut self, id: ElementId) -> Result<&mut T> {
        self.menu_button_mut(id)?
            .behavior_mut::<T>()
            .ok_or_else(|| AssistError::UnknownButton(id.as_str().to_string()))
    }

    /// First button with variant `T`.
    pub fn find_button<T: ButtonBehavior>(&self) -> Option<ElementId> {
        self.buttons
            .iter()
            .find(|b| b.behavior::<T>().is_some())
            .map(MenuButton::id)
    }

    // ─── Providers ───────────────────────────────────────────────────────

    pub fn register_provider(&mut self, id: &str, provider: Arc<dyn AiProvider>) -> Result<()> {
        self.providers.register(id, provider)
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.provider_ids()
    }

    pub fn active_provider(&self) -> &str {
        self.providers.active_id()
    }

    pub fn set_active_provider(&mut self, id: &str) -> Result<()> {
        self.providers.set_active(id)
    }

    /// Bind the host action the default provider calls.
    pub fn set_action_model(&mut self, model: Arc<dyn ActionModel>) -> Result<()> {
        let provider = ActionProvider::new(&self.action_path).with_model(model);
        self.providers.register(DEFAULT_PROVIDER_ID, Arc::new(provider))
    }

    // ─── Mounting ────────────────────────────────────────────────────────

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Render the container under `parent`, inject style sheets and
    /// register document listeners. Mounting again re-renders in place.
    pub fn mount(&mut self, doc: &mut Document, parent: NodeIndex) -> NodeIndex {
        if let Some(previous) = self.mounted.take() {
            doc.remove(previous.container);
        }

        let mut container = Element::new("div")
            .with_id(self.owner.as_str())
            .with_class(CONTAINER_CLASS);
        if self.menu_open {
            container = container.with_class(MENU_OPEN_CLASS);
        }
        let container = doc.append(parent, container);
        let menu_box = doc.append(container, Element::new("div").with_class(MENU_BOX_CLASS));
        for button in &mut self.buttons {
            button.render(doc, menu_box, Some(&self.menu_gradient));
        }
        let main_button = doc.append(
            container,
            Element::new("button")
                .with_class(MAIN_BUTTON_CLASS)
                .with_attr("type", "button")
                .with_attr("style", &format!("background: {}", self.main_gradient)),
        );
        doc.append(main_button, Element::new("span").with_class(MAIN_BUTTON_INNER_CLASS));

        self.inject_style(doc, CORE_STYLE_ID, CORE_CSS);
        for button in &self.buttons {
            let style = button.highlight_style();
            if doc.inject_style(style.id, style.css) {
                self.owned_styles.push(style.id.to_string());
            }
        }
        doc.replace_style(POSITION_STYLE_ID, &self.position_css());
        if !self.owned_styles.iter().any(|s| s == POSITION_STYLE_ID) {
            self.owned_styles.push(POSITION_STYLE_ID.to_string());
        }
        doc.add_listeners(self.owner.as_str());

        log::debug!("assistant `{}` mounted with {} button(s)", self.owner, self.buttons.len());
        self.mounted = Some(Mounted {
            container,
            main_button,
        });
        container
    }

    fn inject_style(&mut self, doc: &mut Document, id: &str, css: &str) {
        if doc.inject_style(id, css) {
            self.owned_styles.push(id.to_string());
        }
    }

    /// Transform rules for every button, auto-placed or overridden.
    pub fn position_css(&self) -> String {
        let total = self.buttons.len();
        let positions: Vec<(&str, radial::Offset)> = self
            .buttons
            .iter()
            .enumerate()
            .map(|(i, b)| {
                (
                    b.id().as_str(),
                    radial::button_position(b.settings.position, i, total),
                )
            })
            .collect();
        radial::position_css(&positions)
    }

    /// Tear down everything `mount` created. Safe to call repeatedly.
    pub fn unmount(&mut self, doc: &mut Document) {
        for button in &mut self.buttons {
            button.destroy(doc);
        }
        self.session.clear(doc);
        doc.remove_listeners(self.owner.as_str());
        for id in self.owned_styles.drain(..) {
            doc.remove_style(&id);
        }
        if let Some(mounted) = self.mounted.take() {
            doc.remove(mounted.container);
            log::debug!("assistant `{}` unmounted", self.owner);
        }
        self.menu_open = false;
    }

    /// The main button element, once mounted.
    pub fn main_button(&self) -> Option<NodeIndex> {
        self.mounted.map(|m| m.main_button)
    }

    // ─── Menu ────────────────────────────────────────────────────────────

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn toggle_menu(&mut self, doc: &mut Document) {
        if self.menu_open {
            self.close_menu(doc);
        } else {
            self.open_menu(doc);
        }
    }

    pub fn open_menu(&mut self, doc: &mut Document) {
        self.set_menu_open(doc, true);
    }

    pub fn close_menu(&mut self, doc: &mut Document) {
        self.set_menu_open(doc, false);
    }

    fn set_menu_open(&mut self, doc: &mut Document, open: bool) {
        let Some(mounted) = self.mounted else {
            return;
        };
        if self.menu_open == open {
            return;
        }
        if open {
            doc.add_class(mounted.container, MENU_OPEN_CLASS);
        } else {
            doc.remove_class(mounted.container, MENU_OPEN_CLASS);
        }
        self.menu_open = open;
        log::debug!("menu {}", if open { "opened" } else { "closed" });
        self.events.push(AssistantEvent::MenuToggled { open });
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, button: ElementId, at_ms: u64) -> Result<()> {
        self.menu_button_mut(button)?.pointer_down(at_ms);
        Ok(())
    }

    /// Finish a press. Returns whether it counted as a click.
    pub fn pointer_up(&mut self, doc: &mut Document, button: ElementId, at_ms: u64) -> Result<bool> {
        let menu_button = self.menu_button_mut(button)?;
        if !menu_button.pointer_up(at_ms) {
            return Ok(false);
        }
        let effect = menu_button.press(doc);
        self.events.push(AssistantEvent::ButtonPressed { button });
        if effect == PressEffect::CloseMenu {
            self.close_menu(doc);
        }
        Ok(true)
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    /// Begin dragging `button`. Returns `false` when it is not draggable.
    pub fn start_drag(&mut self, doc: &mut Document, button: ElementId) -> Result<bool> {
        if !self.menu_button_mut(button)?.begin_drag(doc) {
            return Ok(false);
        }
        if let Some(previous) = self.session.dragged()
            && previous != button
            && let Ok(stale) = self.menu_button_mut(previous)
        {
            stale.end_drag(doc);
        }
        self.session.register(doc, button);
        self.events.push(AssistantEvent::DragStarted { button });
        Ok(true)
    }

    /// Route a document-level drag event to the dragged button.
    pub fn handle_drag_event(&mut self, doc: &mut Document, event: DragEvent) -> EventDisposition {
        match event {
            DragEvent::DragOver { node } => {
                let Some(dragged) = self.session.dragged() else {
                    return EventDisposition::Ignored;
                };
                let target = match self.menu_button_mut(dragged) {
                    Ok(button) => button.find_drop_target(doc, node),
                    Err(_) => None,
                };
                log::trace!("dragover {node:?} -> {target:?}");
                self.session.track(doc, target);
                EventDisposition::PreventDefault
            }
            DragEvent::DragEnter { .. } => {
                if self.session.is_dragging() {
                    EventDisposition::PreventDefault
                } else {
                    EventDisposition::Ignored
                }
            }
            DragEvent::Drop { node, pointer } => {
                let Some(dragged) = self.session.dragged() else {
                    return EventDisposition::Ignored;
                };
                let target = match self.menu_button_mut(dragged) {
                    Ok(button) => button.find_drop_target(doc, node),
                    Err(_) => None,
                };
                if let Some(target) = target
                    && let Err(e) = self.perform_action(doc, dragged, target.target, pointer)
                {
                    log::warn!("drop action failed: {e}");
                }
                self.end_drag(doc);
                EventDisposition::PreventDefault
            }
            DragEvent::DragEnd => {
                self.end_drag(doc);
                EventDisposition::Ignored
            }
        }
    }

    fn end_drag(&mut self, doc: &mut Document) {
        if let Some(dragged) = self.session.dragged()
            && let Ok(button) = self.menu_button_mut(dragged)
        {
            button.end_drag(doc);
        }
        self.session.clear(doc);
    }

    /// Run `button`'s action on `target`: notify the host, close the menu,
    /// then let the variant react.
    pub fn perform_action(
        &mut self,
        doc: &mut Document,
        button: ElementId,
        target: NodeIndex,
        pointer: Option<PointerInfo>,
    ) -> Result<()> {
        let menu_button = self.menu_button_mut(button)?;
        let content = menu_button.extract_content(doc, target);
        let action = menu_button.settings.action.clone();

        self.events.push(AssistantEvent::ActionPerformed {
            button,
            action,
            target,
            content: content.clone(),
            pointer,
        });
        self.close_menu(doc);

        let Some(menu_button) = self.buttons.iter_mut().find(|b| b.id() == button) else {
            return Err(AssistError::UnknownButton(button.as_str().to_string()));
        };
        let mut ctx = ActionContext::new(button, doc, &self.locale, &mut self.events);
        menu_button.handle_action(&mut ctx, &content, target);
        Ok(())
    }
}
