//! Chat button: opens a conversation window on press. Not a drag source.

use crate::button::{
    ActionContext, ButtonBehavior, ButtonKind, HighlightStyle, PressEffect, Transient,
};
use crate::buttons::GENERIC_HIGHLIGHT;
use crate::target::Targeting;
use aide_core::NodeIndex;
use std::any::Any;

pub const CHAT_ICON: &str = "e174";
pub const CHAT_ACTION: &str = "chat";
pub const CHAT_TOOLTIP: &str = "Open Chat";

pub const PROCESSING_TEXT: &str = "Processing your request...";
pub const NO_RESPONSE_TEXT: &str = "No response received.";
pub const CHAT_ERROR_TEXT: &str =
    "Sorry, an error occurred while processing your request. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub title: String,
    pub placeholder: String,
    pub width: String,
    pub height: String,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            title: "AI Assistant".into(),
            placeholder: "Ask me anything...".into(),
            width: "500px".into(),
            height: "400px".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

/// The conversation window.
#[derive(Debug, Clone, Default)]
pub struct ChatWindow {
    pub open: bool,
    pub messages: Vec<ChatMessage>,
    /// Text typed but not yet sent.
    pub draft: String,
}

#[derive(Debug, Default)]
pub struct ChatButton {
    options: ChatOptions,
    targeting: Targeting,
    window: Transient<ChatWindow>,
}

impl ChatButton {
    pub fn new(options: ChatOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    pub fn window(&self) -> Option<&ChatWindow> {
        self.window.get()
    }

    pub fn is_chat_open(&self) -> bool {
        self.window.get().is_some_and(|w| w.open)
    }

    /// Toggle the window. Returns whether it is now open.
    pub fn open_chat(&mut self) -> bool {
        let window = self.window.get_or_build(ChatWindow::default);
        window.open = !window.open;
        log::debug!("chat window {}", if window.open { "opened" } else { "closed" });
        window.open
    }

    pub fn set_draft(&mut self, text: &str) {
        self.window.get_or_build(ChatWindow::default).draft = text.to_string();
    }

    /// Send the typed draft: appends a user bubble and clears the input.
    /// Blank drafts are ignored.
    pub fn send_input(&mut self) -> Option<String> {
        let window = self.window.get_mut()?;
        if window.draft.trim().is_empty() {
            return None;
        }
        let prompt = std::mem::take(&mut window.draft);
        window.messages.push(ChatMessage {
            role: Role::User,
            text: prompt.clone(),
        });
        Some(prompt)
    }

    /// Show `text` as the assistant's answer: replaces the last AI bubble
    /// when the conversation ends with one, else appends.
    pub fn set_response(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let window = self.window.get_or_build(ChatWindow::default);
        match window.messages.last_mut() {
            Some(last) if last.role == Role::Ai => last.text = text.to_string(),
            _ => window.messages.push(ChatMessage {
                role: Role::Ai,
                text: text.to_string(),
            }),
        }
    }

    /// Text of the most recent AI bubble.
    pub fn response(&self) -> &str {
        self.window
            .get()
            .and_then(|w| w.messages.iter().rev().find(|m| m.role == Role::Ai))
            .map_or("", |m| m.text.as_str())
    }

    pub fn clear_response(&mut self) {
        if let Some(window) = self.window.get_mut() {
            window.messages.clear();
        }
    }
}

impl ButtonBehavior for ChatButton {
    fn kind(&self) -> ButtonKind {
        ButtonKind::Chat
    }

    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn handle_action(&mut self, _ctx: &mut ActionContext<'_>, _content: &str, _target: NodeIndex) {}

    fn highlight_style(&self) -> HighlightStyle {
        GENERIC_HIGHLIGHT
    }

    fn on_press(&mut self) -> PressEffect {
        if self.open_chat() {
            PressEffect::CloseMenu
        } else {
            PressEffect::None
        }
    }

    fn teardown(&mut self) {
        self.window.teardown();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
