//! Translate button: drop it on text to open a translation popover.

use crate::button::{ActionContext, ButtonBehavior, ButtonKind, HighlightStyle, Transient};
use crate::buttons::GENERIC_HIGHLIGHT;
use crate::error::{AssistError, Result};
use crate::event::AssistantEvent;
use crate::target::Targeting;
use aide_core::{ElementId, NodeIndex};
use std::any::Any;

pub const TRANSLATE_ICON: &str = "e28b";
pub const TRANSLATE_ACTION: &str = "translate";
pub const TRANSLATE_TOOLTIP: &str = "Translate";

pub const TRANSLATING_TEXT: &str = "Translating...";
pub const TRANSLATION_FAILED_TEXT: &str = "Translation failed. Please try again.";
pub const TRANSLATION_EMPTY_TEXT: &str = "Translation failed.";

/// Supported target languages: `(code, display name)`.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("de", "German"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
];

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Initial language: the configured one, else the locale's primary
/// subtag; anything unsupported falls back to English.
pub fn default_language(configured: Option<&str>, locale: &str) -> &'static str {
    let candidate = configured
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| locale.chars().take(2).collect::<String>().to_lowercase());
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == candidate)
        .map_or("en", |(c, _)| *c)
}

pub fn translate_prompt(language_name: &str, text: &str) -> String {
    format!(
        "Translate the following text to {language_name}: \"{text}\". Only provide the translation, no explanation."
    )
}

/// A translation the host should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub source_text: String,
    pub target_language: String,
    pub target_language_name: String,
}

impl TranslateRequest {
    pub fn prompt(&self) -> String {
        translate_prompt(&self.target_language_name, &self.source_text)
    }

    pub fn into_event(self, button: ElementId) -> AssistantEvent {
        AssistantEvent::Translate {
            button,
            source_text: self.source_text,
            target_language: self.target_language,
            target_language_name: self.target_language_name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslatePopover {
    pub open: bool,
    /// Element the popover is shown next to.
    pub anchor: Option<NodeIndex>,
    pub source: String,
    pub language: &'static str,
    pub output: String,
    translating: bool,
}

impl TranslatePopover {
    fn new(language: &'static str) -> Self {
        Self {
            open: false,
            anchor: None,
            source: String::new(),
            language,
            output: String::new(),
            translating: false,
        }
    }

    fn trigger(&mut self) -> Option<TranslateRequest> {
        if self.source.trim().is_empty() {
            return None;
        }
        self.translating = true;
        self.output = TRANSLATING_TEXT.to_string();
        Some(TranslateRequest {
            source_text: self.source.clone(),
            target_language: self.language.to_string(),
            target_language_name: language_name(self.language).unwrap_or("English").to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct TranslateButton {
    configured_language: Option<String>,
    targeting: Targeting,
    popover: Transient<TranslatePopover>,
}

impl TranslateButton {
    pub fn new(default_language: Option<String>, targeting: Targeting) -> Self {
        Self {
            configured_language: default_language,
            targeting,
            popover: Transient::default(),
        }
    }

    pub fn popover(&self) -> Option<&TranslatePopover> {
        self.popover.get()
    }

    pub fn is_translating(&self) -> bool {
        self.popover.get().is_some_and(|p| p.translating)
    }

    pub fn translation(&self) -> &str {
        self.popover.get().map_or("", |p| p.output.as_str())
    }

    /// Pick another language; re-runs the translation for the current text.
    pub fn set_target_language(&mut self, code: &str) -> Result<Option<TranslateRequest>> {
        let Some(&(code, _)) = LANGUAGES.iter().find(|(c, _)| *c == code) else {
            return Err(AssistError::Config(format!("unsupported language `{code}`")));
        };
        let Some(popover) = self.popover.get_mut() else {
            return Ok(None);
        };
        popover.language = code;
        Ok(popover.trigger())
    }

    /// Show the result and stop the translating state.
    /// Show `source` as being translated, opening the popover when no drop
    /// has built it yet.
    pub fn start_translation(&mut self, source: &str, locale: &str) {
        let language = default_language(self.configured_language.as_deref(), locale);
        let popover = self.popover.get_or_build(|| TranslatePopover::new(language));
        popover.source = source.to_string();
        popover.open = true;
        popover.translating = true;
        popover.output = TRANSLATING_TEXT.to_string();
    }

    pub fn set_translation_result(&mut self, text: &str) {
        if let Some(popover) = self.popover.get_mut() {
            popover.output = text.to_string();
            popover.translating = false;
        }
    }

    pub fn close_popover(&mut self) {
        if let Some(popover) = self.popover.get_mut() {
            popover.open = false;
            popover.translating = false;
        }
    }
}

impl ButtonBehavior for TranslateButton {
    fn kind(&self) -> ButtonKind {
        ButtonKind::Translate
    }

    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn handle_action(&mut self, ctx: &mut ActionContext<'_>, content: &str, target: NodeIndex) {
        if content.trim().is_empty() {
            return;
        }
        let language = default_language(self.configured_language.as_deref(), ctx.locale);
        let popover = self.popover.get_or_build(|| TranslatePopover::new(language));
        popover.source = content.to_string();
        popover.output.clear();
        popover.anchor = Some(target);
        popover.open = true;

        if let Some(request) = popover.trigger() {
            log::debug!("translate to {}", request.target_language);
            let button = ctx.button;
            ctx.emit(request.into_event(button));
        }
    }

    fn highlight_style(&self) -> HighlightStyle {
        GENERIC_HIGHLIGHT
    }

    fn teardown(&mut self) {
        self.popover.teardown();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
