//! AI request flows.
//!
//! Every flow has three steps:
//! 1. `begin_*` (sync): validate, apply the interim UI state, emit
//!    `RequestStarted` and return a [`PendingRequest`];
//! 2. [`PendingRequest::send`] (async): owns everything it needs, so the
//!    assistant stays free while the provider works;
//! 3. [`Assistant::complete`] (sync): emit `RequestCompleted` or
//!    `RequestFailed`, then apply the result to the button UI, but only if
//!    no newer request for the same button has begun since.
//!
//! The `chat_send` / `translate` / `request_insights` / `send_prompt`
//! helpers chain the three steps.

use crate::assistant::Assistant;
use crate::buttons::{
    CHAT_ERROR_TEXT, ChatButton, InsightsButton, NO_INSIGHTS_TEXT, NO_RESPONSE_TEXT,
    PROCESSING_TEXT, TRANSLATION_EMPTY_TEXT, TRANSLATION_FAILED_TEXT, TranslateButton,
    translate_prompt,
};
use crate::error::{AssistError, Result};
use crate::event::AssistantEvent;
use crate::provider::AiProvider;
use aide_core::ElementId;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Which UI a request reports back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Chat,
    Translate,
    Insights,
    /// Direct call; no button UI involved.
    Prompt,
}

/// A request that has started and not yet been sent.
pub struct PendingRequest {
    kind: RequestKind,
    button: Option<ElementId>,
    ticket: u64,
    prompt: String,
    options: Map<String, Value>,
    provider: Arc<dyn AiProvider>,
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("kind", &self.kind)
            .field("button", &self.button)
            .field("ticket", &self.ticket)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl PendingRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub async fn send(self) -> RequestOutcome {
        let result = self.provider.send_prompt(&self.prompt, &self.options).await;
        RequestOutcome {
            kind: self.kind,
            button: self.button,
            ticket: self.ticket,
            result,
        }
    }
}

/// The provider's answer, waiting to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub kind: RequestKind,
    pub button: Option<ElementId>,
    ticket: u64,
    pub result: Result<String>,
}

impl Assistant {
    fn start(
        &mut self,
        kind: RequestKind,
        button: Option<ElementId>,
        prompt: String,
        options: Map<String, Value>,
        provider: Arc<dyn AiProvider>,
    ) -> PendingRequest {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        if let Some(id) = button {
            self.tickets.insert(id, ticket);
        }
        self.events.push(AssistantEvent::RequestStarted {
            button,
            prompt: prompt.clone(),
        });
        PendingRequest {
            kind,
            button,
            ticket,
            prompt,
            options,
            provider,
        }
    }

    /// Start a direct prompt. Fails before any notification when the
    /// active provider is missing or not ready.
    pub fn begin_prompt(&mut self, prompt: &str, options: Map<String, Value>) -> Result<PendingRequest> {
        let provider = self.providers.active()?;
        Ok(self.start(RequestKind::Prompt, None, prompt.to_string(), options, provider))
    }

    /// Start a chat answer for `prompt` in chat button `button`.
    pub fn begin_chat(&mut self, button: ElementId, prompt: &str) -> Result<PendingRequest> {
        if prompt.trim().is_empty() {
            return Err(AssistError::EmptyPrompt);
        }
        self.button::<ChatButton>(button)?;
        let provider = self.providers.active()?;

        self.button_mut::<ChatButton>(button)?
            .set_response(PROCESSING_TEXT);
        Ok(self.start(
            RequestKind::Chat,
            Some(button),
            prompt.to_string(),
            Map::new(),
            provider,
        ))
    }

    /// Start translating `source_text` for translate button `button`. The
    /// popover is opened if no drop opened it. A provider that is not ready
    /// leaves the failure text in it.
    pub fn begin_translate(
        &mut self,
        button: ElementId,
        source_text: &str,
        language_name: &str,
    ) -> Result<PendingRequest> {
        self.button::<TranslateButton>(button)?;
        if source_text.trim().is_empty() {
            return Err(AssistError::NothingToTranslate);
        }
        let locale = self.locale().to_string();
        self.button_mut::<TranslateButton>(button)?
            .start_translation(source_text, &locale);
        let provider = match self.providers.active() {
            Ok(provider) => provider,
            Err(e) => {
                self.button_mut::<TranslateButton>(button)?
                    .set_translation_result(TRANSLATION_FAILED_TEXT);
                return Err(e);
            }
        };
        let prompt = translate_prompt(language_name, source_text);
        Ok(self.start(RequestKind::Translate, Some(button), prompt, Map::new(), provider))
    }

    /// Start the analysis request emitted by an insights drop.
    pub fn begin_insights(&mut self, button: ElementId, prompt: &str) -> Result<PendingRequest> {
        self.button::<InsightsButton>(button)?;
        if prompt.trim().is_empty() {
            return Err(AssistError::EmptyPrompt);
        }
        let provider = match self.providers.active() {
            Ok(provider) => provider,
            Err(e) => {
                self.button_mut::<InsightsButton>(button)?
                    .set_insights_error(None);
                return Err(e);
            }
        };
        Ok(self.start(
            RequestKind::Insights,
            Some(button),
            prompt.to_string(),
            Map::new(),
            provider,
        ))
    }

    fn is_latest(&self, outcome: &RequestOutcome) -> bool {
        outcome
            .button
            .is_none_or(|id| self.tickets.get(&id) == Some(&outcome.ticket))
    }

    /// Report the outcome and, for the newest request of its button,
    /// apply it to the button UI. Returns the provider's result.
    pub fn complete(&mut self, outcome: RequestOutcome) -> Result<String> {
        let button = outcome.button;
        match &outcome.result {
            Ok(response) => self.events.push(AssistantEvent::RequestCompleted {
                button,
                response: response.clone(),
            }),
            Err(e) => {
                log::warn!("AI request failed: {e}");
                self.events.push(AssistantEvent::RequestFailed {
                    button,
                    error: e.to_string(),
                });
            }
        }

        if !self.is_latest(&outcome) {
            log::debug!("stale {:?} response for {button:?} dropped", outcome.kind);
            return outcome.result;
        }
        if let Some(id) = button {
            self.tickets.remove(&id);
            self.apply(outcome.kind, id, &outcome.result)?;
        }
        outcome.result
    }

    fn apply(&mut self, kind: RequestKind, id: ElementId, result: &Result<String>) -> Result<()> {
        match kind {
            RequestKind::Chat => {
                let text = match result {
                    Ok(r) if r.is_empty() => NO_RESPONSE_TEXT,
                    Ok(r) => r.as_str(),
                    Err(_) => CHAT_ERROR_TEXT,
                };
                self.button_mut::<ChatButton>(id)?.set_response(text);
            }
            RequestKind::Translate => {
                let text = match result {
                    Ok(r) if r.is_empty() => TRANSLATION_EMPTY_TEXT,
                    Ok(r) => r.as_str(),
                    Err(_) => TRANSLATION_FAILED_TEXT,
                };
                self.button_mut::<TranslateButton>(id)?
                    .set_translation_result(text);
            }
            RequestKind::Insights => {
                let insights = self.button_mut::<InsightsButton>(id)?;
                match result {
                    Ok(r) if r.trim().is_empty() => insights.set_insights_error(Some(NO_INSIGHTS_TEXT)),
                    Ok(r) => insights.set_insights_result(r),
                    Err(_) => insights.set_insights_error(None),
                }
            }
            RequestKind::Prompt => {}
        }
        Ok(())
    }

    // ─── One-call flows ──────────────────────────────────────────────────

    pub async fn send_prompt(&mut self, prompt: &str, options: Map<String, Value>) -> Result<String> {
        let pending = self.begin_prompt(prompt, options)?;
        let outcome = pending.send().await;
        self.complete(outcome)
    }

    pub async fn chat_send(&mut self, button: ElementId, prompt: &str) -> Result<String> {
        let pending = self.begin_chat(button, prompt)?;
        let outcome = pending.send().await;
        self.complete(outcome)
    }

    pub async fn translate(
        &mut self,
        button: ElementId,
        source_text: &str,
        language_name: &str,
    ) -> Result<String> {
        let pending = self.begin_translate(button, source_text, language_name)?;
        let outcome = pending.send().await;
        self.complete(outcome)
    }

    pub async fn request_insights(&mut self, button: ElementId, prompt: &str) -> Result<String> {
        let pending = self.begin_insights(button, prompt)?;
        let outcome = pending.send().await;
        self.complete(outcome)
    }

    // ─── Widget input ────────────────────────────────────────────────────

    /// Send the chat draft of `button`: appends the user bubble and emits
    /// `ChatSend`. Returns the prompt, or `None` for a blank draft.
    pub fn submit_chat(&mut self, button: ElementId) -> Result<Option<String>> {
        let prompt = self.button_mut::<ChatButton>(button)?.send_input();
        if let Some(prompt) = &prompt {
            self.events.push(AssistantEvent::ChatSend {
                button,
                prompt: prompt.clone(),
            });
        }
        Ok(prompt)
    }

    /// Change the translation language; re-emits `Translate` for the
    /// current source text.
    pub fn set_target_language(&mut self, button: ElementId, code: &str) -> Result<()> {
        if let Some(request) = self.button_mut::<TranslateButton>(button)?.set_target_language(code)? {
            self.events.push(request.into_event(button));
        }
        Ok(())
    }
}
