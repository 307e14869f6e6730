//! AI providers: the async trait hosts implement, the default provider
//! backed by a host action model, and the id → provider registry.

use crate::error::{AssistError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_PROVIDER_ID: &str = "default";
pub const DEFAULT_ACTION_PATH: &str = "/callLLM(...)";

/// Something that answers prompts.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Synchronous readiness check, run before any request starts.
    fn check(&self) -> Result<()> {
        Ok(())
    }

    async fn send_prompt(&self, prompt: &str, options: &Map<String, Value>) -> Result<String>;
}

/// Host-side operation invoked by [`ActionProvider`].
#[async_trait]
pub trait ActionModel: Send + Sync {
    async fn execute(&self, action_path: &str, params: Map<String, Value>) -> Result<Value>;
}

/// Default provider: forwards the prompt to a host action and reads the
/// `response` field of its result.
#[derive(Clone)]
pub struct ActionProvider {
    model: Option<Arc<dyn ActionModel>>,
    action_path: String,
}

impl fmt::Debug for ActionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionProvider")
            .field("configured", &self.model.is_some())
            .field("action_path", &self.action_path)
            .finish()
    }
}

impl ActionProvider {
    pub fn new(action_path: &str) -> Self {
        Self {
            model: None,
            action_path: action_path.to_string(),
        }
    }

    pub fn with_model(mut self, model: Arc<dyn ActionModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn set_model(&mut self, model: Arc<dyn ActionModel>) {
        self.model = Some(model);
    }

    pub fn action_path(&self) -> &str {
        &self.action_path
    }
}

#[async_trait]
impl AiProvider for ActionProvider {
    fn name(&self) -> &str {
        "Action"
    }

    fn check(&self) -> Result<()> {
        match self.model {
            Some(_) => Ok(()),
            None => Err(AssistError::ProviderNotConfigured(
                "no action model is bound".into(),
            )),
        }
    }

    async fn send_prompt(&self, prompt: &str, options: &Map<String, Value>) -> Result<String> {
        let Some(model) = &self.model else {
            return Err(AssistError::ProviderNotConfigured(
                "no action model is bound".into(),
            ));
        };

        let mut params = Map::new();
        params.insert("prompt".into(), Value::String(prompt.to_string()));
        for (key, value) in options {
            params.insert(key.clone(), value.clone());
        }

        let result = model.execute(&self.action_path, params).await?;
        match result.get("response") {
            Some(Value::String(text)) => Ok(text.clone()),
            _ => Err(AssistError::EmptyResponse),
        }
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

/// Providers by id, in registration order, plus the active id.
pub struct ProviderRegistry {
    providers: Vec<(String, Arc<dyn AiProvider>)>,
    active: String,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_ids())
            .field("active", &self.active)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new(active: &str) -> Self {
        Self {
            providers: Vec::new(),
            active: active.to_string(),
        }
    }

    /// Register (or replace) a provider under `id`.
    pub fn register(&mut self, id: &str, provider: Arc<dyn AiProvider>) -> Result<()> {
        if id.trim().is_empty() {
            return Err(AssistError::InvalidProvider("provider id is blank".into()));
        }
        if let Some(slot) = self.providers.iter_mut().find(|(pid, _)| pid == id) {
            log::debug!("provider `{id}` replaced");
            slot.1 = provider;
        } else {
            log::debug!("provider `{id}` registered ({})", provider.name());
            self.providers.push((id.to_string(), provider));
        }
        Ok(())
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn AiProvider>> {
        self.providers
            .iter()
            .find(|(pid, _)| pid == id)
            .map(|(_, p)| p)
    }

    pub fn active_id(&self) -> &str {
        &self.active
    }

    pub fn set_active(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(AssistError::UnknownProvider(id.to_string()));
        }
        self.active = id.to_string();
        Ok(())
    }

    /// The active provider, checked for readiness.
    pub fn active(&self) -> Result<Arc<dyn AiProvider>> {
        let provider = self
            .get(&self.active)
            .ok_or_else(|| AssistError::UnknownProvider(self.active.clone()))?;
        provider.check()?;
        Ok(Arc::clone(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(Value);

    #[async_trait]
    impl ActionModel for Fixed {
        async fn execute(&self, action_path: &str, params: Map<String, Value>) -> Result<Value> {
            assert_eq!(action_path, DEFAULT_ACTION_PATH);
            assert_eq!(params["prompt"], "hi");
            assert_eq!(params["temperature"], 0.2);
            Ok(self.0.clone())
        }
    }

    fn options() -> Map<String, Value> {
        let mut options = Map::new();
        options.insert("temperature".into(), json!(0.2));
        options
    }

    #[test]
    fn unbound_action_provider_is_not_ready() {
        let provider = ActionProvider::new(DEFAULT_ACTION_PATH);
        assert!(matches!(provider.check(), Err(AssistError::ProviderNotConfigured(_))));
    }

    #[tokio::test]
    async fn action_provider_reads_response_field() {
        let provider = ActionProvider::new(DEFAULT_ACTION_PATH)
            .with_model(Arc::new(Fixed(json!({"response": "hello"}))));
        assert_eq!(provider.send_prompt("hi", &options()).await, Ok("hello".to_string()));
    }

    #[tokio::test]
    async fn missing_response_field_is_empty_response() {
        let provider = ActionProvider::new(DEFAULT_ACTION_PATH)
            .with_model(Arc::new(Fixed(json!({"status": "ok"}))));
        assert_eq!(
            provider.send_prompt("hi", &options()).await,
            Err(AssistError::EmptyResponse)
        );
    }

    #[test]
    fn registry_rejects_blank_ids_and_unknown_active() {
        let mut registry = ProviderRegistry::new(DEFAULT_PROVIDER_ID);
        let provider: Arc<dyn AiProvider> = Arc::new(ActionProvider::new(DEFAULT_ACTION_PATH));

        assert!(matches!(
            registry.register("  ", Arc::clone(&provider)),
            Err(AssistError::InvalidProvider(_))
        ));
        assert_eq!(
            registry.active().err(),
            Some(AssistError::UnknownProvider("default".into()))
        );

        registry.register("b", Arc::clone(&provider)).unwrap();
        registry.register("a", provider).unwrap();
        assert_eq!(registry.provider_ids(), vec!["b", "a"]);
        assert_eq!(
            registry.set_active("missing"),
            Err(AssistError::UnknownProvider("missing".into()))
        );
        registry.set_active("a").unwrap();
        assert_eq!(registry.active_id(), "a");
    }
}
