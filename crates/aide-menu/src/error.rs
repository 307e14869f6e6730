use thiserror::Error;

/// Result type for assistant operations.
pub type Result<T> = std::result::Result<T, AssistError>;

/// Everything that can go wrong while configuring the assistant or talking
/// to an AI provider. Extraction problems are never errors: they degrade the
/// extracted data instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistError {
    #[error("AI provider is not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("No AI provider registered with id `{0}`")]
    UnknownProvider(String),

    #[error("Invalid provider registration: {0}")]
    InvalidProvider(String),

    #[error("No menu button with id `{0}`")]
    UnknownButton(String),

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Nothing to translate")]
    NothingToTranslate,

    #[error("No response from AI service")]
    EmptyResponse,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AssistError {
    /// Errors caught before a request is sent.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ProviderNotConfigured(_)
                | Self::UnknownProvider(_)
                | Self::InvalidProvider(_)
                | Self::Config(_)
        )
    }
}

impl From<serde_json::Error> for AssistError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        assert!(AssistError::UnknownProvider("x".into()).is_configuration());
        assert!(AssistError::ProviderNotConfigured("x".into()).is_configuration());
        assert!(!AssistError::Provider("timeout".into()).is_configuration());
        assert!(!AssistError::EmptyPrompt.is_configuration());
    }

    #[test]
    fn bad_json_becomes_a_config_error() {
        let err: AssistError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, AssistError::Config(_)));
    }
}
