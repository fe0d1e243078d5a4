//! OpenAI-compatible client configuration and model identifiers.
//!
//! Models are addressed as `provider:model` (e.g. `mm:MiniMax-M2`). The
//! provider part selects a `[providers.<name>]` entry from the settings,
//! which supplies the base URL and the environment variable holding the key.

use crate::config::{ProviderSettings, Settings};
use crate::error::{Result, ToolsmithError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for chat API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Provider used when a model identifier has no `provider:` prefix.
pub const DEFAULT_PROVIDER: &str = "openai";

/// A parsed `provider:model` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: String,
    pub model: String,
}

impl ModelSpec {
    /// Parse a model identifier. Only the first `:` separates the provider.
    pub fn parse(id: &str) -> Result<Self> {
        let id = id.trim();
        let (provider, model) = match id.split_once(':') {
            Some((provider, model)) => (provider.trim(), model.trim()),
            None => (DEFAULT_PROVIDER, id),
        };

        if provider.is_empty() || model.is_empty() {
            return Err(ToolsmithError::InvalidInput(format!(
                "Invalid model identifier '{}', expected 'provider:model'",
                id
            )));
        }

        Ok(Self {
            provider: provider.to_string(),
            model: model.to_string(),
        })
    }
}

impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

/// Create a client for the provider named in `spec`.
pub fn create_client(
    settings: &Settings,
    spec: &ModelSpec,
) -> Result<Client<OpenAIConfig>> {
    let provider = settings
        .providers
        .get(&spec.provider)
        .ok_or_else(|| ToolsmithError::UnknownProvider(spec.provider.clone()))?;

    create_client_with_timeout(provider, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client for a provider with a custom timeout.
pub fn create_client_with_timeout(
    provider: &ProviderSettings,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::new().with_api_base(provider.base_url.clone());
    if let Some(key) = provider.api_key() {
        config = config.with_api_key(key);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed_model() {
        let spec = ModelSpec::parse("mm:MiniMax-M2").unwrap();
        assert_eq!(spec.provider, "mm");
        assert_eq!(spec.model, "MiniMax-M2");
        assert_eq!(spec.to_string(), "mm:MiniMax-M2");
    }

    #[test]
    fn test_parse_bare_model_uses_default_provider() {
        let spec = ModelSpec::parse("gpt-4o-mini").unwrap();
        assert_eq!(spec.provider, DEFAULT_PROVIDER);
        assert_eq!(spec.model, "gpt-4o-mini");
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(ModelSpec::parse("mm:").is_err());
        assert!(ModelSpec::parse(":model").is_err());
        assert!(ModelSpec::parse("").is_err());
    }

    #[test]
    fn test_unknown_provider() {
        let settings = Settings::default();
        let spec = ModelSpec::parse("nope:model").unwrap();
        assert!(matches!(
            create_client(&settings, &spec),
            Err(ToolsmithError::UnknownProvider(_))
        ));
    }
}
