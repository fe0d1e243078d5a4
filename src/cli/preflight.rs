//! Pre-flight checks before starting an assistant.
//!
//! Validates that the provider and binaries an assistant needs are
//! available before a run that would otherwise fail on its first step.

use crate::agent::Assistant;
use crate::config::Settings;
use crate::error::{Result, ToolsmithError};
use crate::openai::ModelSpec;

/// Shell used by the command tools.
pub fn shell_binary() -> &'static str {
    if cfg!(windows) {
        "cmd"
    } else {
        "sh"
    }
}

/// Run pre-flight checks for running `assistant` with the model `model`.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings, assistant: Assistant, model: &str) -> Result<()> {
    check_provider(settings, model)?;
    if assistant == Assistant::Code {
        check_tool(shell_binary())?;
    }
    Ok(())
}

/// Check that the model's provider is configured and has an API key.
fn check_provider(settings: &Settings, model: &str) -> Result<()> {
    let spec = ModelSpec::parse(model)?;
    let provider = settings
        .providers
        .get(&spec.provider)
        .ok_or_else(|| ToolsmithError::UnknownProvider(spec.provider.clone()))?;

    match provider.api_key() {
        Some(_) => Ok(()),
        None => Err(ToolsmithError::Config(format!(
            "{} not set. Set it with: export {}='...' (or add it to .env)",
            provider.api_key_env, provider.api_key_env
        ))),
    }
}

/// Check if an external binary is on PATH.
fn check_tool(name: &str) -> Result<()> {
    which::which(name)
        .map(|_| ())
        .map_err(|_| ToolsmithError::ToolNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;

    fn settings_with(key_env: &str) -> Settings {
        let mut settings = Settings::default();
        settings.providers.insert(
            "local".to_string(),
            ProviderSettings {
                base_url: "http://localhost:8000/v1".to_string(),
                api_key_env: key_env.to_string(),
            },
        );
        settings
    }

    #[test]
    fn test_unknown_provider() {
        let settings = Settings::default();
        let result = check(&settings, Assistant::Paper, "missing:model");
        assert!(matches!(result, Err(ToolsmithError::UnknownProvider(_))));
    }

    #[test]
    fn test_missing_api_key() {
        let settings = settings_with("TOOLSMITH_PREFLIGHT_UNSET_KEY");
        let err = check(&settings, Assistant::Paper, "local:m").unwrap_err();
        assert!(err.to_string().contains("TOOLSMITH_PREFLIGHT_UNSET_KEY not set"));
    }

    #[test]
    fn test_configured_provider_passes() {
        std::env::set_var("TOOLSMITH_PREFLIGHT_KEY", "secret");
        let settings = settings_with("TOOLSMITH_PREFLIGHT_KEY");
        assert!(check(&settings, Assistant::Paper, "local:m").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_code_needs_shell() {
        std::env::set_var("TOOLSMITH_PREFLIGHT_SHELL_KEY", "secret");
        let settings = settings_with("TOOLSMITH_PREFLIGHT_SHELL_KEY");
        assert!(check(&settings, Assistant::Code, "local:m").is_ok());
    }
}
