//! Configuration settings for Toolsmith.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    /// Model providers keyed by the prefix used in model identifiers.
    pub providers: BTreeMap<String, ProviderSettings>,
    pub paper: AssistantSettings,
    pub code: AssistantSettings,
    pub tools: ToolSettings,
    pub prompts: PromptSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            providers: default_providers(),
            paper: AssistantSettings {
                model: "mm:MiniMax-M2".to_string(),
                max_iterations: 50,
                allow_full_read: false,
            },
            code: AssistantSettings {
                model: "mm:MiniMax-M2".to_string(),
                max_iterations: 150,
                allow_full_read: false,
            },
            tools: ToolSettings::default(),
            prompts: PromptSettings::default(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Load a `.env` file from the working directory at startup.
    pub load_dotenv: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            load_dotenv: true,
        }
    }
}

/// An OpenAI-compatible chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the chat completions API.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl ProviderSettings {
    fn compatible(base_url: &str, api_key_env: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key_env: api_key_env.to_string(),
        }
    }

    /// Read the API key from the environment, ignoring empty values.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

/// Overlay `overrides` onto `base`, recursing into tables.
fn merge_toml(base: &mut toml::Value, overrides: toml::Value) {
    match (base, overrides) {
        (toml::Value::Table(base), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, value) => *base = value,
    }
}

fn default_providers() -> BTreeMap<String, ProviderSettings> {
    let mut providers = BTreeMap::new();
    providers.insert("openai".to_string(), ProviderSettings::default());
    providers.insert(
        "mm".to_string(),
        ProviderSettings::compatible("https://api.minimaxi.com/v1", "MM_API_KEY"),
    );
    providers.insert(
        "glm".to_string(),
        ProviderSettings::compatible("https://api.minimaxi.com/v1", "GLM_API_KEY"),
    );
    providers
}

/// Settings for one assistant assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Model identifier in `provider:model` form.
    pub model: String,
    /// Maximum model calls per run before the run is aborted.
    pub max_iterations: usize,
    /// Expose `read_markdown_file` in addition to the paged readers.
    pub allow_full_read: bool,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: "mm:MiniMax-M2".to_string(),
            max_iterations: 50,
            allow_full_read: false,
        }
    }
}

/// Defaults applied to every tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Timeout for `execute_command` and `execute_command_with_cwd`.
    pub command_timeout_secs: u64,
    /// Timeout for `execute_interactive_command`.
    pub interactive_timeout_secs: u64,
    /// Default page size for `read_markdown_pages`.
    pub lines_per_page: usize,
    /// Default context window for `search_markdown_content`.
    pub search_context_lines: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            command_timeout_secs: 30,
            interactive_timeout_secs: 10,
            lines_per_page: 50,
            search_context_lines: 3,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let overrides: toml::Value = toml::from_str(&content)?;
            // Partial tables fill in from the built-in defaults of their own section.
            let mut merged = toml::Value::try_from(Settings::default())
                .map_err(|e| crate::error::ToolsmithError::Config(e.to_string()))?;
            merge_toml(&mut merged, overrides);
            Ok(merged.try_into()?)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ToolsmithError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toolsmith")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded custom prompts directory, if configured.
    pub fn prompts_dir(&self) -> Option<PathBuf> {
        self.prompts.custom_dir.as_deref().map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.tools.command_timeout_secs, 30);
        assert_eq!(settings.tools.interactive_timeout_secs, 10);
        assert_eq!(settings.tools.lines_per_page, 50);
        assert_eq!(settings.tools.search_context_lines, 3);
        assert_eq!(settings.code.max_iterations, 150);
        assert!(settings.providers.contains_key("mm"));
        assert!(settings.providers.contains_key("openai"));
    }

    #[test]
    fn test_partial_config_keeps_builtin_providers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[providers.local]
base_url = "http://localhost:8000/v1"
api_key_env = "LOCAL_KEY"

[code]
model = "local:qwen"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.code.model, "local:qwen");
        assert_eq!(settings.code.max_iterations, 150);
        assert_eq!(settings.paper.max_iterations, 50);
        assert_eq!(settings.providers["local"].api_key_env, "LOCAL_KEY");
        assert!(settings.providers.contains_key("mm"));
        assert_eq!(settings.tools.command_timeout_secs, 30);
    }

    #[test]
    fn test_partial_provider_keeps_its_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[providers.mm]
api_key_env = "MINIMAX_KEY"

[providers.local]
base_url = "http://localhost:8000/v1"

[prompts.variables]
extra_instructions = "Be brief."
"#,
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.providers["mm"].api_key_env, "MINIMAX_KEY");
        assert_eq!(settings.providers["mm"].base_url, "https://api.minimaxi.com/v1");
        assert_eq!(settings.providers["local"].api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.prompts.variables["extra_instructions"], "Be brief.");
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tools]\ncommand_timeout_secs = \"soon\"\n").unwrap();
        assert!(Settings::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.paper.allow_full_read = true;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert!(loaded.paper.allow_full_read);
        assert_eq!(loaded.providers, settings.providers);
    }
}
