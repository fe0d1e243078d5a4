//! Doctor command - verify provider credentials and required binaries.

use crate::agent::Assistant;
use crate::cli::preflight::shell_binary;
use crate::cli::Output;
use crate::config::{ProviderSettings, Settings};
use crate::openai::ModelSpec;
use console::style;
use std::collections::BTreeSet;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Toolsmith Doctor");
    println!();
    println!("Checking providers, binaries and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Assistants").bold());
    let assistant_checks: Vec<_> = [Assistant::Paper, Assistant::Code]
        .iter()
        .map(|a| check_assistant(settings, *a))
        .collect();
    print_all(&assistant_checks);
    checks.extend(assistant_checks);

    println!();

    println!("{}", style("Providers").bold());
    let provider_checks = check_providers(settings);
    print_all(&provider_checks);
    checks.extend(provider_checks);

    println!();

    println!("{}", style("Binaries").bold());
    let binary_checks = vec![
        check_binary(shell_binary(), true),
        check_binary("git", false),
    ];
    print_all(&binary_checks);
    checks.extend(binary_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(), check_prompts_dir(settings)];
    print_all(&config_checks);
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running an assistant.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Toolsmith is ready to use.");
    }

    Ok(())
}

fn print_all(checks: &[CheckResult]) {
    for check in checks {
        check.print();
    }
}

/// Check that an assistant's model names a configured provider with a key.
fn check_assistant(settings: &Settings, assistant: Assistant) -> CheckResult {
    let name = format!("{} assistant", assistant);
    let model = assistant.model(settings);

    let spec = match ModelSpec::parse(model) {
        Ok(spec) => spec,
        Err(e) => {
            return CheckResult::error(&name, &e.to_string(), "Use the form provider:model")
        }
    };

    match settings.providers.get(&spec.provider) {
        None => CheckResult::error(
            &name,
            &format!("{} uses unknown provider '{}'", model, spec.provider),
            &format!("Add a [providers.{}] section to the config", spec.provider),
        ),
        Some(provider) if provider.api_key().is_none() => CheckResult::error(
            &name,
            &format!("{} needs {}", model, provider.api_key_env),
            &format!("Set with: export {}='...' (or add it to .env)", provider.api_key_env),
        ),
        Some(_) => CheckResult::ok(&name, model),
    }
}

/// Providers that are configured but unused only warn when their key is missing.
fn check_providers(settings: &Settings) -> Vec<CheckResult> {
    let used: BTreeSet<String> = [Assistant::Paper, Assistant::Code]
        .iter()
        .filter_map(|a| ModelSpec::parse(a.model(settings)).ok())
        .map(|spec| spec.provider)
        .collect();

    settings
        .providers
        .iter()
        .map(|(name, provider)| check_provider(name, provider, used.contains(name)))
        .collect()
}

fn check_provider(name: &str, provider: &ProviderSettings, used: bool) -> CheckResult {
    let hint = format!("Set with: export {}='...'", provider.api_key_env);
    match provider.api_key() {
        Some(key) => CheckResult::ok(
            name,
            &format!("{} ({} = {})", provider.base_url, provider.api_key_env, mask_key(&key)),
        ),
        None if used => CheckResult::error(
            name,
            &format!("{} not set", provider.api_key_env),
            &hint,
        ),
        None => CheckResult::warning(
            name,
            &format!("{} not set (unused)", provider.api_key_env),
            &hint,
        ),
    }
}

/// Check that a binary is on PATH.
fn check_binary(name: &str, required: bool) -> CheckResult {
    match which::which(name) {
        Ok(path) => CheckResult::ok(name, &path.display().to_string()),
        Err(_) if required => CheckResult::error(
            name,
            "not found",
            "The code assistant runs commands through this shell",
        ),
        Err(_) => CheckResult::warning(name, "not found", "Some projects need it for the code assistant"),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: toolsmith config init",
        )
    }
}

fn check_prompts_dir(settings: &Settings) -> CheckResult {
    match settings.prompts_dir() {
        None => CheckResult::ok("Prompts", "built-in"),
        Some(dir) if dir.is_dir() => CheckResult::ok("Prompts", &format!("{}", dir.display())),
        Some(dir) => CheckResult::warning(
            "Prompts",
            &format!("{} does not exist", dir.display()),
            "Built-in prompts are used until the directory exists",
        ),
    }
}

/// Show only the ends of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key("sk-1234567890abcd"), "sk-1...abcd");
    }

    #[test]
    fn test_unused_provider_only_warns() {
        let provider = ProviderSettings {
            base_url: "http://localhost/v1".to_string(),
            api_key_env: "TOOLSMITH_DOCTOR_UNSET_KEY".to_string(),
        };
        assert_eq!(check_provider("local", &provider, false).status, CheckStatus::Warning);
        assert_eq!(check_provider("local", &provider, true).status, CheckStatus::Error);
    }

    #[test]
    fn test_assistant_with_unknown_provider() {
        let mut settings = Settings::default();
        settings.paper.model = "nowhere:model".to_string();
        let result = check_assistant(&settings, Assistant::Paper);
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.message.contains("unknown provider 'nowhere'"));
    }
}
