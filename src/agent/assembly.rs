//! The two assistant assemblies: a tool set, a prompt and a model each.

use super::runner::Agent;
use crate::config::{AssistantSettings, Prompts, Settings};
use crate::error::{Result, ToolsmithError};
use crate::openai::{create_client, ModelSpec};
use crate::tools::{ToolContext, ToolKind, Toolset, BASH_TOOLS, FILE_TOOLS, PAPER_TOOLS};
use std::collections::HashMap;
use std::str::FromStr;

/// Which assistant to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assistant {
    /// Reads and summarizes markdown papers.
    Paper,
    /// Edits and runs code in a project directory.
    Code,
}

impl Assistant {
    pub fn name(&self) -> &'static str {
        match self {
            Assistant::Paper => "paper",
            Assistant::Code => "code",
        }
    }

    /// Task used when none is given on the command line.
    pub fn default_task(&self) -> &'static str {
        match self {
            Assistant::Paper => "Read the .md papers under ./temp and give a summary of each.",
            Assistant::Code => {
                "The snake game under ./temp/my-app has a problem: the board is too wide. \
                 Fix it and polish the game."
            }
        }
    }

    pub fn settings<'a>(&self, settings: &'a Settings) -> &'a AssistantSettings {
        match self {
            Assistant::Paper => &settings.paper,
            Assistant::Code => &settings.code,
        }
    }

    pub fn model<'a>(&self, settings: &'a Settings) -> &'a str {
        &self.settings(settings).model
    }

    pub fn max_iterations(&self, settings: &Settings) -> usize {
        self.settings(settings).max_iterations
    }

    /// Tools exposed to this assistant, in the order the model sees them.
    pub fn toolset(&self, settings: &Settings) -> Toolset {
        match self {
            Assistant::Paper if settings.paper.allow_full_read => {
                Toolset::new(&[&[ToolKind::ReadMarkdownFile], PAPER_TOOLS, FILE_TOOLS])
            }
            Assistant::Paper => Toolset::new(&[PAPER_TOOLS, FILE_TOOLS]),
            Assistant::Code => Toolset::new(&[FILE_TOOLS, BASH_TOOLS]),
        }
    }

    /// Render the system prompt with the tool settings filled in.
    pub fn system_prompt(&self, prompts: &Prompts, settings: &Settings) -> String {
        let mut vars = HashMap::new();
        vars.insert(
            "command_timeout".to_string(),
            settings.tools.command_timeout_secs.to_string(),
        );
        vars.insert(
            "lines_per_page".to_string(),
            settings.tools.lines_per_page.to_string(),
        );

        let template = match self {
            Assistant::Paper => &prompts.paper.system,
            Assistant::Code => &prompts.code.system,
        };
        prompts.render_with_custom(template, &vars)
    }

    /// Assemble an agent. `model` overrides the configured model identifier.
    pub fn build(&self, settings: &Settings, model: Option<&str>) -> Result<Agent> {
        let spec = ModelSpec::parse(model.unwrap_or_else(|| self.model(settings)))?;
        let client = create_client(settings, &spec)?;

        let prompts_dir = settings.prompts_dir();
        let prompts = Prompts::load(prompts_dir.as_deref(), Some(&settings.prompts.variables))?;

        let context = ToolContext::from_settings(settings, self.name(), &spec.to_string());

        Ok(Agent::new(client, &spec.model, self.toolset(settings), context)
            .with_system_prompt(&self.system_prompt(&prompts, settings))
            .with_max_iterations(self.max_iterations(settings)))
    }
}

impl FromStr for Assistant {
    type Err = ToolsmithError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "paper" => Ok(Assistant::Paper),
            "code" => Ok(Assistant::Code),
            _ => Err(ToolsmithError::InvalidInput(format!(
                "Unknown assistant: {}. Valid options: paper, code",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
