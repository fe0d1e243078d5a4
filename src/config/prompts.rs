//! Prompt templates for Toolsmith.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub paper: PaperPrompts,
    pub code: CodePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the paper-reading assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperPrompts {
    pub system: String,
}

impl Default for PaperPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a research assistant that reads academic papers stored as markdown files and writes faithful summaries.

Papers can be long. Do not try to read a whole paper at once:
- Use 'list_directory' or 'search_files' to locate the markdown files
- Use 'read_markdown_sections' without a section name to get the outline first
- Read the sections that matter (abstract, introduction, method, experiments, conclusion) with 'read_markdown_sections'
- Use 'read_markdown_pages' or 'read_markdown_lines' for parts that are not covered by headers
- Use 'search_markdown_content' to find specific terms, datasets or results

When you have read enough, write the summary:
- The problem the paper addresses and why it matters
- The proposed approach and its key ideas
- The main experimental results, with numbers where the paper gives them
- Limitations and open questions
Cite section names or line numbers when you quote the paper.
Answer in the language the user writes in.{{extra_instructions}}"#
                .to_string(),
        }
    }
}

/// Prompts for the code-editing assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodePrompts {
    pub system: String,
}

impl Default for CodePrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a software engineer working directly in the user's project through file and shell tools.

Work in small, verifiable steps:
- Explore first: 'list_directory', 'search_files' and 'read_file' before changing anything
- Make focused edits with 'write_file'; always write the complete file content
- Use 'execute_command_with_cwd' to build, lint or test inside the project directory
- Commands time out after {{command_timeout}} seconds; avoid starting servers or watchers
- Never delete files you did not create unless the user asked for it

When the task is done, explain what you changed and how you verified it.
Answer in the language the user writes in.{{extra_instructions}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&Path>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let paper_path = dir.join("paper.toml");
            if paper_path.exists() {
                let content = std::fs::read_to_string(&paper_path)?;
                prompts.paper = toml::from_str(&content)?;
            }

            let code_path = dir.join("code.toml");
            if code_path.exists() {
                let content = std::fs::read_to_string(&code_path)?;
                prompts.code = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    /// `{{name}}` placeholders nobody supplied are removed; other braces are kept.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        placeholder()
            .replace_all(template, |caps: &regex::Captures| {
                let key = &caps[1];
                vars.get(key)
                    .or_else(|| self.variables.get(key))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("valid placeholder regex")
    })
}
