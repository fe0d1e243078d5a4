//! Configuration module for Toolsmith.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{CodePrompts, PaperPrompts, Prompts};
pub use settings::{
    AssistantSettings, GeneralSettings, PromptSettings, ProviderSettings, Settings,
    ToolSettings,
};
