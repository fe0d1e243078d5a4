//! CLI module for Toolsmith.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Toolsmith - tool-using assistants for papers and code
///
/// Runs a paper-reading or a code-editing assistant against an
/// OpenAI-compatible model and streams what it does to the terminal.
#[derive(Parser, Debug)]
#[command(name = "toolsmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read markdown papers and summarize them
    Paper {
        /// What to ask the assistant (defaults to summarizing the papers under ./temp)
        message: Option<String>,

        /// Model to use, as provider:model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Work on a code project with file and shell tools
    Code {
        /// What to ask the assistant (defaults to fixing the game under ./temp/my-app)
        message: Option<String>,

        /// Model to use, as provider:model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the tools available to an assistant (all tools if omitted)
    Tools {
        /// Assistant name (paper, code)
        assistant: Option<String>,
    },

    /// Call a single tool directly, without a model
    Call {
        /// Tool name (e.g., "read_markdown_sections")
        tool: String,

        /// Tool arguments as a JSON object
        args: Option<String>,
    },

    /// Check provider credentials and required binaries
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
