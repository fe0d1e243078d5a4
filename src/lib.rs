//! Toolsmith - tool-using assistants for papers and code
//!
//! A CLI and library that runs LLM assistants against OpenAI-compatible
//! providers. Each assistant is a fixed set of tools, a system prompt and a
//! model; the agent loop calls tools until the model answers, streaming
//! events to the caller as it goes.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `openai` - Provider clients and `provider:model` identifiers
//! - `tools` - File, shell and markdown tools plus their registry
//! - `agent` - Assistant assemblies, the tool calling loop and its events
//! - `cli` - Command line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use toolsmith::agent::{event_channel, Assistant};
//! use toolsmith::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let agent = Assistant::Paper.build(&settings, None)?;
//!
//!     let (events, mut rx) = event_channel(64);
//!     let printer = tokio::spawn(async move {
//!         while let Some(event) = rx.recv().await {
//!             println!("{:?}", event);
//!         }
//!     });
//!
//!     let response = agent.run("Summarize ./temp/paper.md", events).await?;
//!     printer.await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod tools;

pub use error::{Result, ToolsmithError};
