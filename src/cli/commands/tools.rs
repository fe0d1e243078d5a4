//! Tool listing and direct tool calls.

use crate::agent::Assistant;
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::{parse_tool_call, ToolContext, ToolKind, BASH_TOOLS, FILE_TOOLS, PAPER_TOOLS};
use anyhow::Result;

/// List the tools of one assistant, or every tool grouped by registry.
pub fn run_tools(assistant: Option<&str>, settings: &Settings) -> Result<()> {
    match assistant {
        Some(name) => {
            let assistant: Assistant = name.parse()?;
            let toolset = assistant.toolset(settings);
            Output::header(&format!("{} assistant ({} tools)", assistant, toolset.len()));
            for kind in toolset.iter() {
                print_tool(kind);
            }
        }
        None => {
            let groups: [(&str, &[ToolKind]); 4] = [
                ("File tools", FILE_TOOLS),
                ("Shell tools", BASH_TOOLS),
                ("Paper tools", PAPER_TOOLS),
                ("Opt-in", &[ToolKind::ReadMarkdownFile]),
            ];
            for (title, kinds) in groups {
                Output::header(title);
                for kind in kinds {
                    print_tool(*kind);
                }
            }
        }
    }
    println!();
    Ok(())
}

fn print_tool(kind: ToolKind) {
    let summary = kind.description().lines().next().unwrap_or_default();
    Output::tool_item(kind.name(), summary);
}

/// Call one tool with JSON arguments and print its output.
pub async fn run_call(tool: &str, args: Option<&str>, settings: &Settings) -> Result<()> {
    let spinner = Output::spinner(&format!("Running {}...", tool));
    let result = call_tool(tool, args, settings).await;
    spinner.finish_and_clear();

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            Err(e)
        }
    }
}

async fn call_tool(tool: &str, args: Option<&str>, settings: &Settings) -> Result<String> {
    let call = parse_tool_call(tool, args.unwrap_or("{}"))?;
    let context = ToolContext::from_settings(settings, "cli", "");
    context
        .execute(&call)
        .await
        .map_err(|e| anyhow::anyhow!(e.render()))
}
